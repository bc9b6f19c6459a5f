//! # Summary Generator
//!
//! ## Single-flight
//!
//! Generations are keyed by UTC calendar day. While one generation for a day
//! is running, further triggers for that day (a manual request racing the
//! scheduler, say) wait on the same `OnceCell` and receive its result instead
//! of racing on the same file. The entry is removed once the run completes,
//! so a later trigger starts a fresh generation and overwrites the file. A
//! caller that is dropped mid-run removes the entry too, unless another
//! caller is still waiting on it.
//!
//! The artifact write (fsync and rename included) runs on tokio's blocking
//! pool.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use licmgr_core::{sha256_digest, CanonicalBytes, ContentDigest, Timestamp};
use licmgr_signer_client::DocumentSigner;
use licmgr_state::ClientRegistry;
use parking_lot::Mutex;
use tokio::sync::OnceCell;

use crate::artifact::{write_artifact, SignedArtifact};
use crate::error::SummaryError;
use crate::snapshot::SummarySnapshot;

/// Result of one successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    pub date: NaiveDate,
    pub path: PathBuf,
    pub client_count: usize,
    /// SHA-256 of the signed canonical bytes.
    pub digest: ContentDigest,
}

/// Produces signed summary artifacts.
pub struct SummaryGenerator {
    registry: Arc<ClientRegistry>,
    signer: Arc<dyn DocumentSigner>,
    dir: PathBuf,
    in_flight: Mutex<HashMap<NaiveDate, Flight>>,
}

impl std::fmt::Debug for SummaryGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryGenerator")
            .field("dir", &self.dir)
            .field("in_flight", &self.in_flight.lock().len())
            .finish_non_exhaustive()
    }
}

impl SummaryGenerator {
    pub fn new(
        registry: Arc<ClientRegistry>,
        signer: Arc<dyn DocumentSigner>,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            signer,
            dir: dir.into(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Directory artifacts are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Generate today's summary.
    pub async fn generate(&self) -> Result<SummaryOutcome, SummaryError> {
        self.generate_at(Timestamp::now()).await
    }

    /// Generate the summary for the day of `now`, joining an in-flight
    /// generation for that day if there is one.
    pub async fn generate_at(&self, now: Timestamp) -> Result<SummaryOutcome, SummaryError> {
        let date = now.date();
        let guard = {
            let mut in_flight = self.in_flight.lock();
            let flight = in_flight.entry(date).or_default();
            flight.callers += 1;
            FlightGuard {
                in_flight: &self.in_flight,
                date,
                cell: Arc::clone(&flight.cell),
            }
        };
        let result = guard.cell.get_or_init(|| self.run(now)).await.clone();
        result
    }

    async fn run(&self, now: Timestamp) -> Result<SummaryOutcome, SummaryError> {
        let clients = self.registry.snapshot_all();
        let snapshot = SummarySnapshot::from_clients(&clients, now);
        let date = snapshot.date;
        let client_count = snapshot.clients.len();

        let canonical = CanonicalBytes::new(&snapshot)
            .map_err(|e| SummaryError::Canonicalization(e.to_string()))?;
        let digest = sha256_digest(&canonical);

        let signature = match self.signer.sign(&canonical).await {
            Ok(sig) => sig,
            Err(e) => {
                tracing::error!(%date, error = %e, "summary signing failed");
                return Err(e.into());
            }
        };

        let artifact = SignedArtifact {
            summary: snapshot,
            signature,
        };
        let dir = self.dir.clone();
        let path = tokio::task::spawn_blocking(move || write_artifact(&dir, &artifact))
            .await
            .map_err(|e| SummaryError::TaskFailed(e.to_string()))??;
        tracing::info!(%date, clients = client_count, %digest, path = %path.display(), "summary written");

        Ok(SummaryOutcome {
            date,
            path,
            client_count,
            digest,
        })
    }
}

/// One day's shared run and how many callers are attached to it.
#[derive(Default)]
struct Flight {
    cell: Arc<OnceCell<Result<SummaryOutcome, SummaryError>>>,
    callers: usize,
}

/// Detaches a caller from its day's [`Flight`] when the caller finishes or
/// is dropped mid-run.
///
/// A finished flight leaves the map at once. An unfinished one leaves when
/// its last caller detaches; until then the next waiter takes over the run.
struct FlightGuard<'a> {
    in_flight: &'a Mutex<HashMap<NaiveDate, Flight>>,
    date: NaiveDate,
    cell: Arc<OnceCell<Result<SummaryOutcome, SummaryError>>>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock();
        let done = match in_flight.get_mut(&self.date) {
            Some(flight) if Arc::ptr_eq(&flight.cell, &self.cell) => {
                flight.callers -= 1;
                flight.callers == 0 || flight.cell.initialized()
            }
            _ => false,
        };
        if done {
            in_flight.remove(&self.date);
        }
    }
}
