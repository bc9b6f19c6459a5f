//! # Client Registry
//!
//! The single owner of all [`ClientRecord`]s. Every operation runs inside one
//! exclusive section; mutations are staged on a copy, saved through the
//! [`RegistryStore`] and committed to memory only once the save succeeded.
//!
//! Saves hit the disk (write, fsync, rename) with the lock held. Async
//! callers therefore go through [`ClientRegistry::run_blocking`], which moves
//! the whole operation onto tokio's blocking pool.

use std::sync::Arc;

use licmgr_core::ClientId;
use parking_lot::Mutex;

use crate::error::{RegistryError, StoreError, UsageError};
use crate::record::ClientRecord;
use crate::store::{ClientMap, MemoryStore, RegistryStore};
use crate::usage::{Screening, UsageDecision, UsageReport};

/// Thread-safe registry of client license records.
///
/// The lock is `parking_lot`, never held across `.await`, and non-poisoning.
#[derive(Debug)]
pub struct ClientRegistry {
    clients: Mutex<ClientMap>,
    store: Arc<dyn RegistryStore>,
}

impl ClientRegistry {
    /// Open the registry from its store. A load failure is returned, never
    /// replaced by an empty registry.
    pub fn open(store: Arc<dyn RegistryStore>) -> Result<Self, StoreError> {
        let clients = store.load()?;
        Ok(Self {
            clients: Mutex::new(clients),
            store,
        })
    }

    /// An empty registry backed by a [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self {
            clients: Mutex::new(ClientMap::new()),
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }

    /// A copy of one record.
    pub fn get(&self, client_id: &ClientId) -> Result<ClientRecord, RegistryError> {
        self.clients
            .lock()
            .get(client_id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownClient(client_id.clone()))
    }

    /// Insert or wholesale replace the record for `record.client_id`.
    ///
    /// Returns the replaced record, if any. Nothing of the previous record
    /// survives, including its `revoked` flag.
    pub fn upsert(&self, record: ClientRecord) -> Result<Option<ClientRecord>, StoreError> {
        let mut clients = self.clients.lock();
        self.commit(&mut clients, |next| {
            next.insert(record.client_id.clone(), record)
        })
    }

    /// Replace the stored usage total of an existing client.
    pub fn set_usage(
        &self,
        client_id: &ClientId,
        total_usage_bytes: i64,
    ) -> Result<ClientRecord, RegistryError> {
        let mut clients = self.clients.lock();
        if !clients.contains_key(client_id) {
            return Err(RegistryError::UnknownClient(client_id.clone()));
        }
        let updated = self.commit(&mut clients, |next| {
            next.get_mut(client_id).map(|rec| {
                rec.total_usage_bytes = total_usage_bytes;
                rec.clone()
            })
        })?;
        updated.ok_or_else(|| RegistryError::UnknownClient(client_id.clone()))
    }

    /// Mark an existing client revoked. Revoking twice is a no-op that does
    /// not touch the store.
    pub fn revoke(&self, client_id: &ClientId) -> Result<ClientRecord, RegistryError> {
        let mut clients = self.clients.lock();
        let current = clients
            .get(client_id)
            .ok_or_else(|| RegistryError::UnknownClient(client_id.clone()))?;
        if current.revoked {
            return Ok(current.clone());
        }
        let updated = self.commit(&mut clients, |next| {
            next.get_mut(client_id).map(|rec| {
                rec.revoked = true;
                rec.clone()
            })
        })?;
        updated.ok_or_else(|| RegistryError::UnknownClient(client_id.clone()))
    }

    /// A point-in-time copy of every record.
    pub fn snapshot_all(&self) -> ClientMap {
        self.clients.lock().clone()
    }

    /// Screen a usage report and, when authenticated, record its total.
    ///
    /// Lookup, screening, mutation and save happen under one lock, so two
    /// reports for the same client cannot interleave. Nothing is mutated
    /// unless the signature verified.
    pub fn apply_report(&self, report: UsageReport) -> Result<UsageDecision, UsageError> {
        let mut clients = self.clients.lock();
        let client_id = report.client_id().clone();
        let record = clients
            .get(&client_id)
            .ok_or_else(|| UsageError::UnknownClient(client_id.clone()))?;

        let authenticated = match report.locate(record).screen()? {
            Screening::Revoked(decision) => {
                tracing::info!(client_id = %client_id, "report from revoked client");
                return Ok(decision);
            }
            Screening::Authenticated(auth) => auth,
        };

        let decision = self.commit(&mut clients, |next| {
            next.get_mut(&client_id).map(|rec| {
                rec.total_usage_bytes = authenticated.total_usage_bytes();
                authenticated.decide(rec.quota_bytes)
            })
        })?;
        let decision = decision.ok_or_else(|| UsageError::UnknownClient(client_id.clone()))?;
        tracing::info!(
            client_id = %client_id,
            total_usage_bytes = authenticated.total_usage_bytes(),
            allowed = decision.allowed,
            "usage recorded"
        );
        Ok(decision)
    }

    /// Run `op` against this registry on the blocking thread pool.
    ///
    /// The outer error is only a failed or panicked blocking task; `op`'s
    /// own result comes back as the inner value.
    pub async fn run_blocking<R, F>(self: &Arc<Self>, op: F) -> Result<R, StoreError>
    where
        F: FnOnce(&ClientRegistry) -> R + Send + 'static,
        R: Send + 'static,
    {
        let registry = Arc::clone(self);
        tokio::task::spawn_blocking(move || op(&registry))
            .await
            .map_err(|e| StoreError::TaskFailed(e.to_string()))
    }

    /// Apply `f` to a copy of `clients`, save the copy, then swap it in.
    fn commit<R>(
        &self,
        clients: &mut ClientMap,
        f: impl FnOnce(&mut ClientMap) -> R,
    ) -> Result<R, StoreError> {
        let mut next = clients.clone();
        let out = f(&mut next);
        if let Err(e) = self.store.save(&next) {
            tracing::error!(error = %e, "registry save failed, mutation discarded");
            return Err(e);
        }
        *clients = next;
        Ok(out)
    }
}
