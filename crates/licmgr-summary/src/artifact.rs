//! # Signed Artifact Files
//!
//! One pretty-printed `{"summary": ..., "signature": "<base64>"}` file per
//! UTC day, named `YYYY-MM-DD.json`. Writing the same day again replaces the
//! file.
//!
//! Writes go to a hidden temp file in the target directory, are synced, and
//! are renamed onto the final name, so readers never observe a partial
//! artifact. Naming and discovery come from `licmgr_core::artifact`, which
//! ignores the hidden temp files.

use std::io::Write;
use std::path::{Path, PathBuf};

use licmgr_core::artifact_file_name;
use licmgr_crypto::Ed25519Signature;
use serde::{Deserialize, Serialize};

use crate::error::SummaryError;
use crate::snapshot::SummarySnapshot;

/// A snapshot and the external signer's signature over its canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedArtifact {
    pub summary: SummarySnapshot,
    pub signature: Ed25519Signature,
}

/// Atomically write `artifact` to `<dir>/<date>.json`, creating `dir` if
/// needed. Returns the final path.
pub fn write_artifact(dir: &Path, artifact: &SignedArtifact) -> Result<PathBuf, SummaryError> {
    let bytes = serde_json::to_vec_pretty(artifact)
        .map_err(|e| SummaryError::Encoding(e.to_string()))?;
    std::fs::create_dir_all(dir).map_err(|e| SummaryError::io(dir, e))?;

    let final_path = dir.join(artifact_file_name(artifact.summary.date));
    let mut temp = tempfile::Builder::new()
        .prefix(".summary-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| SummaryError::io(dir, e))?;
    temp.write_all(&bytes)
        .map_err(|e| SummaryError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| SummaryError::io(temp.path(), e))?;
    temp.persist(&final_path)
        .map_err(|e| SummaryError::io(&final_path, e.error))?;
    Ok(final_path)
}

/// Read and parse an artifact file.
pub fn read_artifact(path: &Path) -> Result<SignedArtifact, SummaryError> {
    let raw = std::fs::read(path).map_err(|e| SummaryError::io(path, e))?;
    serde_json::from_slice(&raw).map_err(|e| SummaryError::Encoding(e.to_string()))
}
