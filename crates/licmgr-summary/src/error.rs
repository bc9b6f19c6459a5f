//! Summary generation errors.
//!
//! `Clone` so every caller sharing one in-flight generation receives the
//! same error.

use std::path::PathBuf;

use licmgr_signer_client::SignerError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    /// The snapshot could not be canonically encoded.
    #[error("summary canonicalization failed: {0}")]
    Canonicalization(String),

    /// The external signer did not produce a signature.
    #[error(transparent)]
    Signer(#[from] SignerError),

    /// Writing or reading an artifact failed.
    #[error("summary I/O at {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// An artifact could not be encoded or decoded.
    #[error("summary artifact encoding: {0}")]
    Encoding(String),

    /// The blocking task doing artifact I/O panicked or was cancelled.
    #[error("summary task failed: {0}")]
    TaskFailed(String),
}

impl SummaryError {
    pub(crate) fn io(path: &std::path::Path, e: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    }
}
