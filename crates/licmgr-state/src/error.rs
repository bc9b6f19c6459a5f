//! # Error Types
//!
//! One enum per operation family. The HTTP layer maps each variant to a
//! status code; nothing here knows about HTTP.

use std::path::PathBuf;

use licmgr_core::ClientId;
use licmgr_signer_client::SignerError;
use thiserror::Error;

/// Failure of the registry's stable storage.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading, writing or renaming the store file failed.
    #[error("store I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file exists but does not contain a valid registry.
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The registry could not be encoded.
    #[error("failed to encode registry: {0}")]
    Encode(#[source] serde_json::Error),

    /// A simulated failure (in-memory store).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The blocking task running a registry operation failed or panicked.
    #[error("registry task failed: {0}")]
    TaskFailed(String),
}

/// Errors from direct registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("unknown client: {0}")]
    UnknownClient(ClientId),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Errors from registration.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// A required field is missing or malformed.
    #[error("invalid registration request: {0}")]
    InvalidRequest(String),

    /// The external signer did not sign the license descriptor.
    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Errors from processing a usage report. The revoked outcome is a
/// decision, not an error.
#[derive(Error, Debug)]
pub enum UsageError {
    #[error("invalid usage report: {0}")]
    InvalidRequest(String),

    #[error("unknown client: {0}")]
    UnknownClient(ClientId),

    #[error("invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),

    #[error("signature verification failed: {0}")]
    SignatureVerificationFailed(String),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl From<RegistryError> for UsageError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::UnknownClient(id) => Self::UnknownClient(id),
            RegistryError::Persistence(e) => Self::Persistence(e),
        }
    }
}
