//! Signer client error types.
//!
//! Errors are `Clone` so that one failed signing can be reported to every
//! caller waiting on the same in-flight summary generation.

/// Errors from the external signer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    /// Transport failure after all retries (connection refused, timeout, ...).
    #[error("signer unreachable at {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },

    /// The signer answered with a non-2xx status.
    #[error("signer rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The signer answered 2xx but the reply was not a usable signature.
    #[error("signer protocol error: {0}")]
    Protocol(String),

    /// Local key material could not be loaded.
    #[error("signing key unavailable: {0}")]
    KeyUnavailable(String),
}
