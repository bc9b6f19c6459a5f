//! # Error Types
//!
//! Leaf error types shared by every crate in the workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Cryptographic errors fail loudly with full context; validation errors
//! name the offending field and value.

use thiserror::Error;

/// Error during canonical encoding.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Non-integer numbers are not permitted in canonical representations.
    #[error("non-integer number {0} is not permitted in a canonical representation")]
    FloatRejected(String),

    /// The value could not be converted to or parsed as JSON.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key decoding or derivation failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// An encoded signature could not be decoded.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
}

/// A domain value failed validation at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty or whitespace.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// A timestamp did not match `YYYY-MM-DDTHH:MM:SSZ`.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
