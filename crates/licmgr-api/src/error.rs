//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps registry, usage, signer and summary errors to HTTP status codes with
//! a JSON body `{"error": {"code", "message"}}`. Internal error details are
//! logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use licmgr_signer_client::SignerError;
use licmgr_state::{RegistrationError, StoreError, UsageError};
use licmgr_summary::SummaryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "UNKNOWN_CLIENT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or incomplete request (400).
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// The client identity is not registered (404).
    #[error("unknown client: {0}")]
    UnknownClient(String),

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Signature missing or not base64 of 64 bytes (400).
    #[error("invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),

    /// Signature does not verify against the stored key (401).
    #[error("signature verification failed: {0}")]
    SignatureVerificationFailed(String),

    /// Missing or invalid admin token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Signer unreachable or replied with garbage (502).
    #[error("signer unavailable: {0}")]
    SignerUnavailable(String),

    /// Signer answered with a non-2xx status (502).
    #[error("signer rejected request: {0}")]
    SignerRejected(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            Self::UnknownClient(_) => (StatusCode::NOT_FOUND, "UNKNOWN_CLIENT"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::InvalidSignatureEncoding(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_SIGNATURE_ENCODING")
            }
            Self::SignatureVerificationFailed(_) => {
                (StatusCode::UNAUTHORIZED, "SIGNATURE_VERIFICATION_FAILED")
            }
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::SignerUnavailable(_) => (StatusCode::BAD_GATEWAY, "SIGNER_UNAVAILABLE"),
            Self::SignerRejected(_) => (StatusCode::BAD_GATEWAY, "SIGNER_REJECTED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::SignerUnavailable(_) | Self::SignerRejected(_) => {
                tracing::warn!(error = %self, "signer call failed")
            }
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<SignerError> for AppError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::Rejected { .. } => Self::SignerRejected(err.to_string()),
            SignerError::Unreachable { .. }
            | SignerError::Protocol(_)
            | SignerError::KeyUnavailable(_) => Self::SignerUnavailable(err.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::InvalidRequest(msg) => Self::BadRequest(msg),
            RegistrationError::Signer(e) => e.into(),
            RegistrationError::Persistence(e) => e.into(),
        }
    }
}

impl From<UsageError> for AppError {
    fn from(err: UsageError) -> Self {
        match err {
            UsageError::InvalidRequest(msg) => Self::BadRequest(msg),
            UsageError::UnknownClient(id) => Self::UnknownClient(id.to_string()),
            UsageError::InvalidSignatureEncoding(msg) => Self::InvalidSignatureEncoding(msg),
            UsageError::SignatureVerificationFailed(msg) => {
                Self::SignatureVerificationFailed(msg)
            }
            UsageError::Persistence(e) => e.into(),
        }
    }
}

impl From<SummaryError> for AppError {
    fn from(err: SummaryError) -> Self {
        match err {
            SummaryError::Signer(e) => e.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}
