//! # Signer HTTP Surface
//!
//! Failures reply with `{"detail": "<code>"}`:
//!
//! | status | detail               | cause                                   |
//! |--------|----------------------|-----------------------------------------|
//! | 400    | `hw_lock_not_found`  | the seed file does not exist            |
//! | 400    | `invalid_json_body`  | the body is not JSON                    |
//! | 400    | `non_canonical_body` | the body holds a non-integer number     |
//! | 500    | `invalid_hw_file`    | the seed file exists but is unusable    |

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use licmgr_core::{sha256_digest, CanonicalBytes};
use licmgr_crypto::{Ed25519KeyPair, SeedError, SeedFile};
use licmgr_signer_client::{SignResponse, SignerInfo};
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Why a `/sign` request was refused.
#[derive(Error, Debug)]
pub enum SignFailure {
    #[error("seed file {0} not found")]
    HwLockNotFound(PathBuf),

    #[error("request body is not JSON: {0}")]
    InvalidJsonBody(String),

    #[error("request body cannot be canonically encoded: {0}")]
    NonCanonicalBody(String),

    #[error("seed file unusable: {0}")]
    InvalidHwFile(String),
}

impl SignFailure {
    fn status_and_detail(&self) -> (StatusCode, &'static str) {
        match self {
            Self::HwLockNotFound(_) => (StatusCode::BAD_REQUEST, "hw_lock_not_found"),
            Self::InvalidJsonBody(_) => (StatusCode::BAD_REQUEST, "invalid_json_body"),
            Self::NonCanonicalBody(_) => (StatusCode::BAD_REQUEST, "non_canonical_body"),
            Self::InvalidHwFile(_) => (StatusCode::INTERNAL_SERVER_ERROR, "invalid_hw_file"),
        }
    }
}

impl IntoResponse for SignFailure {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();
        if status.is_server_error() {
            tracing::error!(error = %self, "sign request failed");
        } else {
            tracing::warn!(error = %self, "sign request refused");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[derive(Debug, Clone)]
struct SignerState {
    seed_path: Arc<PathBuf>,
}

/// Read the seed file, distinguishing "no token" from "broken token".
fn load_key(path: &Path) -> Result<(SeedFile, Ed25519KeyPair), SignFailure> {
    let file = SeedFile::load(path).map_err(|e| match e {
        SeedError::Io { ref source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
            SignFailure::HwLockNotFound(path.to_path_buf())
        }
        other => SignFailure::InvalidHwFile(other.to_string()),
    })?;
    let seed = file
        .seed()
        .map_err(|e| SignFailure::InvalidHwFile(e.to_string()))?;
    Ok((file, seed.key_pair()))
}

/// The signer router, reading its key from `seed_path`.
pub fn router(seed_path: impl Into<PathBuf>) -> Router {
    let state = SignerState {
        seed_path: Arc::new(seed_path.into()),
    };
    Router::new()
        .route("/sign", post(sign))
        .route("/info", get(info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn sign(
    State(state): State<SignerState>,
    body: Bytes,
) -> Result<Json<SignResponse>, SignFailure> {
    let (_, key_pair) = load_key(&state.seed_path)?;

    let value: Value =
        serde_json::from_slice(&body).map_err(|e| SignFailure::InvalidJsonBody(e.to_string()))?;
    let canonical = CanonicalBytes::from_value(&value)
        .map_err(|e| SignFailure::NonCanonicalBody(e.to_string()))?;

    let signature = key_pair.sign(&canonical);
    tracing::info!(
        digest = %sha256_digest(&canonical),
        bytes = canonical.len(),
        "document signed"
    );
    Ok(Json(SignResponse {
        signature: signature.to_base64(),
    }))
}

async fn info(State(state): State<SignerState>) -> Json<SignerInfo> {
    match load_key(&state.seed_path) {
        Ok((file, key_pair)) => Json(SignerInfo {
            present: true,
            device_id: file.device_id,
            public_key: Some(key_pair.public_key()),
        }),
        Err(SignFailure::HwLockNotFound(_)) => Json(SignerInfo {
            present: false,
            device_id: None,
            public_key: None,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "seed file present but unusable");
            Json(SignerInfo {
                present: true,
                device_id: None,
                public_key: None,
            })
        }
    }
}
