//! # License Registration API
//!
//! `POST /register` issues (or re-issues) a license for a client and returns
//! it with the external signer's signature over its canonical encoding.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use licmgr_core::Timestamp;
use licmgr_crypto::{Ed25519PublicKey, Ed25519Signature};
use licmgr_state::{register, LicenseDescriptor, RegistrationReceipt, RegistrationRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Registration request. Unknown fields are ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub client_id: String,
    /// Base64 of the client's 32-byte Ed25519 public key.
    #[serde(default)]
    pub pub_key: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Free-form device fingerprint, echoed in the license.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub fingerprint: Option<Map<String, Value>>,
}

impl From<RegisterRequest> for RegistrationRequest {
    fn from(req: RegisterRequest) -> Self {
        Self {
            client_id: req.client_id,
            pub_key: req.pub_key,
            app_id: req.app_id,
            version: req.version,
            fingerprint: req.fingerprint,
        }
    }
}

/// Registration reply.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    /// `{license_id, client_id, app_id, quota_bytes, issued_at, expires_at, fingerprint}`.
    #[schema(value_type = Object)]
    pub license: LicenseDescriptor,
    /// Base64 signature over the canonical encoding of `license`.
    #[schema(value_type = String)]
    pub signature: Ed25519Signature,
    /// Base64 public key of the signer, when known.
    #[schema(value_type = Option<String>)]
    pub server_pub_key: Option<Ed25519PublicKey>,
}

impl From<RegistrationReceipt> for RegisterResponse {
    fn from(receipt: RegistrationReceipt) -> Self {
        Self {
            license: receipt.license,
            signature: receipt.signature,
            server_pub_key: receipt.server_pub_key,
        }
    }
}

/// Build the registration router.
pub fn router() -> Router<AppState> {
    Router::new().route("/register", post(register_client))
}

/// POST /register
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "License issued", body = RegisterResponse),
        (status = 400, description = "Missing field or bad public key", body = crate::error::ErrorBody),
        (status = 502, description = "Signer failed", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub async fn register_client(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, AppError> {
    let req = extract_json(body)?;
    let receipt = register(
        &state.registry,
        state.signer.as_ref(),
        req.into(),
        Timestamp::now(),
    )
    .await?;
    Ok(Json(receipt.into()))
}
