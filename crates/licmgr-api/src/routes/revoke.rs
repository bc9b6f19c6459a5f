//! # Revocation API

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use licmgr_core::ClientId;
use licmgr_state::{revoke_client, RevocationOutcome};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RevokeRequest {
    pub client_id: String,
}

/// `revoked` is `false` only when the client is unknown.
#[derive(Debug, Serialize, ToSchema)]
pub struct RevokeResponse {
    pub revoked: bool,
}

impl From<RevocationOutcome> for RevokeResponse {
    fn from(o: RevocationOutcome) -> Self {
        Self { revoked: o.revoked }
    }
}

/// Build the revocation router. Mounted behind the admin token.
pub fn router() -> Router<AppState> {
    Router::new().route("/revoke", post(revoke))
}

/// POST /revoke
#[utoipa::path(
    post,
    path = "/revoke",
    request_body = RevokeRequest,
    responses(
        (status = 200, description = "Revocation result", body = RevokeResponse),
        (status = 400, description = "Missing client_id", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid admin token", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub async fn revoke(
    State(state): State<AppState>,
    body: Result<Json<RevokeRequest>, JsonRejection>,
) -> Result<Json<RevokeResponse>, AppError> {
    let req = extract_json(body)?;
    let client_id = ClientId::new(req.client_id).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let outcome = state
        .registry
        .run_blocking(move |r| revoke_client(r, &client_id))
        .await??;
    Ok(Json(outcome.into()))
}
