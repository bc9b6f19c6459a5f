//! # Usage Summary API
//!
//! `POST /summary/generate` runs the same single-flight generation as the
//! scheduler. `GET /summary/latest` returns the newest artifact on disk, read on
//! the blocking pool.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use licmgr_summary::{latest_artifact_path, read_artifact, SignedArtifact, SummaryOutcome};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

/// Result of a manual generation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub path: String,
    pub client_count: usize,
    /// `sha256:<hex>` of the signed canonical bytes.
    pub digest: String,
}

impl From<SummaryOutcome> for GenerateResponse {
    fn from(o: SummaryOutcome) -> Self {
        Self {
            date: o.date.format("%Y-%m-%d").to_string(),
            path: o.path.display().to_string(),
            client_count: o.client_count,
            digest: o.digest.to_string(),
        }
    }
}

/// Admin-only routes.
pub fn admin_router() -> Router<AppState> {
    Router::new().route("/summary/generate", post(generate_summary))
}

/// Read-only routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/summary/latest", get(latest_summary))
}

/// POST /summary/generate
#[utoipa::path(
    post,
    path = "/summary/generate",
    responses(
        (status = 200, description = "Summary written", body = GenerateResponse),
        (status = 401, description = "Missing or invalid admin token", body = crate::error::ErrorBody),
        (status = 502, description = "Signer failed; nothing written", body = crate::error::ErrorBody),
    ),
    tag = "summaries"
)]
pub async fn generate_summary(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, AppError> {
    let outcome = state.generator.generate().await?;
    Ok(Json(outcome.into()))
}

/// GET /summary/latest
#[utoipa::path(
    get,
    path = "/summary/latest",
    responses(
        (status = 200, description = "Latest signed summary", body = serde_json::Value),
        (status = 404, description = "No summary generated yet", body = crate::error::ErrorBody),
    ),
    tag = "summaries"
)]
pub async fn latest_summary(
    State(state): State<AppState>,
) -> Result<Json<SignedArtifact>, AppError> {
    let dir = state.generator.dir().to_path_buf();
    let artifact = tokio::task::spawn_blocking(move || {
        let path = match latest_artifact_path(&dir) {
            Ok(Some(path)) => path,
            Ok(None) => return Err(AppError::NotFound("no summary has been generated".into())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound("no summary has been generated".into()))
            }
            Err(e) => return Err(AppError::Internal(format!("{}: {e}", dir.display()))),
        };
        Ok(read_artifact(&path)?)
    })
    .await
    .map_err(|e| AppError::Internal(format!("summary read task failed: {e}")))??;
    Ok(Json(artifact))
}
