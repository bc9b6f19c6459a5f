//! # Usage Report API
//!
//! `POST /report` accepts a client-signed cumulative usage claim. The body
//! is taken as an untyped JSON object: every field except `signature` is
//! part of the signed payload, including fields this server does not know.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use licmgr_state::{Action, Reason, UsageDecision, UsageReport};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Reply to an accepted report.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    /// Always `"ok"`.
    pub status: String,
    pub allowed: bool,
    pub remaining_bytes: i64,
    /// `continue` or `disable`.
    #[schema(value_type = String)]
    pub action: Action,
    /// `quota exceeded` or `revoked` when disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub reason: Option<Reason>,
}

impl From<UsageDecision> for ReportResponse {
    fn from(d: UsageDecision) -> Self {
        Self {
            status: "ok".into(),
            allowed: d.allowed,
            remaining_bytes: d.remaining_bytes,
            action: d.action,
            reason: d.reason,
        }
    }
}

/// Build the report router.
pub fn router() -> Router<AppState> {
    Router::new().route("/report", post(submit_report))
}

/// POST /report
#[utoipa::path(
    post,
    path = "/report",
    request_body(content = serde_json::Value, description = "`{client_id, total_usage_bytes, signature, ...}`"),
    responses(
        (status = 200, description = "Decision", body = ReportResponse),
        (status = 400, description = "Malformed report or signature encoding", body = crate::error::ErrorBody),
        (status = 401, description = "Signature does not verify", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown client", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub async fn submit_report(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ReportResponse>, AppError> {
    let report = UsageReport::from_json(extract_json(body)?)?;
    let client_id = report.client_id().clone();
    let decision = state
        .registry
        .run_blocking(move |r| r.apply_report(report))
        .await?
        .map_err(|e| {
            tracing::info!(client_id = %client_id, error = %e, "usage report refused");
            e
        })?;
    Ok(Json(decision.into()))
}
