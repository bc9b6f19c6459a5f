//! # Liveness
//!
//! `GET /ping` and `GET /heartbeat`, open to everyone.

use axum::routing::get;
use axum::{Json, Router};
use licmgr_core::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Heartbeat reply.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HeartbeatResponse {
    pub status: String,
    /// Server clock, `YYYY-MM-DDTHH:MM:SSZ`.
    pub server_time: String,
}

/// Build the liveness router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/heartbeat", get(heartbeat))
}

/// GET /ping
#[utoipa::path(
    get,
    path = "/ping",
    responses((status = 200, description = "Server is up", body = String)),
    tag = "health"
)]
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /heartbeat
#[utoipa::path(
    get,
    path = "/heartbeat",
    responses((status = 200, description = "Server time", body = HeartbeatResponse)),
    tag = "health"
)]
pub async fn heartbeat() -> Json<HeartbeatResponse> {
    Json(HeartbeatResponse {
        status: "ok".into(),
        server_time: Timestamp::now().to_iso8601(),
    })
}
