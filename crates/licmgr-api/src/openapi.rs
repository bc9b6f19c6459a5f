//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "licmgr: License Manager",
        version = "0.1.0",
        description = "Client registration, signed usage reports, revocation, and externally signed daily usage summaries."
    ),
    paths(
        crate::routes::health::ping,
        crate::routes::health::heartbeat,
        crate::routes::license::register_client,
        crate::routes::report::submit_report,
        crate::routes::revoke::revoke,
        crate::routes::summary::generate_summary,
        crate::routes::summary::latest_summary,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::health::HeartbeatResponse,
        crate::routes::license::RegisterRequest,
        crate::routes::license::RegisterResponse,
        crate::routes::report::ReportResponse,
        crate::routes::revoke::RevokeRequest,
        crate::routes::revoke::RevokeResponse,
        crate::routes::summary::GenerateResponse,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "licenses", description = "Registration, usage reports and revocation"),
        (name = "summaries", description = "Signed usage summaries"),
    )
)]
pub struct ApiDoc;

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
