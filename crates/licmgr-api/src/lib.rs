//! # licmgr-api: License Manager HTTP Service
//!
//! ## API Surface
//!
//! | Route                     | Module                 | Auth        |
//! |---------------------------|------------------------|-------------|
//! | `GET /ping`, `/heartbeat` | [`routes::health`]     | none        |
//! | `POST /register`          | [`routes::license`]    | none        |
//! | `POST /report`            | [`routes::report`]     | signature   |
//! | `POST /revoke`            | [`routes::revoke`]     | admin token |
//! | `POST /summary/generate`  | [`routes::summary`]    | admin token |
//! | `GET /summary/latest`     | [`routes::summary`]    | none        |
//! | `GET /openapi.json`       | [`openapi`]            | none        |
//!
//! The admin token is optional; without one the admin routes are open.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AdminAuth (admin routes only) → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.admin_token.clone(),
    };

    let admin = Router::new()
        .merge(routes::revoke::router())
        .merge(routes::summary::admin_router())
        .layer(from_fn(auth::require_admin_token))
        .layer(axum::Extension(auth_config));

    Router::new()
        .merge(routes::health::router())
        .merge(routes::license::router())
        .merge(routes::report::router())
        .merge(routes::summary::router())
        .merge(openapi::router())
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
