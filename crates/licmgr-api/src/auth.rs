//! # Admin Authentication
//!
//! Optional static bearer token guarding the administrative routes
//! (`/revoke`, `/summary/generate`). Client-facing routes (`/register`,
//! `/report`) authenticate by signature and are never behind this layer.
//!
//! When no token is configured every request passes.

use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// Auth configuration injected into request extensions.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Constant-time comparison of bearer tokens.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Reject requests without the configured bearer token.
pub async fn require_admin_token(request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|c| c.token.clone());

    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match provided.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if constant_time_token_eq(token, &expected) => next.run(request).await,
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "admin authentication failed: invalid token");
            AppError::Unauthorized("invalid bearer token".into()).into_response()
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "admin authentication failed: missing token");
            AppError::Unauthorized("missing bearer token".into()).into_response()
        }
    }
}
