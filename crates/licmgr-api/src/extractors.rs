//! # Request Extraction
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and call [`extract_json`]
//! so malformed bodies produce the same error envelope as domain errors.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}
