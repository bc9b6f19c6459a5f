//! Route modules. Each exposes `router() -> Router<AppState>`.

pub mod health;
pub mod license;
pub mod report;
pub mod revoke;
pub mod summary;
