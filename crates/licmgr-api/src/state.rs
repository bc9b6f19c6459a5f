//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The registry is the only mutable shared resource. Handlers never hold
//! its lock across an `.await`; signing happens outside it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use licmgr_signer_client::DocumentSigner;
use licmgr_state::ClientRegistry;
use licmgr_summary::SummaryGenerator;

/// Log output format for the binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `LICMGR_LOG_FORMAT=json` selects JSON lines; anything else is text.
    pub fn from_env() -> Self {
        match std::env::var("LICMGR_LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// JSON file holding the client registry.
    pub store_path: PathBuf,
    /// Directory receiving one signed summary per day.
    pub summary_dir: PathBuf,
    /// Period of the summary scheduler.
    pub summary_interval: Duration,
    /// Bearer token for `/revoke` and `/summary/generate`.
    /// If `None`, those routes are open.
    pub admin_token: Option<String>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("store_path", &self.store_path)
            .field("summary_dir", &self.summary_dir)
            .field("summary_interval", &self.summary_interval)
            .field(
                "admin_token",
                &self.admin_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            store_path: PathBuf::from("data/clients.json"),
            summary_dir: PathBuf::from("summaries"),
            summary_interval: Duration::from_secs(86_400),
            admin_token: None,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables, falling back to
    /// [`Default`] for anything unset or unparseable.
    ///
    /// Variables: `LICMGR_PORT`, `LICMGR_STORE_PATH`, `LICMGR_SUMMARY_DIR`,
    /// `LICMGR_SUMMARY_INTERVAL_SECS`, `LICMGR_ADMIN_TOKEN`,
    /// `LICMGR_LOG_FORMAT`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("LICMGR_PORT").unwrap_or(defaults.port),
            store_path: std::env::var("LICMGR_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            summary_dir: std::env::var("LICMGR_SUMMARY_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.summary_dir),
            summary_interval: env_parse::<u64>("LICMGR_SUMMARY_INTERVAL_SECS")
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.summary_interval),
            admin_token: std::env::var("LICMGR_ADMIN_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            log_format: LogFormat::from_env(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    let raw = std::env::var(var).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ClientRegistry>,
    pub signer: Arc<dyn DocumentSigner>,
    pub generator: Arc<SummaryGenerator>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire a registry and signer into a state, building the summary
    /// generator over `config.summary_dir`.
    pub fn new(
        config: AppConfig,
        registry: Arc<ClientRegistry>,
        signer: Arc<dyn DocumentSigner>,
    ) -> Self {
        let generator = Arc::new(SummaryGenerator::new(
            Arc::clone(&registry),
            Arc::clone(&signer),
            config.summary_dir.clone(),
        ));
        Self {
            registry,
            signer,
            generator,
            config: Arc::new(config),
        }
    }
}
