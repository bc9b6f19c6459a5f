//! Signer client configuration.
//!
//! Defaults point at a signer on the same host. Override via environment
//! variables or explicit construction for tests.

use licmgr_crypto::Ed25519PublicKey;
use url::Url;

use crate::retry::RetryPolicy;

/// Configuration for reaching the external signer.
#[derive(Debug, Clone)]
pub struct SignerConfig {
    /// Base URL of the signer. Always ends with `/`.
    pub url: Url,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// The signer's public key, if known ahead of time.
    pub public_key: Option<Ed25519PublicKey>,
    /// Re-sends on transport failure.
    pub retry: RetryPolicy,
}

impl SignerConfig {
    /// Configuration for a signer at `url` with the default timeout.
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_base_url("signer url", url)?,
            timeout_secs: 30,
            public_key: None,
            retry: RetryPolicy::default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `LICMGR_SIGNER_URL` (default: `http://127.0.0.1:8081`)
    /// - `LICMGR_SIGNER_TIMEOUT_SECS` (default: 30)
    /// - `LICMGR_SIGNER_PUBLIC_KEY` (optional, base64)
    /// - `LICMGR_SIGNER_MAX_RETRIES` (default: 3)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("LICMGR_SIGNER_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8081".to_string());
        let public_key = match std::env::var("LICMGR_SIGNER_PUBLIC_KEY") {
            Ok(s) if !s.trim().is_empty() => Some(
                Ed25519PublicKey::from_base64(&s)
                    .map_err(|e| ConfigError::InvalidPublicKey(e.to_string()))?,
            ),
            _ => None,
        };
        Ok(Self {
            url: parse_base_url("LICMGR_SIGNER_URL", &raw)?,
            timeout_secs: std::env::var("LICMGR_SIGNER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            public_key,
            retry: RetryPolicy {
                max_retries: std::env::var("LICMGR_SIGNER_MAX_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(RetryPolicy::default().max_retries),
                ..RetryPolicy::default()
            },
        })
    }
}

fn parse_base_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("LICMGR_SIGNER_PUBLIC_KEY is not a valid Ed25519 public key: {0}")]
    InvalidPublicKey(String),
}
