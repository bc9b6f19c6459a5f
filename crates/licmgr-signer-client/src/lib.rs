//! # licmgr-signer-client: External Signing Authority
//!
//! The signing key for license descriptors and usage summaries lives outside
//! the manager process, in a hardware signer reachable over HTTP:
//!
//! | Method | Path    | Body                      | Reply                                   |
//! |--------|---------|---------------------------|-----------------------------------------|
//! | POST   | `/sign` | raw canonical JSON bytes  | `{"signature": "<base64>"}`             |
//! | GET    | `/info` | –                         | `{"present", "device_id", "public_key"}`|
//!
//! Callers depend on the [`DocumentSigner`] trait, not on the transport.
//! [`SignerClient`] is the HTTP implementation; [`LocalSigner`] signs
//! in-process with a key pair and backs the signer emulator and tests.
//!
//! ## Timeouts and retries
//!
//! Requests carry a configurable timeout and are re-sent with exponential
//! backoff on transport errors, per the configured [`RetryPolicy`]. A
//! non-2xx reply is never retried.

pub mod config;
pub mod error;
pub mod local;
pub mod retry;

pub use config::{ConfigError, SignerConfig};
pub use error::SignerError;
pub use local::LocalSigner;
pub use retry::RetryPolicy;

use std::time::Duration;

use async_trait::async_trait;
use licmgr_core::CanonicalBytes;
use licmgr_crypto::{Ed25519PublicKey, Ed25519Signature};
use serde::{Deserialize, Serialize};
use url::Url;

/// Anything that can produce an Ed25519 signature over canonical bytes.
#[async_trait]
pub trait DocumentSigner: Send + Sync {
    /// Sign the canonical encoding of a document.
    async fn sign(&self, document: &CanonicalBytes) -> Result<Ed25519Signature, SignerError>;

    /// The signer's public key, when known to this process.
    fn public_key(&self) -> Option<Ed25519PublicKey>;
}

/// Reply body of `POST /sign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignResponse {
    /// Base64 of the 64-byte signature.
    pub signature: String,
}

/// Reply body of `GET /info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    /// Whether the signer holds a key.
    pub present: bool,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub public_key: Option<Ed25519PublicKey>,
}

/// HTTP client for the external signer.
#[derive(Debug, Clone)]
pub struct SignerClient {
    http: reqwest::Client,
    base_url: Url,
    public_key: Option<Ed25519PublicKey>,
    retry: RetryPolicy,
}

impl SignerClient {
    /// Build a client from configuration.
    pub fn new(config: SignerConfig) -> Result<Self, SignerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SignerError::Unreachable {
                endpoint: "client_init".into(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url: config.url,
            public_key: config.public_key,
            retry: config.retry,
        })
    }

    /// Remember the signer's public key, e.g. after a successful [`Self::info`].
    pub fn with_public_key(mut self, public_key: Ed25519PublicKey) -> Self {
        self.public_key = Some(public_key);
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, SignerError> {
        self.base_url
            .join(path)
            .map_err(|e| SignerError::Protocol(format!("invalid signer URL for {path}: {e}")))
    }

    /// Query `GET /info`.
    pub async fn info(&self) -> Result<SignerInfo, SignerError> {
        let url = self.endpoint("info")?;
        let endpoint = url.to_string();
        let resp = self
            .retry
            .send(&endpoint, || self.http.get(url.clone()).send())
            .await
            .map_err(|e| SignerError::Unreachable {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
        let status = resp.status();
        if !status.is_success() {
            let body = error_body(resp, &endpoint).await;
            return Err(SignerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        resp.json::<SignerInfo>()
            .await
            .map_err(|e| SignerError::Protocol(format!("unreadable reply from {endpoint}: {e}")))
    }
}

#[async_trait]
impl DocumentSigner for SignerClient {
    async fn sign(&self, document: &CanonicalBytes) -> Result<Ed25519Signature, SignerError> {
        let url = self.endpoint("sign")?;
        let endpoint = url.to_string();
        let body = document.as_bytes().to_vec();

        let resp = self
            .retry
            .send(&endpoint, || {
                self.http
                    .post(url.clone())
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(body.clone())
                    .send()
            })
            .await
            .map_err(|e| SignerError::Unreachable {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = error_body(resp, &endpoint).await;
            tracing::warn!(status = status.as_u16(), %endpoint, "signer rejected request");
            return Err(SignerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let reply: SignResponse = resp
            .json()
            .await
            .map_err(|e| SignerError::Protocol(format!("unreadable reply from {endpoint}: {e}")))?;
        Ed25519Signature::from_base64(&reply.signature)
            .map_err(|e| SignerError::Protocol(e.to_string()))
    }

    fn public_key(&self) -> Option<Ed25519PublicKey> {
        self.public_key
    }
}

/// Body of a non-2xx reply, or empty if it cannot be read.
async fn error_body(resp: reqwest::Response, endpoint: &str) -> String {
    match resp.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(endpoint, error = %e, "could not read signer error body");
            String::new()
        }
    }
}
