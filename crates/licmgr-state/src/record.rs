//! The per-client license record.

use licmgr_core::{ClientId, LicenseId, Timestamp};
use licmgr_crypto::Ed25519PublicKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Quota granted to every license: 100 MiB.
pub const QUOTA_BYTES: i64 = 100 * 1024 * 1024;

/// A client's issued license plus its usage and revocation state.
///
/// Only [`crate::ClientRegistry`] mutates records. `quota_bytes` is fixed at
/// issuance; `total_usage_bytes` is replaced by each verified report;
/// `revoked` is never reset except by a full re-registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub client_id: ClientId,
    pub pub_key: Ed25519PublicKey,
    /// Informational, never validated.
    #[serde(default)]
    pub fingerprint: Map<String, Value>,
    pub app_id: String,
    #[serde(default)]
    pub version: String,
    pub license_id: LicenseId,
    pub quota_bytes: i64,
    pub total_usage_bytes: i64,
    pub issued_at: Timestamp,
    /// Stored and reported; not enforced.
    pub expires_at: Timestamp,
    #[serde(default)]
    pub revoked: bool,
}

impl ClientRecord {
    /// Quota minus usage. Negative once the quota is exceeded.
    pub fn remaining_bytes(&self) -> i64 {
        self.quota_bytes.saturating_sub(self.total_usage_bytes)
    }

    pub fn within_quota(&self) -> bool {
        self.total_usage_bytes <= self.quota_bytes
    }
}
