//! The summary snapshot.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use licmgr_core::{ClientId, LicenseId, Timestamp};
use licmgr_state::{ClientMap, ClientRecord};
use serde::{Deserialize, Serialize};

/// Usage view of one client inside a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientUsageView {
    pub license_id: LicenseId,
    pub total_usage_bytes: i64,
    pub quota_bytes: i64,
    pub revoked: bool,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

impl From<&ClientRecord> for ClientUsageView {
    fn from(rec: &ClientRecord) -> Self {
        Self {
            license_id: rec.license_id.clone(),
            total_usage_bytes: rec.total_usage_bytes,
            quota_bytes: rec.quota_bytes,
            revoked: rec.revoked,
            issued_at: rec.issued_at,
            expires_at: rec.expires_at,
        }
    }
}

/// Point-in-time view of every client. This is what gets signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySnapshot {
    /// UTC calendar day, `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub generated_at: Timestamp,
    pub clients: BTreeMap<ClientId, ClientUsageView>,
}

impl SummarySnapshot {
    /// Snapshot `clients` as of `generated_at`.
    pub fn from_clients(clients: &ClientMap, generated_at: Timestamp) -> Self {
        Self {
            date: generated_at.date(),
            generated_at,
            clients: clients
                .iter()
                .map(|(id, rec)| (id.clone(), ClientUsageView::from(rec)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use licmgr_core::CanonicalBytes;
    use licmgr_crypto::Ed25519KeyPair;

    #[test]
    fn canonical_shape() {
        let issued = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let rec = ClientRecord {
            client_id: ClientId::new("dev1").unwrap(),
            pub_key: Ed25519KeyPair::from_seed(&[1u8; 32]).public_key(),
            fingerprint: serde_json::Map::new(),
            app_id: "app".into(),
            version: "1".into(),
            license_id: LicenseId::issued_at(&issued),
            quota_bytes: 104857600,
            total_usage_bytes: 52428800,
            issued_at: issued,
            expires_at: Timestamp::parse("2026-01-31T00:00:00Z").unwrap(),
            revoked: false,
        };
        let mut clients = ClientMap::new();
        clients.insert(rec.client_id.clone(), rec);

        let snap = SummarySnapshot::from_clients(
            &clients,
            Timestamp::parse("2026-01-15T00:00:00Z").unwrap(),
        );
        let cb = CanonicalBytes::new(&snap).unwrap();
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            r#"{"clients":{"dev1":{"expires_at":"2026-01-31T00:00:00Z","issued_at":"2026-01-01T00:00:00Z","license_id":"LIC-20260101000000","quota_bytes":104857600,"revoked":false,"total_usage_bytes":52428800}},"date":"2026-01-15","generated_at":"2026-01-15T00:00:00Z"}"#
        );
    }

    #[test]
    fn date_follows_generation_time() {
        let snap = SummarySnapshot::from_clients(
            &ClientMap::new(),
            Timestamp::parse("2026-03-31T23:59:59Z").unwrap(),
        );
        assert_eq!(snap.date.to_string(), "2026-03-31");
        assert!(snap.clients.is_empty());
    }
}
