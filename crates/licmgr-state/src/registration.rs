//! # License Registration
//!
//! Issues a license: a fresh [`ClientRecord`] with a fixed quota and a
//! 30-day nominal expiry, plus a [`LicenseDescriptor`] signed by the external
//! signer over its canonical encoding.
//!
//! The descriptor is signed before the record is stored. If the signer
//! fails, the registration fails and the registry is untouched.

use std::sync::Arc;

use licmgr_core::{CanonicalBytes, ClientId, LicenseId, Timestamp};
use licmgr_crypto::{Ed25519PublicKey, Ed25519Signature};
use licmgr_signer_client::DocumentSigner;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RegistrationError;
use crate::record::{ClientRecord, QUOTA_BYTES};
use crate::registry::ClientRegistry;

/// Days between issuance and the nominal expiry.
pub const LICENSE_VALIDITY_DAYS: i64 = 30;

/// Body of a registration request. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationRequest {
    #[serde(default)]
    pub client_id: String,
    /// Base64 of the client's 32-byte Ed25519 public key.
    #[serde(default)]
    pub pub_key: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub fingerprint: Option<Map<String, Value>>,
}

/// The signed part of a registration reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseDescriptor {
    pub license_id: LicenseId,
    pub client_id: ClientId,
    pub app_id: String,
    pub quota_bytes: i64,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    pub fingerprint: Map<String, Value>,
}

/// Registration reply: the descriptor, the signer's signature over its
/// canonical encoding, and the signer's public key when known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    pub license: LicenseDescriptor,
    pub signature: Ed25519Signature,
    pub server_pub_key: Option<Ed25519PublicKey>,
}

impl RegistrationRequest {
    fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, RegistrationError> {
        if value.trim().is_empty() {
            return Err(RegistrationError::InvalidRequest(format!("{field} is required")));
        }
        Ok(value)
    }

    /// Validate and build the record this request would store.
    pub fn into_record(self, now: Timestamp) -> Result<ClientRecord, RegistrationError> {
        let client_id = ClientId::new(Self::required("client_id", &self.client_id)?)
            .map_err(|e| RegistrationError::InvalidRequest(e.to_string()))?;
        let pub_key_b64 = Self::required("pub_key", &self.pub_key)?;
        let app_id = Self::required("app_id", &self.app_id)?.to_string();

        let pub_key = Ed25519PublicKey::from_base64(pub_key_b64)
            .map_err(|e| RegistrationError::InvalidRequest(format!("pub_key: {e}")))?;
        pub_key
            .to_verifying_key()
            .map_err(|e| RegistrationError::InvalidRequest(format!("pub_key: {e}")))?;

        Ok(ClientRecord {
            client_id,
            pub_key,
            fingerprint: self.fingerprint.unwrap_or_default(),
            app_id,
            version: self.version.unwrap_or_default(),
            license_id: LicenseId::issued_at(&now),
            quota_bytes: QUOTA_BYTES,
            total_usage_bytes: 0,
            issued_at: now,
            expires_at: now.plus_days(LICENSE_VALIDITY_DAYS),
            revoked: false,
        })
    }
}

impl LicenseDescriptor {
    pub fn for_record(record: &ClientRecord) -> Self {
        Self {
            license_id: record.license_id.clone(),
            client_id: record.client_id.clone(),
            app_id: record.app_id.clone(),
            quota_bytes: record.quota_bytes,
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            fingerprint: record.fingerprint.clone(),
        }
    }
}

/// Register (or re-register) a client.
///
/// Re-registering an existing identity replaces its record wholesale:
/// usage returns to zero and a revoked client becomes active again.
pub async fn register(
    registry: &Arc<ClientRegistry>,
    signer: &dyn DocumentSigner,
    request: RegistrationRequest,
    now: Timestamp,
) -> Result<RegistrationReceipt, RegistrationError> {
    let record = request.into_record(now)?;
    let license = LicenseDescriptor::for_record(&record);
    let canonical = CanonicalBytes::new(&license)
        .map_err(|e| RegistrationError::InvalidRequest(format!("fingerprint: {e}")))?;

    let signature = signer.sign(&canonical).await?;

    let replaced = registry.run_blocking(move |r| r.upsert(record)).await??;
    tracing::info!(
        client_id = %license.client_id,
        license_id = %license.license_id,
        replaced = replaced.is_some(),
        "license issued"
    );

    Ok(RegistrationReceipt {
        license,
        signature,
        server_pub_key: signer.public_key(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use licmgr_crypto::{verify_with_public_key, Ed25519KeyPair};
    use licmgr_signer_client::{LocalSigner, SignerError};
    use serde_json::json;

    struct DownSigner;

    #[async_trait]
    impl DocumentSigner for DownSigner {
        async fn sign(&self, _: &CanonicalBytes) -> Result<Ed25519Signature, SignerError> {
            Err(SignerError::Unreachable {
                endpoint: "http://127.0.0.1:1/sign".into(),
                reason: "connection refused".into(),
            })
        }

        fn public_key(&self) -> Option<Ed25519PublicKey> {
            None
        }
    }

    fn now() -> Timestamp {
        Timestamp::parse("2026-01-15T12:00:00Z").unwrap()
    }

    fn request(id: &str) -> RegistrationRequest {
        RegistrationRequest {
            client_id: id.into(),
            pub_key: Ed25519KeyPair::generate().public_key().to_base64(),
            app_id: "api-cybernetics".into(),
            version: Some("0.1".into()),
            fingerprint: Some(json!({"machine_id": "dev-machine-1"}).as_object().unwrap().clone()),
        }
    }

    #[tokio::test]
    async fn issues_license_with_fixed_quota() {
        let reg = Arc::new(ClientRegistry::in_memory());
        let signer = LocalSigner::new(Ed25519KeyPair::generate());
        let receipt = register(&reg, &signer, request("dev1"), now()).await.unwrap();

        assert_eq!(receipt.license.quota_bytes, 104857600);
        assert_eq!(receipt.license.license_id.as_str(), "LIC-20260115120000");
        assert_eq!(receipt.license.expires_at.to_iso8601(), "2026-02-14T12:00:00Z");
        assert_eq!(receipt.license.fingerprint["machine_id"], "dev-machine-1");

        let rec = reg.get(&ClientId::new("dev1").unwrap()).unwrap();
        assert_eq!(rec.total_usage_bytes, 0);
        assert_eq!(rec.version, "0.1");
        assert!(!rec.revoked);
    }

    #[tokio::test]
    async fn signature_covers_canonical_descriptor() {
        let reg = Arc::new(ClientRegistry::in_memory());
        let signer = LocalSigner::new(Ed25519KeyPair::generate());
        let receipt = register(&reg, &signer, request("dev1"), now()).await.unwrap();

        let pk = receipt.server_pub_key.unwrap();
        let canonical = CanonicalBytes::new(&receipt.license).unwrap();
        verify_with_public_key(&canonical, &receipt.signature, &pk).unwrap();
    }

    #[tokio::test]
    async fn missing_fields_are_invalid() {
        let reg = Arc::new(ClientRegistry::in_memory());
        let signer = LocalSigner::new(Ed25519KeyPair::generate());
        let cases: [fn(&mut RegistrationRequest); 4] = [
            |r| r.client_id = "  ".into(),
            |r| r.pub_key.clear(),
            |r| r.app_id.clear(),
            |r| r.pub_key = "not-a-key".into(),
        ];
        for mutate in cases {
            let mut req = request("dev1");
            mutate(&mut req);
            let err = register(&reg, &signer, req, now()).await.unwrap_err();
            assert!(matches!(err, RegistrationError::InvalidRequest(_)));
        }
        assert!(reg.is_empty());
    }

    #[tokio::test]
    async fn optional_fields_default() {
        let reg = Arc::new(ClientRegistry::in_memory());
        let signer = LocalSigner::new(Ed25519KeyPair::generate());
        let mut req = request("dev1");
        req.version = None;
        req.fingerprint = None;
        let receipt = register(&reg, &signer, req, now()).await.unwrap();
        assert!(receipt.license.fingerprint.is_empty());
        assert_eq!(reg.get(&ClientId::new("dev1").unwrap()).unwrap().version, "");
    }

    #[tokio::test]
    async fn signer_failure_stores_nothing() {
        let reg = Arc::new(ClientRegistry::in_memory());
        let err = register(&reg, &DownSigner, request("dev1"), now()).await.unwrap_err();
        assert!(matches!(err, RegistrationError::Signer(SignerError::Unreachable { .. })));
        assert!(reg.is_empty());
    }

    #[tokio::test]
    async fn float_in_fingerprint_is_invalid() {
        let reg = Arc::new(ClientRegistry::in_memory());
        let signer = LocalSigner::new(Ed25519KeyPair::generate());
        let mut req = request("dev1");
        req.fingerprint = Some(json!({"load": 0.75}).as_object().unwrap().clone());
        let err = register(&reg, &signer, req, now()).await.unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidRequest(_)));
        assert!(reg.is_empty());
    }

    #[tokio::test]
    async fn reregistration_replaces_record() {
        let reg = Arc::new(ClientRegistry::in_memory());
        let signer = LocalSigner::new(Ed25519KeyPair::generate());
        register(&reg, &signer, request("dev1"), now()).await.unwrap();
        let id = ClientId::new("dev1").unwrap();
        reg.set_usage(&id, 1000).unwrap();
        reg.revoke(&id).unwrap();

        let later = now().plus_days(1);
        register(&reg, &signer, request("dev1"), later).await.unwrap();
        let rec = reg.get(&id).unwrap();
        assert!(!rec.revoked);
        assert_eq!(rec.total_usage_bytes, 0);
        assert_eq!(rec.license_id.as_str(), "LIC-20260116120000");
    }
}
