//! # Usage Report Verification
//!
//! A usage report is a JSON object signed by the client. The signature covers
//! the canonical encoding of the whole object with the `signature` field
//! removed, so every other field the client sends is authenticated too.
//!
//! ## State machine
//!
//! ```text
//! UsageReport ──locate(record)──▶ LocatedReport ──screen()──┬─▶ Screening::Revoked
//!                                                           └─▶ Screening::Authenticated
//!                                                                   │
//!                                                            decide(quota)
//!                                                                   ▼
//!                                                             UsageDecision
//! ```
//!
//! `screen()` checks the revoked flag BEFORE the signature. A revoked client
//! is answered with a `revoked` decision even when the signature is missing
//! or garbage, so anyone who knows a client id can learn whether it is
//! revoked without holding its key.

use licmgr_core::{CanonicalBytes, CanonicalizationError, ClientId, CryptoError};
use licmgr_crypto::{verify_with_public_key, Ed25519Signature};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::UsageError;
use crate::record::ClientRecord;

/// Name of the field excluded from the signed payload.
pub const SIGNATURE_FIELD: &str = "signature";

/// A parsed but not yet authenticated usage report.
#[derive(Debug, Clone)]
pub struct UsageReport {
    client_id: ClientId,
    total_usage_bytes: i64,
    signature: Option<Value>,
    payload: Map<String, Value>,
}

impl UsageReport {
    /// Parse a report body.
    ///
    /// Requires an object with a non-empty string `client_id` and a
    /// non-negative integer `total_usage_bytes`. The signature is not
    /// inspected here.
    pub fn from_json(body: Value) -> Result<Self, UsageError> {
        let Value::Object(mut payload) = body else {
            return Err(UsageError::InvalidRequest("report must be a JSON object".into()));
        };
        let signature = payload.remove(SIGNATURE_FIELD);

        let client_id = payload
            .get("client_id")
            .and_then(Value::as_str)
            .ok_or_else(|| UsageError::InvalidRequest("client_id must be a string".into()))
            .and_then(|s| {
                ClientId::new(s).map_err(|e| UsageError::InvalidRequest(e.to_string()))
            })?;

        let total_usage_bytes = payload
            .get("total_usage_bytes")
            .and_then(Value::as_i64)
            .filter(|n| *n >= 0)
            .ok_or_else(|| {
                UsageError::InvalidRequest(
                    "total_usage_bytes must be a non-negative integer".into(),
                )
            })?;

        Ok(Self {
            client_id,
            total_usage_bytes,
            signature,
            payload,
        })
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn total_usage_bytes(&self) -> i64 {
        self.total_usage_bytes
    }

    /// The canonical bytes the client is expected to have signed.
    pub fn signed_payload(&self) -> Result<CanonicalBytes, UsageError> {
        CanonicalBytes::new(&self.payload).map_err(|e| match e {
            CanonicalizationError::FloatRejected(n) => UsageError::InvalidRequest(format!(
                "report contains non-integer number {n}"
            )),
            other => UsageError::InvalidRequest(other.to_string()),
        })
    }

    /// Pair the report with the stored record for its client.
    pub fn locate(self, record: &ClientRecord) -> LocatedReport<'_> {
        LocatedReport {
            report: self,
            record,
        }
    }
}

/// A report whose client is known.
#[derive(Debug)]
pub struct LocatedReport<'a> {
    report: UsageReport,
    record: &'a ClientRecord,
}

/// Outcome of screening a located report.
#[derive(Debug)]
pub enum Screening {
    /// The client is revoked. The signature was not checked.
    Revoked(UsageDecision),
    /// The signature verified against the client's stored key.
    Authenticated(AuthenticatedReport),
}

impl LocatedReport<'_> {
    /// Revocation check, then signature verification.
    ///
    /// Fails with `InvalidSignatureEncoding` when the signature is absent,
    /// not a string, or not base64 of 64 bytes, and with
    /// `SignatureVerificationFailed` when it does not verify.
    pub fn screen(self) -> Result<Screening, UsageError> {
        if self.record.revoked {
            return Ok(Screening::Revoked(UsageDecision::revoked(self.record)));
        }

        let encoded = match &self.report.signature {
            Some(Value::String(s)) => s.as_str(),
            Some(_) => {
                return Err(UsageError::InvalidSignatureEncoding(
                    "signature must be a string".into(),
                ))
            }
            None => {
                return Err(UsageError::InvalidSignatureEncoding(
                    "signature is missing".into(),
                ))
            }
        };
        let signature = Ed25519Signature::from_base64(encoded)
            .map_err(|e| UsageError::InvalidSignatureEncoding(e.to_string()))?;

        let payload = self.report.signed_payload()?;
        verify_with_public_key(&payload, &signature, &self.record.pub_key).map_err(|e| match e {
            CryptoError::VerificationFailed(m) | CryptoError::KeyError(m) => {
                UsageError::SignatureVerificationFailed(m)
            }
            CryptoError::MalformedSignature(m) => UsageError::InvalidSignatureEncoding(m),
        })?;

        Ok(Screening::Authenticated(AuthenticatedReport {
            client_id: self.report.client_id,
            total_usage_bytes: self.report.total_usage_bytes,
        }))
    }
}

/// A report whose signature has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedReport {
    client_id: ClientId,
    total_usage_bytes: i64,
}

impl AuthenticatedReport {
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// The reported cumulative usage. Replaces, never adds to, stored usage.
    pub fn total_usage_bytes(&self) -> i64 {
        self.total_usage_bytes
    }

    /// The quota decision once `total_usage_bytes` is recorded.
    pub fn decide(&self, quota_bytes: i64) -> UsageDecision {
        UsageDecision::for_usage(quota_bytes, self.total_usage_bytes)
    }
}

/// What the client should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Continue,
    Disable,
}

/// Why a client was told to disable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reason {
    #[serde(rename = "quota exceeded")]
    QuotaExceeded,
    #[serde(rename = "revoked")]
    Revoked,
}

/// The reply to a usage report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageDecision {
    pub allowed: bool,
    /// Quota minus usage; negative once exceeded.
    pub remaining_bytes: i64,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
}

impl UsageDecision {
    /// Decision for a verified usage total.
    pub fn for_usage(quota_bytes: i64, total_usage_bytes: i64) -> Self {
        let allowed = total_usage_bytes <= quota_bytes;
        Self {
            allowed,
            remaining_bytes: quota_bytes.saturating_sub(total_usage_bytes),
            action: if allowed { Action::Continue } else { Action::Disable },
            reason: (!allowed).then_some(Reason::QuotaExceeded),
        }
    }

    /// Decision for a revoked client, from its stored state.
    pub fn revoked(record: &ClientRecord) -> Self {
        Self {
            allowed: false,
            remaining_bytes: record.remaining_bytes(),
            action: Action::Disable,
            reason: Some(Reason::Revoked),
        }
    }
}
