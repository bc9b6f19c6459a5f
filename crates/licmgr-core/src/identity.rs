//! # Identifier Newtypes
//!
//! `ClientId` keys the registry; `LicenseId` labels an issued license.
//! Both serialize as plain strings.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::temporal::Timestamp;

/// Identity of a licensed client. Non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Validate and wrap a client identity.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(ValidationError::Empty("client_id"));
        }
        Ok(Self(s))
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A license label of the form `LIC-YYYYMMDDHHMMSS`.
///
/// Derived from the issuance second only: two registrations within the same
/// UTC second share a label. The registry is keyed by [`ClientId`], so this
/// never collides in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseId(String);

impl LicenseId {
    /// Prefix of every issued license id.
    pub const PREFIX: &'static str = "LIC-";

    /// The license id for a license issued at `issued_at`.
    pub fn issued_at(issued_at: &Timestamp) -> Self {
        Self(format!("{}{}", Self::PREFIX, issued_at.to_compact()))
    }

    /// The license id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LicenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
