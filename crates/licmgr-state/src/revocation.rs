//! Client revocation.

use licmgr_core::ClientId;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, StoreError};
use crate::registry::ClientRegistry;

/// Reply to a revocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationOutcome {
    /// `true` if the client exists and is now revoked (including when it
    /// already was); `false` if the client is unknown.
    pub revoked: bool,
}

/// Revoke `client_id`. Unknown clients are a no-op, not an error.
pub fn revoke_client(
    registry: &ClientRegistry,
    client_id: &ClientId,
) -> Result<RevocationOutcome, StoreError> {
    match registry.revoke(client_id) {
        Ok(_) => {
            tracing::info!(client_id = %client_id, "client revoked");
            Ok(RevocationOutcome { revoked: true })
        }
        Err(RegistryError::UnknownClient(_)) => {
            tracing::debug!(client_id = %client_id, "revocation for unknown client ignored");
            Ok(RevocationOutcome { revoked: false })
        }
        Err(RegistryError::Persistence(e)) => Err(e),
    }
}
