//! # Registry Persistence
//!
//! [`RegistryStore`] is the seam between the registry and stable storage.
//! The registry calls `load` once at startup and `save` with the complete
//! next state before committing any mutation.
//!
//! [`JsonFileStore`] keeps the registry as one pretty-printed JSON object
//! keyed by client id. Saves go through a temp file in the same directory
//! that is synced and renamed over the target, so a crash mid-save leaves the
//! previous file intact.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use licmgr_core::ClientId;
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::record::ClientRecord;

/// All records, ordered by client id.
pub type ClientMap = BTreeMap<ClientId, ClientRecord>;

/// Stable storage for the client registry.
pub trait RegistryStore: Send + Sync + std::fmt::Debug {
    /// Load every record. A store that has never been written is empty.
    fn load(&self) -> Result<ClientMap, StoreError>;

    /// Replace the stored registry with `clients`.
    fn save(&self, clients: &ClientMap) -> Result<(), StoreError>;
}

/// Registry persisted to a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<ClientMap, StoreError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no registry file, starting empty");
                return Ok(ClientMap::new());
            }
            Err(e) => return Err(self.io_err(e)),
        };
        let clients: ClientMap =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        tracing::info!(path = %self.path.display(), clients = clients.len(), "registry loaded");
        Ok(clients)
    }

    fn save(&self, clients: &ClientMap) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(clients).map_err(StoreError::Encode)?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
        temp.write_all(&bytes).map_err(|e| self.io_err(e))?;
        temp.as_file().sync_all().map_err(|e| self.io_err(e))?;
        temp.persist(&self.path).map_err(|e| self.io_err(e.error))?;
        Ok(())
    }
}

/// Registry kept only in memory. `fail_saves` makes every save fail, for
/// exercising the persistence-failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<ClientMap>,
    fail_saves: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `clients`.
    pub fn with_clients(clients: ClientMap) -> Self {
        Self {
            saved: Mutex::new(clients),
            fail_saves: Mutex::new(false),
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        *self.fail_saves.lock() = fail;
    }

    /// The most recently saved registry.
    pub fn saved(&self) -> ClientMap {
        self.saved.lock().clone()
    }
}

impl RegistryStore for MemoryStore {
    fn load(&self) -> Result<ClientMap, StoreError> {
        Ok(self.saved.lock().clone())
    }

    fn save(&self, clients: &ClientMap) -> Result<(), StoreError> {
        if *self.fail_saves.lock() {
            return Err(StoreError::Unavailable("saves disabled".into()));
        }
        *self.saved.lock() = clients.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::QUOTA_BYTES;
    use licmgr_core::{LicenseId, Timestamp};
    use licmgr_crypto::Ed25519KeyPair;

    fn record(id: &str) -> ClientRecord {
        let now = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        ClientRecord {
            client_id: ClientId::new(id).unwrap(),
            pub_key: Ed25519KeyPair::from_seed(&[1u8; 32]).public_key(),
            fingerprint: serde_json::Map::new(),
            app_id: "app".into(),
            version: "1.0".into(),
            license_id: LicenseId::issued_at(&now),
            quota_bytes: QUOTA_BYTES,
            total_usage_bytes: 0,
            issued_at: now,
            expires_at: now.plus_days(30),
            revoked: false,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("clients.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("clients.json"));
        let mut clients = ClientMap::new();
        clients.insert(ClientId::new("dev1").unwrap(), record("dev1"));
        clients.insert(ClientId::new("dev2").unwrap(), record("dev2"));
        store.save(&clients).unwrap();

        assert_eq!(store.load().unwrap(), clients);
        // Only the store file remains; the temp file was renamed away.
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("data")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn file_is_keyed_by_client_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("clients.json"));
        let mut clients = ClientMap::new();
        clients.insert(ClientId::new("dev1").unwrap(), record("dev1"));
        store.save(&clients).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw["dev1"]["client_id"], "dev1");
        assert_eq!(raw["dev1"]["quota_bytes"], QUOTA_BYTES);
        assert_eq!(raw["dev1"]["revoked"], false);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clients.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            JsonFileStore::new(path).load(),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn memory_store_can_fail_saves() {
        let store = MemoryStore::new();
        store.fail_saves(true);
        assert!(store.save(&ClientMap::new()).is_err());
        store.fail_saves(false);
        assert!(store.save(&ClientMap::new()).is_ok());
    }
}
