//! # Signer Seed Files
//!
//! The hardware signer keeps its Ed25519 seed in a small JSON file:
//!
//! ```json
//! { "device_id": "HW-DEV-001", "private_key_base64": "<base64 of 32 bytes>" }
//! ```
//!
//! The same file is handed to the offline verifier, which derives the public
//! key from it. Seeds longer than 32 bytes (for example a 64-byte
//! `seed || public` export) are accepted by keeping the first 32 bytes;
//! [`SignerSeed::was_truncated`] reports when that happened so callers can
//! warn. Shorter seeds are rejected.

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey};

/// Length of an Ed25519 seed in bytes.
pub const SEED_LEN: usize = 32;

/// Device id written by `keygen` when none is given.
pub const DEFAULT_DEVICE_ID: &str = "HW-DEV-001";

/// Errors reading, decoding or writing a seed file.
#[derive(Error, Debug)]
pub enum SeedError {
    /// The seed file could not be read or written.
    #[error("seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The seed file is not the expected JSON shape.
    #[error("seed file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `private_key_base64` is not valid base64.
    #[error("private_key_base64 is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded seed is shorter than 32 bytes.
    #[error("seed must be at least {SEED_LEN} bytes, got {0}")]
    TooShort(usize),
}

/// The on-disk seed file.
#[derive(Clone, Serialize, Deserialize)]
pub struct SeedFile {
    /// Informational device identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Base64 of the Ed25519 seed.
    pub private_key_base64: String,
}

impl std::fmt::Debug for SeedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedFile")
            .field("device_id", &self.device_id)
            .field("private_key_base64", &"[REDACTED]")
            .finish()
    }
}

impl SeedFile {
    /// A fresh seed file holding a random 32-byte seed.
    pub fn generate(device_id: impl Into<String>) -> Self {
        let mut seed = Zeroizing::new([0u8; SEED_LEN]);
        rand_core::RngCore::fill_bytes(&mut rand_core::OsRng, &mut seed[..]);
        Self {
            device_id: Some(device_id.into()),
            private_key_base64: BASE64.encode(&seed[..]),
        }
    }

    /// Read and parse a seed file.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| SeedError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the seed file, pretty-printed, readable by the owner only on unix.
    pub fn save(&self, path: &Path) -> Result<(), SeedError> {
        let io_err = |source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_vec_pretty(self).map_err(|source| SeedError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        // NamedTempFile is created 0600 on unix. The rename also replaces
        // any looser file already at `path`.
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        temp.write_all(&json).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// Decode the seed.
    pub fn seed(&self) -> Result<SignerSeed, SeedError> {
        SignerSeed::decode(&self.private_key_base64)
    }
}

/// A decoded 32-byte Ed25519 seed, zeroized on drop.
pub struct SignerSeed {
    bytes: Zeroizing<[u8; SEED_LEN]>,
    truncated_from: Option<usize>,
}

impl SignerSeed {
    /// Decode base64 into a seed, keeping the first 32 bytes of longer input.
    pub fn decode(encoded: &str) -> Result<Self, SeedError> {
        let raw = Zeroizing::new(BASE64.decode(encoded.trim())?);
        if raw.len() < SEED_LEN {
            return Err(SeedError::TooShort(raw.len()));
        }
        let mut bytes = Zeroizing::new([0u8; SEED_LEN]);
        bytes.copy_from_slice(&raw[..SEED_LEN]);
        let truncated_from = (raw.len() > SEED_LEN).then_some(raw.len());
        if let Some(len) = truncated_from {
            tracing::warn!(len, "seed longer than {SEED_LEN} bytes, using the first {SEED_LEN}");
        }
        Ok(Self {
            bytes,
            truncated_from,
        })
    }

    /// Original decoded length when the input was longer than 32 bytes.
    pub fn was_truncated(&self) -> Option<usize> {
        self.truncated_from
    }

    /// The signing key pair derived from this seed.
    pub fn key_pair(&self) -> Ed25519KeyPair {
        Ed25519KeyPair::from_seed(&self.bytes)
    }

    /// The public key derived from this seed.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.key_pair().public_key()
    }
}

impl std::fmt::Debug for SignerSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SignerSeed(<private>)")
    }
}
