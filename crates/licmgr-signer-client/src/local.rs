//! In-process signer backed by an Ed25519 key pair.

use std::path::Path;

use async_trait::async_trait;
use licmgr_core::CanonicalBytes;
use licmgr_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, SeedFile};

use crate::{DocumentSigner, SignerError};

/// Signs with a key pair held in this process.
#[derive(Debug)]
pub struct LocalSigner {
    key_pair: Ed25519KeyPair,
}

impl LocalSigner {
    pub fn new(key_pair: Ed25519KeyPair) -> Self {
        Self { key_pair }
    }

    /// Load the key from a seed file.
    pub fn from_seed_file(path: &Path) -> Result<Self, SignerError> {
        let seed = SeedFile::load(path)
            .and_then(|file| file.seed())
            .map_err(|e| SignerError::KeyUnavailable(e.to_string()))?;
        Ok(Self::new(seed.key_pair()))
    }
}

#[async_trait]
impl DocumentSigner for LocalSigner {
    async fn sign(&self, document: &CanonicalBytes) -> Result<Ed25519Signature, SignerError> {
        Ok(self.key_pair.sign(document))
    }

    fn public_key(&self) -> Option<Ed25519PublicKey> {
        Some(self.key_pair.public_key())
    }
}
