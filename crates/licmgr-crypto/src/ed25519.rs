//! # Ed25519 Keys and Signatures
//!
//! Key and signature types for client usage reports, license descriptors and
//! signed summaries.
//!
//! Signing and verification accept `&CanonicalBytes` only, so the manager,
//! the signer and the offline verifier all sign and check the output of the
//! same encoder. `Ed25519KeyPair` has no `Serialize` impl and never exposes
//! its private half.
//!
//! On the wire both public keys and signatures are standard, padded base64.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::{Signer, Verifier};
use licmgr_core::error::CryptoError;
use licmgr_core::CanonicalBytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Decode padded base64 into exactly `N` bytes.
///
/// The error carries a human-readable reason; callers pick the variant.
fn decode_fixed<const N: usize>(what: &str, encoded: &str) -> Result<[u8; N], String> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| format!("{what} is not valid base64: {e}"))?;
    <[u8; N]>::try_from(bytes.as_slice())
        .map_err(|_| format!("{what} must be {N} bytes, got {}", bytes.len()))
}

/// Short base64 prefix for `Debug` output.
fn short_b64(bytes: &[u8]) -> String {
    let mut s = BASE64.encode(bytes);
    s.truncate(8);
    s
}

/// Client or signer public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    /// Parse a base64 public key. Bad alphabet or a length other than 32
    /// bytes is a `KeyError`.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        decode_fixed("public key", encoded)
            .map(Self)
            .map_err(CryptoError::KeyError)
    }

    /// Check that the bytes are a usable curve point.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("public key is not a valid point: {e}")))
    }

    /// Verify `signature` over `data` with this key.
    pub fn verify(&self, data: &CanonicalBytes, signature: &Ed25519Signature) -> Result<(), CryptoError> {
        let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        self.to_verifying_key()?
            .verify(data.as_bytes(), &dalek_sig)
            .map_err(|e| CryptoError::VerificationFailed(format!("signature does not match: {e}")))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Ed25519PublicKey").field(&short_b64(&self.0)).finish()
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// Detached signature over canonical bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    /// Parse a base64 signature.
    ///
    /// Bad alphabet and wrong length are both `MalformedSignature`, never
    /// `VerificationFailed`.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        decode_fixed("signature", encoded)
            .map(Self)
            .map_err(CryptoError::MalformedSignature)
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Ed25519Signature").field(&short_b64(&self.0)).finish()
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// Signing key. The inner `SigningKey` zeroizes on drop.
pub struct Ed25519KeyPair {
    inner: ed25519_dalek::SigningKey,
}

impl Ed25519KeyPair {
    /// Fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        Self {
            inner: ed25519_dalek::SigningKey::generate(&mut rand_core::OsRng),
        }
    }

    /// Key derived from a 32-byte RFC 8032 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            inner: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.inner.verifying_key().to_bytes())
    }

    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.inner.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Verify `signature` over `data` against `public_key`.
///
/// A mismatch is `VerificationFailed`; a key that is not a curve point is
/// `KeyError`.
pub fn verify_with_public_key(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    public_key.verify(data, signature)
}
