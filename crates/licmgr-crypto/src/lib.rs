//! # licmgr-crypto: Signing Keys and Seeds
//!
//! - **Ed25519** signing and verification over `CanonicalBytes` only.
//! - **Base64 wire encoding** (standard alphabet, padded) for public keys and
//!   signatures, matching what clients and the hardware signer exchange.
//! - **Seed files** (`{private_key_base64, device_id}`), the one secret
//!   shared out-of-band between the signer and the offline verifier.
//!
//! ## Crate Policy
//!
//! - Depends only on `licmgr-core` internally.
//! - No mocking of cryptographic operations in tests.
//! - Private key material is never serialized by accident and never appears
//!   in `Debug` output.

pub mod ed25519;
pub mod seed;

pub use ed25519::{verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use seed::{SeedError, SeedFile, SignerSeed, DEFAULT_DEVICE_ID, SEED_LEN};
