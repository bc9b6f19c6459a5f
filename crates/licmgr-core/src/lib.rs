//! # licmgr-core: Foundational Types for the License Manager
//!
//! Every party of the trust protocol (the manager, the hardware signer and
//! the offline verifier) links this crate and nothing else for producing the
//! bytes that get signed. It depends on no other `licmgr-*` crate.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All signing and verification input flows
//!    through `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for
//!    signed payloads. A divergence between two encoders silently breaks
//!    every signature, so there is exactly one encoder.
//!
//! 2. **Newtypes for identifiers.** `ClientId` and `LicenseId` are validated
//!    at construction; handlers never pass bare strings into the registry.
//!
//! 3. **UTC-only timestamps.** `Timestamp` renders `YYYY-MM-DDTHH:MM:SSZ`
//!    and nothing else.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod artifact;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use artifact::{artifact_file_name, latest_artifact_path};
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, CryptoError, ValidationError};
pub use identity::{ClientId, LicenseId};
pub use temporal::Timestamp;
