//! # licmgr-signer: Hardware Signer Emulator
//!
//! Stands in for the hardware signing token during development. The token's
//! key is a seed file on disk; pulling the file "removes the token":
//!
//! - `POST /sign` parses the body as JSON, canonically encodes it and signs
//!   the canonical bytes. The seed file is read on every request.
//! - `GET /info` reports whether the seed file is present, its device id and
//!   the derived public key.
//!
//! [`keygen`] writes a fresh seed file.

pub mod keygen;
pub mod server;

pub use keygen::write_seed_file;
pub use server::{router, SignFailure};
