//! # licmgr-verify: Offline Summary Verification
//!
//! Re-checks a signed usage summary without talking to the manager or the
//! signer:
//!
//! 1. Read the signer's seed file and derive its Ed25519 public key.
//! 2. Pick the artifact: an explicit file, or the lexicographically greatest
//!    regular, non-hidden file in the summaries directory.
//! 3. Take `summary` as an untyped JSON value, canonically encode it and
//!    verify `signature` over those bytes.
//!
//! A failed check is a [`Verdict`], not an error. Everything that prevents a
//! check from running (missing seed, no artifacts, unparseable JSON, bad
//! base64, missing keys) is a [`VerifyError`].

use std::path::{Path, PathBuf};

use licmgr_core::{sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest, CryptoError};
use licmgr_crypto::{verify_with_public_key, Ed25519PublicKey, Ed25519Signature, SeedError, SeedFile};
use serde_json::Value;
use thiserror::Error;

/// Seed file locations tried, in order, when none is given.
pub const SEED_CANDIDATES: [&str; 2] = ["hw.json", "hw-emulator/hw.json"];

/// Errors that prevent verification from running.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("seed file not found (tried {})", display_paths(.0))]
    SeedNotFound(Vec<PathBuf>),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error("cannot read summaries directory {path}: {source}")]
    SummariesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no summary files in {0}")]
    NoArtifacts(PathBuf),

    #[error("read summary file {path}: {source}")]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse summary file {path}: {source}")]
    ParseArtifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} key missing in summary file")]
    MissingKey(&'static str),

    #[error("signature is not a string")]
    SignatureNotString,

    #[error("decode signature: {0}")]
    SignatureEncoding(#[source] CryptoError),

    #[error("canonicalize summary: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Inputs to one verification run.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Seed file; discovered from [`SEED_CANDIDATES`] when `None`.
    pub seed: Option<PathBuf>,
    /// Directory searched for the newest artifact.
    pub summaries_dir: PathBuf,
    /// Verify this artifact instead of searching `summaries_dir`.
    pub file: Option<PathBuf>,
    /// Where the canonical bytes are written when verification fails.
    pub debug_out: PathBuf,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            seed: None,
            summaries_dir: PathBuf::from("summaries"),
            file: None,
            debug_out: PathBuf::from("last_canonical.json"),
        }
    }
}

/// Outcome of a completed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Verified {
        path: PathBuf,
        digest: ContentDigest,
    },
    Failed {
        path: PathBuf,
        digest: ContentDigest,
        /// Set when the canonical bytes were written for inspection.
        debug_out: Option<PathBuf>,
    },
}

impl Verdict {
    /// Process exit status: 0 verified, 2 failed.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Verified { .. } => 0,
            Self::Failed { .. } => 2,
        }
    }
}

/// An artifact checked against a key.
#[derive(Debug)]
pub struct ArtifactCheck {
    pub canonical: CanonicalBytes,
    pub digest: ContentDigest,
    pub valid: bool,
}

/// Resolve the seed file: `explicit` if given, else the first existing
/// candidate under `base`.
pub fn locate_seed(explicit: Option<&Path>, base: &Path) -> Result<PathBuf, VerifyError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let candidates: Vec<PathBuf> = SEED_CANDIDATES.iter().map(|c| base.join(c)).collect();
    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        return Ok(found.clone());
    }
    Err(VerifyError::SeedNotFound(candidates))
}

/// Derive the signer's public key from a seed file.
pub fn public_key_from_seed(path: &Path) -> Result<Ed25519PublicKey, VerifyError> {
    Ok(SeedFile::load(path)?.seed()?.public_key())
}

/// The artifact to verify: `explicit`, or the newest file in `dir`.
pub fn locate_artifact(explicit: Option<&Path>, dir: &Path) -> Result<PathBuf, VerifyError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    licmgr_core::latest_artifact_path(dir)
        .map_err(|source| VerifyError::SummariesDir {
            path: dir.to_path_buf(),
            source,
        })?
        .ok_or_else(|| VerifyError::NoArtifacts(dir.to_path_buf()))
}

/// Parse the artifact at `path` and check its signature against `public_key`.
pub fn check_artifact(path: &Path, public_key: &Ed25519PublicKey) -> Result<ArtifactCheck, VerifyError> {
    let raw = std::fs::read(path).map_err(|source| VerifyError::ReadArtifact {
        path: path.to_path_buf(),
        source,
    })?;
    let wrapper: Value = serde_json::from_slice(&raw).map_err(|source| VerifyError::ParseArtifact {
        path: path.to_path_buf(),
        source,
    })?;

    let summary = wrapper.get("summary").ok_or(VerifyError::MissingKey("summary"))?;
    let signature = wrapper
        .get("signature")
        .ok_or(VerifyError::MissingKey("signature"))?
        .as_str()
        .ok_or(VerifyError::SignatureNotString)?;
    let signature = Ed25519Signature::from_base64(signature).map_err(VerifyError::SignatureEncoding)?;

    let canonical = CanonicalBytes::from_value(summary)?;
    let digest = sha256_digest(&canonical);
    let valid = match verify_with_public_key(&canonical, &signature, public_key) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "signature check failed");
            false
        }
    };
    Ok(ArtifactCheck {
        canonical,
        digest,
        valid,
    })
}

/// Run a full verification, resolving relative seed candidates against the
/// current directory.
pub fn run(options: &VerifyOptions) -> Result<Verdict, VerifyError> {
    run_in(options, Path::new("."))
}

/// [`run`] with seed discovery rooted at `base`.
pub fn run_in(options: &VerifyOptions, base: &Path) -> Result<Verdict, VerifyError> {
    let seed_path = locate_seed(options.seed.as_deref(), base)?;
    let public_key = public_key_from_seed(&seed_path)?;
    tracing::info!(seed = %seed_path.display(), public_key = %public_key.to_base64(), "derived signer key");

    let path = locate_artifact(options.file.as_deref(), &options.summaries_dir)?;
    let check = check_artifact(&path, &public_key)?;
    tracing::info!(path = %path.display(), digest = %check.digest, valid = check.valid, "artifact checked");

    if check.valid {
        return Ok(Verdict::Verified {
            path,
            digest: check.digest,
        });
    }

    let debug_out = match std::fs::write(&options.debug_out, check.canonical.as_bytes()) {
        Ok(()) => Some(options.debug_out.clone()),
        Err(e) => {
            tracing::warn!(path = %options.debug_out.display(), error = %e, "could not write canonical bytes");
            None
        }
    };
    Ok(Verdict::Failed {
        path,
        digest: check.digest,
        debug_out,
    })
}
