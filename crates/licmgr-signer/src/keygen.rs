//! Seed file generation.

use std::path::Path;

use anyhow::{bail, Context, Result};
use licmgr_crypto::{Ed25519PublicKey, SeedFile};

/// Write a fresh seed file to `path` and return its public key.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_seed_file(path: &Path, device_id: &str, force: bool) -> Result<Ed25519PublicKey> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to replace it",
            path.display()
        );
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let file = SeedFile::generate(device_id);
    let public_key = file.seed().context("freshly generated seed")?.public_key();
    file.save(path)?;
    tracing::info!(path = %path.display(), device_id, "seed file written");
    Ok(public_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keygen_writes_loadable_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hw.json");
        let pk = write_seed_file(&path, "HW-DEV-001", false).unwrap();

        let loaded = SeedFile::load(&path).unwrap();
        assert_eq!(loaded.device_id.as_deref(), Some("HW-DEV-001"));
        assert_eq!(loaded.seed().unwrap().public_key(), pk);
    }

    #[test]
    fn keygen_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hw.json");
        let first = write_seed_file(&path, "A", false).unwrap();

        assert!(write_seed_file(&path, "B", false).is_err());
        assert_eq!(SeedFile::load(&path).unwrap().seed().unwrap().public_key(), first);

        let second = write_seed_file(&path, "B", true).unwrap();
        assert_ne!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn keygen_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hw.json");
        write_seed_file(&path, "HW-DEV-001", false).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
