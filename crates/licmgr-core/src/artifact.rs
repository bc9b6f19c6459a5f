//! # Summary Artifact Layout
//!
//! Where signed summaries live on disk: one `YYYY-MM-DD.json` per UTC day in
//! a single directory. The manager writes there and the offline verifier
//! reads from there, so both take file naming and discovery from here.
//! Writers use hidden temp files (`.name`), which discovery skips.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// `YYYY-MM-DD.json`.
pub fn artifact_file_name(date: NaiveDate) -> String {
    format!("{}.json", date.format("%Y-%m-%d"))
}

/// The artifact in `dir` with the lexicographically greatest file name.
///
/// Only regular, non-hidden files count. Correct only while every name is a
/// `YYYY-MM-DD` date. `Ok(None)` when `dir` holds no candidate; a missing
/// `dir` is an `Err`.
pub fn latest_artifact_path(dir: &Path) -> std::io::Result<Option<PathBuf>> {
    let mut latest: Option<(String, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if latest.as_ref().map_or(true, |(best, _)| name > *best) {
            latest = Some((name, entry.path()));
        }
    }
    Ok(latest.map(|(_, path)| path))
}
