//! Publishing the decided tag to downstream CI steps

use crate::domain::Tag;
use crate::error::{VersionGateError, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Path of the GitHub Actions step output file, when running inside a job
pub fn github_output_path() -> Option<PathBuf> {
    std::env::var_os("GITHUB_OUTPUT")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Append `key=tag` to a GitHub Actions output file
pub fn write_github_output(path: &Path, key: &str, tag: &Tag) -> Result<()> {
    if key.is_empty() || key.contains('=') || key.contains('\n') {
        return Err(VersionGateError::output(format!(
            "Invalid output key '{}'",
            key
        )));
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            VersionGateError::output(format!("Cannot open {}: {}", path.display(), e))
        })?;

    writeln!(file, "{}={}", key, tag).map_err(|e| {
        VersionGateError::output(format!("Cannot write {}: {}", path.display(), e))
    })?;

    Ok(())
}
