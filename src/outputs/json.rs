//! JSON output for the daily brief.
//!
//! The same payload is written twice: to the primary path (overwritten every
//! run) and to `{archive_dir}/{date_iso}.json`. Output is pretty-printed with
//! two-space indentation and non-ASCII text left unescaped.

use crate::models::DigestPayload;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Paths written by [`write_payload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPaths {
    pub primary: PathBuf,
    pub archive: PathBuf,
}

async fn write_file(path: &Path, contents: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }
    fs::write(path, contents).await?;
    info!(path = %path.display(), bytes = contents.len(), "Wrote JSON");
    Ok(())
}

/// Write a [`DigestPayload`] to `output_path` and to the dated archive.
///
/// # Arguments
///
/// * `payload` - The finished brief
/// * `output_path` - Primary file, e.g. `public/today.json`
/// * `archive_dir` - Directory receiving `{date_iso}.json`
///
/// # Returns
///
/// The two paths written, or the first I/O or serialization error.
#[instrument(level = "info", skip_all, fields(output_path = %output_path.display(), archive_dir = %archive_dir.display()))]
pub async fn write_payload(
    payload: &DigestPayload,
    output_path: &Path,
    archive_dir: &Path,
) -> Result<WrittenPaths, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(payload)?;
    let archive = archive_dir.join(format!("{}.json", payload.date_iso));

    write_file(output_path, &json).await?;
    write_file(&archive, &json).await?;

    Ok(WrittenPaths {
        primary: output_path.to_path_buf(),
        archive,
    })
}
