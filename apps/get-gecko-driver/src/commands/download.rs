//! `--download-latest`, `--download-version` and `--download-release`.
//!
//! Without `--extract` the archive is left in the output directory. With it
//! the archive is unpacked, removed, and the driver made executable.

use std::path::Path;

use anyhow::Result;

use super::{DownloadOptions, driver_for};

/// Downloads the latest version for a platform, the host when `None`.
///
/// # Errors
///
/// Returns an error for unknown platforms or if any pipeline stage fails.
pub async fn execute_latest(platform: Option<&str>, options: &DownloadOptions) -> Result<()> {
    let driver = driver_for(platform)?;
    let dir = driver
        .download_latest_version(options.output.as_deref(), options.extract)
        .await?;
    print_finished(&dir);
    Ok(())
}

/// Downloads a specific version for a platform, the host when `None`.
///
/// # Errors
///
/// Returns an error for unknown platforms, malformed versions, or if any
/// pipeline stage fails.
pub async fn execute_version(version: &str, platform: Option<&str>, options: &DownloadOptions) -> Result<()> {
    let driver = driver_for(platform)?;
    let dir = driver
        .download_version(version, options.output.as_deref(), options.extract)
        .await?;
    print_finished(&dir);
    Ok(())
}

fn print_finished(dir: &Path) {
    println!("download finished");
    println!("{}", dir.display());
}
