//! `--install`.
//!
//! Downloads and extracts the latest driver for the host, then appends its
//! directory to `PATH` for this process. The change does not outlive the
//! process, so the absolute directory is printed for the caller to use.

use std::path::Path;

use anyhow::Result;

use super::driver_for;
use crate::errors::CliError;

/// Installs the latest driver and prints its absolute directory.
///
/// # Errors
///
/// Returns an error if the host is unsupported, the download fails, or the
/// driver cannot be found through the updated `PATH`.
pub async fn execute(output: Option<&Path>) -> Result<()> {
    let driver = driver_for(None)?;
    let dir = driver.install(output).await?;
    let binary = driver.driver_filename();

    let search_path = std::env::var_os("PATH");
    let found = which::which_in(&binary, search_path, &dir).map_err(|_| CliError::NotOnPath {
        binary: binary.clone(),
        dir: dir.clone(),
    })?;
    tracing::debug!(path = %found.display(), "driver resolved through PATH");

    println!("{}", dir.display());
    Ok(())
}
