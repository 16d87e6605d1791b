//! `--version-url <VERSION> [PLATFORM]`.

use anyhow::Result;

use super::driver_for;

/// Prints the validated download url of `version`.
///
/// # Errors
///
/// Returns an error for unknown platforms, malformed versions, or versions
/// without a download for the platform.
pub async fn execute(version: &str, platform: Option<&str>) -> Result<()> {
    let driver = driver_for(platform)?;
    let target = driver.version_url(version).await?;
    println!("{}", target.url);
    Ok(())
}
