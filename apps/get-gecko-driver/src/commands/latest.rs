//! `--latest-version`, `--latest-url` and `--latest-urls`.

use anyhow::Result;
use gecko_driver::{DownloadTarget, Platform};

use super::{driver, driver_for};
use crate::errors;

/// Prints the latest version.
///
/// # Errors
///
/// Returns an error if the release page cannot be read.
pub async fn execute_version() -> Result<()> {
    // The release page is shared by every platform.
    let driver = driver(Platform::Win32)?;
    let version = driver.latest_version().await?;
    println!("{version}");
    Ok(())
}

/// Prints the latest download url for a platform, the host when `None`.
///
/// # Errors
///
/// Returns an error for unknown platforms or if no url can be found.
pub async fn execute_url(platform: Option<&str>) -> Result<()> {
    let driver = driver_for(platform)?;
    let target = driver.latest_version_url().await?;
    println!("{}", target.url);
    Ok(())
}

/// Prints the latest download url for every platform.
///
/// # Errors
///
/// Returns an error only if the latest version cannot be resolved.
pub async fn execute_urls() -> Result<()> {
    let driver = driver(Platform::Win32)?;
    let urls = driver.latest_urls().await?;
    print!("{}", format_latest_urls(&urls));
    Ok(())
}

/// Renders one block per platform, separated by blank lines.
fn format_latest_urls(urls: &[(Platform, gecko_driver::Result<DownloadTarget>)]) -> String {
    urls.iter()
        .map(|(platform, target)| {
            let line = match target {
                Ok(target) => target.url.clone(),
                Err(e) => errors::describe(e),
            };
            format!("Latest release for {}:\n{line}\n", platform.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gecko_driver::{ArchiveKind, AssetSuffix, GeckoDriverError, Version};

    fn target(platform: Platform, suffix: AssetSuffix, kind: ArchiveKind) -> DownloadTarget {
        DownloadTarget {
            platform,
            version: Version::parse("0.34.0").unwrap(),
            suffix,
            url: format!(
                "https://github.com/mozilla/geckodriver/releases/download/v0.34.0/geckodriver-v0.34.0-{suffix}{}",
                kind.extension()
            ),
            kind,
        }
    }

    #[test]
    fn latest_urls_prints_a_block_per_platform() {
        let urls = vec![
            (
                Platform::Win32,
                Ok(target(Platform::Win32, AssetSuffix::Win32, ArchiveKind::Zip)),
            ),
            (
                Platform::Macos,
                Ok(target(Platform::Macos, AssetSuffix::MacosAarch64, ArchiveKind::TarGz)),
            ),
        ];

        assert_eq!(
            format_latest_urls(&urls),
            "Latest release for Windows 32:\n\
             https://github.com/mozilla/geckodriver/releases/download/v0.34.0/geckodriver-v0.34.0-win32.zip\n\
             \n\
             Latest release for macOS:\n\
             https://github.com/mozilla/geckodriver/releases/download/v0.34.0/geckodriver-v0.34.0-macos-aarch64.tar.gz\n"
        );
    }

    #[test]
    fn latest_urls_reports_missing_platform_inline() {
        let urls = vec![(
            Platform::Linux32,
            Err(GeckoDriverError::version_url("0.34.0", Platform::Linux32)),
        )];

        let out = format_latest_urls(&urls);
        assert!(out.starts_with("Latest release for Linux 32:\n"));
        assert!(out.contains("error: could not find release url for version 0.34.0 on linux32"));
    }
}
