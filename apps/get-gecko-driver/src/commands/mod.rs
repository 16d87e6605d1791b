//! Actions of the get-gecko-driver CLI.
//!
//! - [`latest`] - latest version and latest download urls
//! - [`version_url`] - download url of an explicit version
//! - [`download`] - download (and optionally extract) a version
//! - [`install`] - download, extract, and add to `PATH`

pub mod download;
pub mod install;
pub mod latest;
pub mod version_url;

use std::path::PathBuf;

use anyhow::Result;
use gecko_driver::{DriverConfig, GeckoDriver, Platform};

/// One action per invocation, as selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LatestVersion,
    LatestUrls,
    VersionUrl {
        version: String,
        platform: Option<String>,
    },
    LatestUrl {
        platform: Option<String>,
    },
    DownloadLatest {
        platform: Option<String>,
    },
    DownloadVersion {
        version: String,
        platform: Option<String>,
    },
    Install,
    PrintVersion,
}

/// Modifiers shared by the download actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Extract the archive and prepare the binary.
    pub extract: bool,
    /// Explicit output directory.
    pub output: Option<PathBuf>,
}

/// Builds the pipeline for a platform token, or for the host when `None`.
///
/// The token is checked before anything touches the network.
///
/// # Errors
///
/// Returns an error for unknown platform tokens and unsupported hosts.
pub fn driver_for(platform: Option<&str>) -> Result<GeckoDriver> {
    let platform = Platform::resolve(platform)?;
    driver(platform)
}

/// Builds the pipeline for a known platform with environment overrides applied.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn driver(platform: Platform) -> Result<GeckoDriver> {
    let config = DriverConfig::from_env().with_progress(true);
    tracing::debug!(%platform, releases_url = %config.releases_url, "using configuration");
    Ok(GeckoDriver::new(platform, config)?)
}
