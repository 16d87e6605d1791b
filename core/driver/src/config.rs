//! Configuration for release lookup and downloads.
//!
//! All endpoints, the latest-version locator and the output layout live in
//! [`DriverConfig`] so tests and mirrors can substitute their own.
//!
//! ## Environment Overrides
//!
//! - `GECKODRIVER_RELEASES_URL` - releases base URL, used for the release
//!   page and as the prefix of every download URL
//! - `GECKODRIVER_LATEST_SELECTOR` - CSS selector for the latest version label
//!
//! Empty or whitespace-only values are treated as unset.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the releases base URL.
pub const RELEASES_URL_ENV: &str = "GECKODRIVER_RELEASES_URL";

/// Environment variable overriding the latest-version selector.
pub const LATEST_SELECTOR_ENV: &str = "GECKODRIVER_LATEST_SELECTOR";

/// Default releases base URL.
pub const DEFAULT_RELEASES_URL: &str = "https://github.com/mozilla/geckodriver/releases";

/// Default selector for the version label of the release marked "latest".
///
/// This is a positional path into the third-party release page markup and
/// breaks whenever that markup changes. Override it through
/// [`LATEST_SELECTOR_ENV`] when it does.
pub const DEFAULT_LATEST_SELECTOR: &str = ".label-latest > div:nth-child(2) > div:nth-child(1) \
     > div:nth-child(1) > div:nth-child(1) > a:nth-child(1)";

/// Release asset and binary name.
pub const DEFAULT_DRIVER_NAME: &str = "geckodriver";

/// Root directory for downloads when no output directory is given.
pub const DEFAULT_OUTPUT_ROOT: &str = "geckodriver";

/// Timeout for the release page and HEAD probes, in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout for archive downloads, in seconds.
const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Settings for one resolution/download run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Releases base URL without a trailing slash.
    pub releases_url: String,
    /// CSS selector locating the latest version label on the release page.
    pub latest_selector: String,
    /// Asset and binary name (`geckodriver`).
    pub driver_name: String,
    /// Root of the default `<root>/<version>/bin` layout.
    pub output_root: PathBuf,
    /// Timeout for page fetches and probes.
    pub request_timeout: Duration,
    /// Timeout for archive downloads.
    pub download_timeout: Duration,
    /// User-Agent header for every request.
    pub user_agent: String,
    /// Print a progress line on stderr while downloading.
    pub show_progress: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            releases_url: DEFAULT_RELEASES_URL.to_string(),
            latest_selector: DEFAULT_LATEST_SELECTOR.to_string(),
            driver_name: DEFAULT_DRIVER_NAME.to_string(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            download_timeout: Duration::from_secs(DOWNLOAD_TIMEOUT_SECS),
            user_agent: format!("get-gecko-driver/{}", env!("CARGO_PKG_VERSION")),
            show_progress: false,
        }
    }
}

impl DriverConfig {
    /// Builds the default configuration with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = env_override(RELEASES_URL_ENV) {
            config.releases_url = url.trim_end_matches('/').to_string();
        }
        if let Some(selector) = env_override(LATEST_SELECTOR_ENV) {
            config.latest_selector = selector;
        }
        config
    }

    /// Replaces the releases base URL.
    #[must_use]
    pub fn with_releases_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.releases_url = url.trim().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

/// Reads an environment variable, treating empty values as unset.
fn env_override(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
