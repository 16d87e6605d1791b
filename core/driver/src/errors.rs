//! Error types for GeckoDriver resolution and installation.
//!
//! Every failure in the pipeline is reported as a [`GeckoDriverError`]. The
//! variants mirror the stage that detected the problem so the command surface
//! can pick a message without inspecting error strings.

use thiserror::Error;

use crate::platform::Platform;

/// Boxed lower-level error kept as the `source` of a pipeline error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeckoDriverError>;

/// Consolidated error type for the driver pipeline.
#[derive(Debug, Error)]
pub enum GeckoDriverError {
    /// Requested platform is not in the supported set, or the host OS is unknown.
    #[error(
        "unknown platform '{platform}', choose one of the following platforms: {}",
        Platform::supported_list()
    )]
    UnknownPlatform {
        /// The token or OS name that could not be mapped.
        platform: String,
    },

    /// Version string failed the numeric dot-segment check.
    #[error("unknown version '{version}', expected dot-separated numbers such as 0.34.0")]
    UnknownVersion {
        /// The rejected version string.
        version: String,
    },

    /// No candidate download URL answered with 200 or 302.
    #[error("could not find a download url for version {version} on {platform}")]
    VersionUrl {
        /// The version being resolved.
        version: String,
        /// The platform the candidates were built for.
        platform: Platform,
    },

    /// Network or filesystem failure while retrieving the archive.
    #[error("download error: {message}")]
    DownloadError {
        /// Description of the failed step.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<BoxError>,
    },

    /// The archive could not be unpacked or the binary prepared.
    #[error("archive error: {message}")]
    Archive {
        /// Description of the failed step.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<BoxError>,
    },

    /// Catch-all, used directly for release page connectivity failures.
    #[error("{message}")]
    GetGeckoDriver {
        /// Description of the failure.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<BoxError>,
    },
}

impl GeckoDriverError {
    /// Creates a new `UnknownPlatform` error.
    #[must_use]
    pub fn unknown_platform(platform: impl Into<String>) -> Self {
        Self::UnknownPlatform {
            platform: platform.into(),
        }
    }

    /// Creates a new `UnknownVersion` error.
    #[must_use]
    pub fn unknown_version(version: impl Into<String>) -> Self {
        Self::UnknownVersion {
            version: version.into(),
        }
    }

    /// Creates a new `VersionUrl` error.
    #[must_use]
    pub fn version_url(version: impl Into<String>, platform: Platform) -> Self {
        Self::VersionUrl {
            version: version.into(),
            platform,
        }
    }

    /// Creates a new `DownloadError`.
    #[must_use]
    pub fn download_error(message: impl Into<String>) -> Self {
        Self::DownloadError {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `DownloadError` with a source error.
    #[must_use]
    pub fn download_error_with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::DownloadError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a new `Archive` error with a source error.
    #[must_use]
    pub fn archive_error_with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Archive {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a new `Archive` error.
    #[must_use]
    pub fn archive_error(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new catch-all error.
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::GetGeckoDriver {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new catch-all error with a source error.
    #[must_use]
    pub fn other_with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::GetGeckoDriver {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns `true` for failures caused by the network rather than by the request itself.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::GetGeckoDriver { .. })
    }
}
