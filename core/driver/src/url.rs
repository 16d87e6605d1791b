//! Download URL construction and validation.
//!
//! Candidate URLs follow the release asset template
//!
//! ```text
//! {releases_url}/download/v{version}/{name}-v{version}-{suffix}{ext}
//! ```
//!
//! and are probed in the order given by [`Platform::candidates`]. The first
//! one answering 200 or 302 wins.

use crate::config::DriverConfig;
use crate::errors::{GeckoDriverError, Result};
use crate::http::AssetProbe;
use crate::platform::{ArchiveKind, AssetSuffix, Platform, PointerWidth};
use crate::version::Version;

/// A resolved, validated download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub platform: Platform,
    pub version: Version,
    pub suffix: AssetSuffix,
    pub url: String,
    pub kind: ArchiveKind,
}

impl DownloadTarget {
    /// Archive file name (last path segment of the URL).
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

/// Formats the asset URL for one suffix.
#[must_use]
pub fn asset_url(config: &DriverConfig, version: &Version, suffix: AssetSuffix, kind: ArchiveKind) -> String {
    format!(
        "{base}/download/v{version}/{name}-v{version}-{suffix}{ext}",
        base = config.releases_url,
        name = config.driver_name,
        ext = kind.extension(),
    )
}

/// Builds the ordered, unverified candidate list for a platform.
#[must_use]
pub fn candidate_targets(
    config: &DriverConfig,
    platform: Platform,
    width: PointerWidth,
    version: &Version,
) -> Vec<DownloadTarget> {
    let kind = platform.archive_kind();
    platform
        .candidates(width)
        .into_iter()
        .map(|suffix| DownloadTarget {
            platform,
            version: version.clone(),
            suffix,
            url: asset_url(config, version, suffix, kind),
            kind,
        })
        .collect()
}

/// Returns the first candidate the probe confirms.
///
/// A candidate whose probe fails at the transport level is skipped like an
/// invalid one. If every candidate failed that way the last transport error
/// is returned, so an unreachable server is not reported as a missing version.
///
/// # Errors
///
/// - [`GeckoDriverError::UnknownVersion`] if `version` is malformed
/// - [`GeckoDriverError::VersionUrl`] if no candidate validates
/// - the probe's own error if no candidate could be reached
pub async fn resolve_version_url<P: AssetProbe>(
    probe: &P,
    config: &DriverConfig,
    platform: Platform,
    width: PointerWidth,
    version: &str,
) -> Result<DownloadTarget> {
    let version = Version::parse(version)?;
    let candidates = candidate_targets(config, platform, width, &version);
    let total = candidates.len();

    let mut transport_failures = 0;
    let mut last_error = None;

    for target in candidates {
        tracing::debug!(url = %target.url, "checking download url");
        match probe.probe(&target.url).await {
            Ok(true) => return Ok(target),
            Ok(false) => tracing::debug!(url = %target.url, "download url not available"),
            Err(e) => {
                tracing::debug!(url = %target.url, error = %e, "download url unreachable");
                transport_failures += 1;
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if transport_failures == total => Err(e),
        _ => Err(GeckoDriverError::version_url(version.as_str(), platform)),
    }
}
