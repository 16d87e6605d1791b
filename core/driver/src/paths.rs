//! Output layout and install metadata.
//!
//! Drivers land in `<output_root>/<version>/bin/` unless an explicit output
//! directory is given. After a successful extraction a small JSON marker is
//! written next to the binary:
//!
//! ```json
//! {
//!   "version": "0.34.0",
//!   "platform": "linux64",
//!   "url": "https://.../geckodriver-v0.34.0-linux64.tar.gz"
//! }
//! ```
//!
//! The marker is what makes a later `download_version` for the same version
//! and platform a no-op. A binary without a matching marker is treated as
//! stale.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::DriverConfig;
use crate::errors::{GeckoDriverError, Result};
use crate::platform::Platform;
use crate::version::Version;

/// Name of the install marker written into the output directory.
pub const METADATA_FILE: &str = ".geckodriver.json";

/// Record of an extracted driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverMetadata {
    /// Version that was extracted.
    pub version: String,
    /// Platform token the driver was requested for, e.g. `linux64`.
    pub platform: String,
    /// URL the archive was downloaded from.
    pub url: String,
}

/// Default output directory for a version: `<output_root>/<version>/bin`.
#[must_use]
pub fn default_output_dir(config: &DriverConfig, version: &Version) -> PathBuf {
    config.output_root.join(version.as_str()).join("bin")
}

/// Returns the marker path inside `dir`.
#[must_use]
pub fn metadata_path(dir: &Path) -> PathBuf {
    dir.join(METADATA_FILE)
}

/// Writes the install marker into `dir`.
///
/// # Errors
///
/// Returns [`GeckoDriverError::Archive`] if the marker cannot be written.
pub fn write_metadata(dir: &Path, metadata: &DriverMetadata) -> Result<()> {
    let path = metadata_path(dir);
    let content = serde_json::to_string_pretty(metadata)
        .map_err(|e| GeckoDriverError::archive_error_with_source("Failed to serialize install metadata", e))?;
    std::fs::write(&path, content).map_err(|e| {
        GeckoDriverError::archive_error_with_source(format!("Failed to write metadata to {}", path.display()), e)
    })
}

/// Reads the install marker from `dir`.
///
/// Returns `None` if it does not exist or cannot be parsed.
#[must_use]
pub fn read_metadata(dir: &Path) -> Option<DriverMetadata> {
    let content = std::fs::read_to_string(metadata_path(dir)).ok()?;
    serde_json::from_str(&content).ok()
}

/// Returns `true` if `dir` already holds `binary_name` extracted for
/// `version` on `platform`.
///
/// A marker without a platform (written by older releases) never matches.
#[must_use]
pub fn is_cached(dir: &Path, version: &Version, platform: Platform, binary_name: &str) -> bool {
    if !dir.join(binary_name).is_file() {
        return false;
    }
    match read_metadata(dir) {
        Some(metadata) if metadata.version != version.as_str() => {
            tracing::warn!(
                dir = %dir.display(),
                found = %metadata.version,
                wanted = %version,
                "existing driver is for another version, downloading again"
            );
            false
        }
        Some(metadata) if metadata.platform != platform.as_str() => {
            tracing::warn!(
                dir = %dir.display(),
                found = %metadata.platform,
                wanted = %platform,
                "existing driver is for another platform, downloading again"
            );
            false
        }
        Some(_) => true,
        None => {
            tracing::warn!(dir = %dir.display(), "existing driver has no install metadata, downloading again");
            false
        }
    }
}
