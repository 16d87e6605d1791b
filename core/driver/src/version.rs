//! GeckoDriver version strings.
//!
//! A version is a dot-separated list of numeric segments such as `0.34.0`.
//! Versions are never compared: "latest" is whatever the release page shows.

use std::fmt;
use std::str::FromStr;

use crate::errors::{GeckoDriverError, Result};

/// A validated GeckoDriver version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

/// Returns `true` if every `.`-delimited segment is non-empty and all ASCII digits.
///
/// ```
/// use gecko_driver::is_valid_version;
///
/// assert!(is_valid_version("0.34.0"));
/// assert!(!is_valid_version("0.34.0-beta"));
/// assert!(!is_valid_version(""));
/// ```
#[must_use]
pub fn is_valid_version(version: &str) -> bool {
    version
        .split('.')
        .all(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
}

impl Version {
    /// Validates and wraps a version string.
    ///
    /// # Errors
    ///
    /// Returns [`GeckoDriverError::UnknownVersion`] if the string is not a
    /// dot-separated list of numbers.
    pub fn parse(version: &str) -> Result<Self> {
        if is_valid_version(version) {
            Ok(Self(version.to_string()))
        } else {
            Err(GeckoDriverError::unknown_version(version))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Version {
    type Err = GeckoDriverError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numeric_segments() {
        assert!(is_valid_version("0.34.0"));
        assert!(is_valid_version("1"));
        assert!(is_valid_version("10.0.12.3"));
    }

    #[test]
    fn rejects_suffixes_and_prefixes() {
        assert!(!is_valid_version("0.34.0-beta"));
        assert!(!is_valid_version("v0.34.0"));
        assert!(!is_valid_version(" 0.34.0"));
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(!is_valid_version(""));
        assert!(!is_valid_version("0..1"));
        assert!(!is_valid_version(".1"));
        assert!(!is_valid_version("1."));
    }

    #[test]
    fn rejects_non_ascii_digits() {
        assert!(!is_valid_version("٣.1"));
    }

    #[test]
    fn parse_wraps_valid_version() {
        let version = Version::parse("0.33.0").unwrap();
        assert_eq!(version.as_str(), "0.33.0");
        assert_eq!(version.to_string(), "0.33.0");
    }

    #[test]
    fn parse_reports_unknown_version() {
        let err = "latest".parse::<Version>().unwrap_err();
        assert!(matches!(err, GeckoDriverError::UnknownVersion { ref version } if version == "latest"));
    }
}
