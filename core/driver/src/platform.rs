//! Platform catalog for GeckoDriver release assets.
//!
//! Maps an explicit platform token, or the host operating system, to a
//! [`Platform`], and a platform plus host pointer width to the ordered list
//! of release asset suffixes worth trying.
//!
//! ## Supported Platforms
//!
//! | Token     | Family  | Candidates on a 64-bit host     |
//! |-----------|---------|---------------------------------|
//! | `win`     | Windows | `win64`, `win32`                |
//! | `win32`   | Windows | `win32`                         |
//! | `win64`   | Windows | `win64`                         |
//! | `linux`   | Linux   | `linux64`, `linux32`            |
//! | `linux32` | Linux   | `linux32`                       |
//! | `linux64` | Linux   | `linux64`                       |
//! | `macos`   | macOS   | `macos-aarch64`, `macos`        |

use std::fmt;
use std::str::FromStr;

use crate::errors::{GeckoDriverError, Result};

/// A platform a GeckoDriver release can be fetched for.
///
/// The unqualified variants (`Win`, `Linux`, `Macos`) pick 64-bit or 32-bit
/// assets from the host pointer width; the qualified ones pin the width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Windows, width taken from the host.
    Win,
    /// Windows, 32-bit assets only.
    Win32,
    /// Windows, 64-bit assets only.
    Win64,
    /// Linux, width taken from the host.
    Linux,
    /// Linux, 32-bit assets only.
    Linux32,
    /// Linux, 64-bit assets only.
    Linux64,
    /// macOS; Apple Silicon assets are tried first on 64-bit hosts.
    Macos,
}

/// Operating system family of a [`Platform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Windows,
    Linux,
    Macos,
}

/// Pointer width of the host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerWidth {
    Bits32,
    Bits64,
}

/// Compression container of a release asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// `.zip`, used for Windows releases.
    Zip,
    /// `.tar.gz`, used for Linux and macOS releases.
    TarGz,
}

/// Platform token embedded in a release asset file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetSuffix {
    Win32,
    Win64,
    Linux32,
    Linux64,
    Macos,
    MacosAarch64,
}

impl Platform {
    /// Every supported platform, in the order they are listed to users.
    pub const ALL: [Self; 7] = [
        Self::Win,
        Self::Win32,
        Self::Win64,
        Self::Linux,
        Self::Linux32,
        Self::Linux64,
        Self::Macos,
    ];

    /// Returns the platform for an explicit token, or for the host when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`GeckoDriverError::UnknownPlatform`] if the token is not
    /// supported, or if no token is given and the host OS is not recognized.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        match explicit {
            Some(token) => token.parse(),
            None => Self::detect(),
        }
    }

    /// Detects the platform of the running host.
    ///
    /// # Errors
    ///
    /// Returns [`GeckoDriverError::UnknownPlatform`] on operating systems
    /// GeckoDriver is not published for.
    pub fn detect() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps an OS name as reported by `std::env::consts::OS`.
    ///
    /// # Errors
    ///
    /// Returns [`GeckoDriverError::UnknownPlatform`] for anything other than
    /// `windows`, `linux` and `macos`.
    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "windows" => Ok(Self::Win),
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::Macos),
            other => Err(GeckoDriverError::unknown_platform(other)),
        }
    }

    /// Returns the token users pass on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Win32 => "win32",
            Self::Win64 => "win64",
            Self::Linux => "linux",
            Self::Linux32 => "linux32",
            Self::Linux64 => "linux64",
            Self::Macos => "macos",
        }
    }

    /// Returns a human-readable label such as `Windows 64`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Win => "Windows",
            Self::Win32 => "Windows 32",
            Self::Win64 => "Windows 64",
            Self::Linux => "Linux",
            Self::Linux32 => "Linux 32",
            Self::Linux64 => "Linux 64",
            Self::Macos => "macOS",
        }
    }

    /// Comma-separated list of supported tokens.
    #[must_use]
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn family(self) -> OsFamily {
        match self {
            Self::Win | Self::Win32 | Self::Win64 => OsFamily::Windows,
            Self::Linux | Self::Linux32 | Self::Linux64 => OsFamily::Linux,
            Self::Macos => OsFamily::Macos,
        }
    }

    #[must_use]
    pub fn is_windows(self) -> bool {
        self.family() == OsFamily::Windows
    }

    /// Archive container used by releases for this platform.
    #[must_use]
    pub fn archive_kind(self) -> ArchiveKind {
        if self.is_windows() {
            ArchiveKind::Zip
        } else {
            ArchiveKind::TarGz
        }
    }

    /// Returns the executable file extension for this platform.
    #[must_use]
    pub fn executable_extension(self) -> &'static str {
        if self.is_windows() { ".exe" } else { "" }
    }

    /// Ordered asset suffixes to try for this platform on a host of the given width.
    ///
    /// 64-bit is always tried before 32-bit, and the Apple Silicon macOS
    /// build before the generic one. Width-qualified platforms never fall back.
    #[must_use]
    pub fn candidates(self, width: PointerWidth) -> Vec<AssetSuffix> {
        use AssetSuffix as S;

        match (self, width) {
            (Self::Win, PointerWidth::Bits64) => vec![S::Win64, S::Win32],
            (Self::Win | Self::Win32, _) => vec![S::Win32],
            (Self::Win64, _) => vec![S::Win64],
            (Self::Linux, PointerWidth::Bits64) => vec![S::Linux64, S::Linux32],
            (Self::Linux | Self::Linux32, _) => vec![S::Linux32],
            (Self::Linux64, _) => vec![S::Linux64],
            (Self::Macos, PointerWidth::Bits64) => vec![S::MacosAarch64, S::Macos],
            (Self::Macos, PointerWidth::Bits32) => vec![S::Macos],
        }
    }
}

impl FromStr for Platform {
    type Err = GeckoDriverError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| GeckoDriverError::unknown_platform(token))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PointerWidth {
    /// Pointer width the binary was compiled for.
    #[must_use]
    pub fn host() -> Self {
        if cfg!(target_pointer_width = "64") {
            Self::Bits64
        } else {
            Self::Bits32
        }
    }
}

impl ArchiveKind {
    /// File extension including the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::TarGz => ".tar.gz",
        }
    }

}

impl AssetSuffix {
    /// Token used in the release asset name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Win32 => "win32",
            Self::Win64 => "win64",
            Self::Linux32 => "linux32",
            Self::Linux64 => "linux64",
            Self::Macos => "macos",
            Self::MacosAarch64 => "macos-aarch64",
        }
    }
}

impl fmt::Display for AssetSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
