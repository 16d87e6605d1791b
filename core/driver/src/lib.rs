#![warn(clippy::pedantic)]

//! Resolve, download, and extract GeckoDriver releases.
//!
//! The pipeline runs in stages, each in its own module:
//!
//! - [`platform`] - supported platforms, host detection, asset suffixes
//! - [`version`] - version strings and validation
//! - [`config`] - endpoints, locator, timeouts, output root
//! - [`http`] - `reqwest` clients and the HEAD probe
//! - [`resolver`] - latest version lookup on the release page
//! - [`url`] - candidate download URLs and validation
//! - [`download`] - streaming archive retrieval
//! - [`archive`] - ZIP and tar.gz extraction
//! - [`paths`] - output layout and install metadata
//!
//! [`GeckoDriver`] ties the stages together for one platform.
//!
//! ```no_run
//! use gecko_driver::{DriverConfig, GeckoDriver, Platform};
//!
//! # async fn run() -> gecko_driver::Result<()> {
//! let driver = GeckoDriver::new(Platform::detect()?, DriverConfig::from_env())?;
//! let dir = driver.download_latest_version(None, true).await?;
//! println!("{}", dir.join(driver.driver_filename()).display());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod download;
pub mod errors;
pub mod http;
pub mod paths;
pub mod platform;
pub mod resolver;
pub mod url;
pub mod version;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use config::DriverConfig;
pub use errors::{GeckoDriverError, Result};
pub use http::{AssetProbe, HttpClient};
pub use paths::DriverMetadata;
pub use platform::{ArchiveKind, AssetSuffix, OsFamily, Platform, PointerWidth};
pub use url::DownloadTarget;
pub use version::{Version, is_valid_version};

/// Platforms listed by [`GeckoDriver::latest_urls`].
pub const LATEST_URL_PLATFORMS: [Platform; 5] = [
    Platform::Win32,
    Platform::Win64,
    Platform::Linux32,
    Platform::Linux64,
    Platform::Macos,
];

/// Resolution and download pipeline for one platform.
#[derive(Debug, Clone)]
pub struct GeckoDriver {
    platform: Platform,
    width: PointerWidth,
    config: DriverConfig,
    client: HttpClient,
}

impl GeckoDriver {
    /// Creates a pipeline for `platform` on a host of the compiled pointer width.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(platform: Platform, config: DriverConfig) -> Result<Self> {
        let client = HttpClient::new(&config)?;
        Ok(Self {
            platform,
            width: PointerWidth::host(),
            config,
            client,
        })
    }

    /// Overrides the host pointer width used for generic platforms.
    #[must_use]
    pub fn with_pointer_width(mut self, width: PointerWidth) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Driver binary name: `geckodriver.exe` on Windows, `geckodriver` elsewhere.
    #[must_use]
    pub fn driver_filename(&self) -> String {
        format!("{}{}", self.config.driver_name, self.platform.executable_extension())
    }

    /// Returns the version marked latest on the release page.
    ///
    /// # Errors
    ///
    /// See [`resolver::latest_version`].
    pub async fn latest_version(&self) -> Result<Version> {
        resolver::latest_version(&self.client, &self.config).await
    }

    /// Returns the validated download for `version` on this platform.
    ///
    /// # Errors
    ///
    /// See [`url::resolve_version_url`].
    pub async fn version_url(&self, version: &str) -> Result<DownloadTarget> {
        url::resolve_version_url(&self.client, &self.config, self.platform, self.width, version).await
    }

    /// Returns the validated download for the latest version.
    ///
    /// # Errors
    ///
    /// Fails if the latest version cannot be resolved or has no download.
    pub async fn latest_version_url(&self) -> Result<DownloadTarget> {
        let version = self.latest_version().await?;
        self.version_url(version.as_str()).await
    }

    /// Resolves the latest download for each of [`LATEST_URL_PLATFORMS`].
    ///
    /// The latest version is looked up once. A platform without a download
    /// gets its own error and does not stop the others.
    ///
    /// # Errors
    ///
    /// Fails only if the latest version cannot be resolved.
    pub async fn latest_urls(&self) -> Result<Vec<(Platform, Result<DownloadTarget>)>> {
        let version = self.latest_version().await?;
        let mut urls = Vec::with_capacity(LATEST_URL_PLATFORMS.len());
        for platform in LATEST_URL_PLATFORMS {
            let target =
                url::resolve_version_url(&self.client, &self.config, platform, self.width, version.as_str())
                    .await;
            urls.push((platform, target));
        }
        Ok(urls)
    }

    /// Downloads `version`, optionally extracting it, and returns the output directory.
    ///
    /// Without `output_dir` the driver goes to `<output_root>/<version>/bin`.
    /// When extracting into a directory that already holds this version for
    /// this platform the download is skipped. Extraction runs on the blocking
    /// pool so it does not stall the runtime.
    ///
    /// # Errors
    ///
    /// - [`GeckoDriverError::UnknownVersion`] for malformed versions
    /// - [`GeckoDriverError::VersionUrl`] if no download exists
    /// - [`GeckoDriverError::DownloadError`] or [`GeckoDriverError::Archive`]
    ///   if retrieval or extraction fails
    pub async fn download_version(
        &self,
        version: &str,
        output_dir: Option<&Path>,
        extract: bool,
    ) -> Result<PathBuf> {
        let version = Version::parse(version)?;
        let dir = output_dir.map_or_else(
            || paths::default_output_dir(&self.config, &version),
            Path::to_path_buf,
        );
        let binary_name = self.driver_filename();

        if extract && paths::is_cached(&dir, &version, self.platform, &binary_name) {
            tracing::info!(%version, dir = %dir.display(), "driver already downloaded");
            return Ok(dir);
        }

        let target = self.version_url(version.as_str()).await?;
        tracing::debug!(url = %target.url, dir = %dir.display(), "downloading driver");
        let (archive_path, _) =
            download::download_file(&self.client, &target.url, &dir, self.config.show_progress).await?;

        if extract {
            let (kind, platform, dest) = (target.kind, self.platform, dir.clone());
            tokio::task::spawn_blocking(move || {
                archive::install_archive(&archive_path, &dest, kind, platform, &binary_name)
            })
            .await
            .map_err(|e| GeckoDriverError::archive_error_with_source("Extraction task failed", e))??;
            paths::write_metadata(
                &dir,
                &DriverMetadata {
                    version: version.to_string(),
                    platform: self.platform.to_string(),
                    url: target.url,
                },
            )?;
        }

        Ok(dir)
    }

    /// Downloads the latest version; see [`GeckoDriver::download_version`].
    ///
    /// # Errors
    ///
    /// Fails if the latest version cannot be resolved or the download fails.
    pub async fn download_latest_version(&self, output_dir: Option<&Path>, extract: bool) -> Result<PathBuf> {
        let version = self.latest_version().await?;
        self.download_version(version.as_str(), output_dir, extract).await
    }

    /// Downloads and extracts the latest version and appends its directory to
    /// this process's `PATH`.
    ///
    /// The change is visible to this process and its children only. Returns
    /// the absolute output directory.
    ///
    /// # Errors
    ///
    /// Fails if the download fails or the directory cannot be added to `PATH`.
    pub async fn install(&self, output_dir: Option<&Path>) -> Result<PathBuf> {
        let dir = self.download_latest_version(output_dir, true).await?;
        let dir = std::path::absolute(&dir).map_err(|e| {
            GeckoDriverError::other_with_source(format!("Failed to resolve {}", dir.display()), e)
        })?;

        let path = path_with_dir(std::env::var_os("PATH"), &dir)?;
        // SAFETY: the command surface runs on a single-threaded runtime and
        // nothing else reads or writes the environment concurrently.
        unsafe { std::env::set_var("PATH", &path) };
        tracing::info!(dir = %dir.display(), "added driver directory to PATH");

        Ok(dir)
    }
}

/// Returns `current` with `dir` appended, unless it is already listed.
///
/// # Errors
///
/// Returns an error if `dir` contains the platform's path separator.
pub fn path_with_dir(current: Option<OsString>, dir: &Path) -> Result<OsString> {
    let mut entries: Vec<PathBuf> = current
        .as_deref()
        .map(|p| std::env::split_paths(p).collect())
        .unwrap_or_default();
    if !entries.iter().any(|entry| entry == dir) {
        entries.push(dir.to_path_buf());
    }
    std::env::join_paths(entries)
        .map_err(|e| GeckoDriverError::other_with_source(format!("Cannot add {} to PATH", dir.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const DRIVER_CONTENT: &[u8] = b"#!/bin/sh\necho geckodriver\n";

    /// Local release server: a release page marking `v0.34.0` latest and the
    /// listed assets. HEAD on a listed asset answers `302`, anything else `404`.
    struct ReleaseServer {
        addr: SocketAddr,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl ReleaseServer {
        async fn start(assets: &[&str], archive: Vec<u8>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let requests = Arc::new(Mutex::new(Vec::new()));
            let log = Arc::clone(&requests);
            let assets: Vec<String> = assets
                .iter()
                .map(|name| format!("/releases/download/v0.34.0/{name}"))
                .collect();

            tokio::spawn(async move {
                while let Ok((mut stream, _)) = listener.accept().await {
                    let mut head = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => head.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&head);
                    let mut line = head.split_whitespace();
                    let method = line.next().unwrap_or_default().to_string();
                    let path = line.next().unwrap_or_default().to_string();
                    log.lock().unwrap().push(format!("{method} {path}"));

                    let listed = assets.contains(&path);
                    let (status, extra, body) = match (method.as_str(), path.as_str()) {
                        ("GET", "/releases") => ("200 OK", String::new(), release_page().into_bytes()),
                        ("HEAD", _) if listed => ("302 Found", format!("Location: {path}\r\n"), Vec::new()),
                        ("GET", _) if listed => ("200 OK", String::new(), archive.clone()),
                        _ => ("404 Not Found", String::new(), Vec::new()),
                    };
                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n{extra}\r\n",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    if method != "HEAD" {
                        let _ = stream.write_all(&body).await;
                    }
                    let _ = stream.shutdown().await;
                }
            });

            Self { addr, requests }
        }

        fn config(&self, root: &Path) -> DriverConfig {
            DriverConfig {
                request_timeout: Duration::from_secs(5),
                download_timeout: Duration::from_secs(5),
                ..DriverConfig::default()
            }
            .with_releases_url(format!("http://{}/releases", self.addr))
            .with_output_root(root)
        }

        fn asset_url(&self, name: &str) -> String {
            format!("http://{}/releases/download/v0.34.0/{name}", self.addr)
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn clear(&self) {
            self.requests.lock().unwrap().clear();
        }
    }

    fn release_page() -> String {
        r#"<html><body>
        <div class="release label-latest">
          <div class="release-meta">meta</div>
          <div class="release-main">
            <div class="release-header">
              <div class="title">
                <div class="name"><a href="/releases/tag/v0.34.0">v0.34.0</a></div>
              </div>
            </div>
          </div>
        </div>
        </body></html>"#
            .to_string()
    }

    /// Linux-style release archive with the driver at the root, not yet executable.
    fn driver_tar_gz() -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let mut header = tar::Header::new_gnu();
        header.set_size(DRIVER_CONTENT.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "geckodriver", DRIVER_CONTENT)
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    /// Config pointing at a port nothing listens on.
    fn offline_config(root: &Path) -> DriverConfig {
        DriverConfig {
            request_timeout: Duration::from_secs(2),
            download_timeout: Duration::from_secs(2),
            ..DriverConfig::default()
        }
        .with_releases_url("http://127.0.0.1:9/releases")
        .with_output_root(root)
    }

    #[test]
    fn driver_filename_follows_platform_family() {
        let config = DriverConfig::default();
        let win = GeckoDriver::new(Platform::Win64, config.clone()).unwrap();
        let linux = GeckoDriver::new(Platform::Linux, config.clone()).unwrap();
        let mac = GeckoDriver::new(Platform::Macos, config).unwrap();

        assert_eq!(win.driver_filename(), "geckodriver.exe");
        assert_eq!(linux.driver_filename(), "geckodriver");
        assert_eq!(mac.driver_filename(), "geckodriver");
    }

    #[tokio::test]
    async fn cached_version_is_not_downloaded_again() {
        let temp = tempfile::tempdir().unwrap();
        let driver = GeckoDriver::new(Platform::Linux64, offline_config(temp.path())).unwrap();
        let version = Version::parse("0.34.0").unwrap();

        let dir = paths::default_output_dir(driver.config(), &version);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("geckodriver"), b"binary").unwrap();
        paths::write_metadata(
            &dir,
            &DriverMetadata {
                version: "0.34.0".to_string(),
                platform: "linux64".to_string(),
                url: "http://127.0.0.1:9/releases/download/v0.34.0/geckodriver-v0.34.0-linux64.tar.gz".to_string(),
            },
        )
        .unwrap();

        let result = driver.download_version("0.34.0", None, true).await.unwrap();

        assert_eq!(result, temp.path().join("0.34.0").join("bin"));
    }

    #[tokio::test]
    async fn stale_binary_triggers_download() {
        let temp = tempfile::tempdir().unwrap();
        let out = temp.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("geckodriver"), b"old binary").unwrap();
        let driver = GeckoDriver::new(Platform::Linux64, offline_config(temp.path())).unwrap();

        let err = driver.download_version("0.34.0", Some(&out), true).await.unwrap_err();

        assert!(err.is_connectivity(), "download was attempted: {err}");
    }

    #[tokio::test]
    async fn invalid_version_fails_before_network() {
        let temp = tempfile::tempdir().unwrap();
        let driver = GeckoDriver::new(Platform::Linux, offline_config(temp.path())).unwrap();

        let err = driver.download_version("latest", None, false).await.unwrap_err();

        assert!(matches!(err, GeckoDriverError::UnknownVersion { ref version } if version == "latest"));
        assert!(!temp.path().join("latest").exists());
    }

    #[tokio::test]
    async fn unreachable_release_page_is_connectivity_error() {
        let temp = tempfile::tempdir().unwrap();
        let driver = GeckoDriver::new(Platform::Linux, offline_config(temp.path())).unwrap();

        let err = driver.latest_version().await.unwrap_err();

        assert!(err.is_connectivity());
        assert!(err.to_string().contains("127.0.0.1:9"));
    }

    #[tokio::test]
    async fn latest_release_is_downloaded_extracted_and_reused() {
        let asset = "geckodriver-v0.34.0-linux64.tar.gz";
        let server = ReleaseServer::start(&[asset], driver_tar_gz()).await;
        let temp = tempfile::tempdir().unwrap();
        let driver = GeckoDriver::new(Platform::Linux64, server.config(temp.path()))
            .unwrap()
            .with_pointer_width(PointerWidth::Bits64);

        assert_eq!(driver.latest_version().await.unwrap().as_str(), "0.34.0");
        let target = driver.latest_version_url().await.unwrap();
        assert_eq!(target.url, server.asset_url(asset));
        assert_eq!(target.kind, ArchiveKind::TarGz);

        let dir = driver.download_latest_version(None, true).await.unwrap();

        assert_eq!(dir, temp.path().join("0.34.0").join("bin"));
        let binary = dir.join("geckodriver");
        assert_eq!(std::fs::read(&binary).unwrap(), DRIVER_CONTENT);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&binary).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
        assert!(!dir.join(asset).exists(), "archive is removed after extraction");
        assert!(!dir.join(format!("{asset}.tmp")).exists());
        let marker = paths::read_metadata(&dir).unwrap();
        assert_eq!(marker.version, "0.34.0");
        assert_eq!(marker.platform, "linux64");
        assert_eq!(marker.url, server.asset_url(asset));
        assert!(
            server
                .requests()
                .contains(&format!("GET /releases/download/v0.34.0/{asset}"))
        );

        server.clear();
        let again = driver.download_version("0.34.0", None, true).await.unwrap();

        assert_eq!(again, dir);
        assert!(server.requests().is_empty(), "second run hit the server: {:?}", server.requests());
    }

    #[tokio::test]
    async fn download_without_extract_keeps_archive() {
        let asset = "geckodriver-v0.34.0-linux64.tar.gz";
        let server = ReleaseServer::start(&[asset], driver_tar_gz()).await;
        let temp = tempfile::tempdir().unwrap();
        let out = temp.path().join("out");
        let driver = GeckoDriver::new(Platform::Linux64, server.config(temp.path())).unwrap();

        let dir = driver.download_version("0.34.0", Some(&out), false).await.unwrap();

        assert_eq!(dir, out);
        assert_eq!(std::fs::read(out.join(asset)).unwrap(), driver_tar_gz());
        assert!(!out.join("geckodriver").exists());
        assert!(paths::read_metadata(&out).is_none());
    }

    #[tokio::test]
    async fn win_on_64_bit_host_falls_back_to_win32() {
        let server = ReleaseServer::start(&["geckodriver-v0.34.0-win32.zip"], Vec::new()).await;
        let temp = tempfile::tempdir().unwrap();
        let driver = GeckoDriver::new(Platform::Win, server.config(temp.path()))
            .unwrap()
            .with_pointer_width(PointerWidth::Bits64);

        let target = driver.version_url("0.34.0").await.unwrap();

        assert_eq!(target.suffix, AssetSuffix::Win32);
        assert_eq!(target.kind, ArchiveKind::Zip);
        assert_eq!(target.url, server.asset_url("geckodriver-v0.34.0-win32.zip"));
        assert_eq!(
            server.requests(),
            vec![
                "HEAD /releases/download/v0.34.0/geckodriver-v0.34.0-win64.zip".to_string(),
                "HEAD /releases/download/v0.34.0/geckodriver-v0.34.0-win32.zip".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn missing_asset_is_version_url_error() {
        let server = ReleaseServer::start(&[], Vec::new()).await;
        let temp = tempfile::tempdir().unwrap();
        let driver = GeckoDriver::new(Platform::Linux64, server.config(temp.path())).unwrap();

        let err = driver.download_version("0.34.0", None, true).await.unwrap_err();

        assert!(matches!(err, GeckoDriverError::VersionUrl { .. }), "{err}");
        assert!(!temp.path().join("0.34.0").join("bin").join("geckodriver").exists());
    }

    #[test]
    fn path_with_dir_appends_once() {
        let dir = PathBuf::from("/opt/geckodriver/0.34.0/bin");
        let current = std::env::join_paths([PathBuf::from("/usr/bin"), PathBuf::from("/bin")]).unwrap();

        let updated = path_with_dir(Some(current), &dir).unwrap();
        let entries: Vec<_> = std::env::split_paths(&updated).collect();
        assert_eq!(entries.last(), Some(&dir));
        assert_eq!(entries.len(), 3);

        let again = path_with_dir(Some(updated), &dir).unwrap();
        assert_eq!(std::env::split_paths(&again).count(), 3);
    }

    #[test]
    fn path_with_dir_handles_missing_path() {
        let dir = PathBuf::from("/opt/geckodriver/bin");
        let updated = path_with_dir(None, &dir).unwrap();
        assert_eq!(std::env::split_paths(&updated).collect::<Vec<_>>(), vec![dir]);
    }
}
