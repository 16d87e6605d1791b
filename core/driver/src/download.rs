//! Archive retrieval.
//!
//! Streams a release archive to disk without buffering it in memory. The body
//! is written to a temporary file which is renamed once complete, so a failed
//! download never leaves a truncated archive behind. Downloads are not retried.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::errors::{GeckoDriverError, Result};
use crate::http::HttpClient;

/// Minimum interval between progress updates in milliseconds.
const PROGRESS_INTERVAL_MS: u128 = 250;

/// Returns the final path segment of a URL, ignoring query and fragment.
///
/// # Errors
///
/// Returns a download error if the URL has no usable file name.
pub fn file_name_from_url(url: &str) -> Result<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or_default();
    if name.is_empty() || name.contains(':') {
        return Err(GeckoDriverError::download_error(format!(
            "Cannot derive a file name from {url}"
        )));
    }
    Ok(name.to_string())
}

/// Downloads `url` into `dest_dir`, returning the full path and the file name.
///
/// `dest_dir` is created if missing. Progress is printed to stderr when
/// `show_progress` is set and stderr is a terminal.
///
/// # Errors
///
/// Returns [`GeckoDriverError::DownloadError`] if the request fails, the
/// server answers with a non-success status, or the file cannot be written.
pub async fn download_file(
    client: &HttpClient,
    url: &str,
    dest_dir: &Path,
    show_progress: bool,
) -> Result<(PathBuf, String)> {
    let file_name = file_name_from_url(url)?;

    tokio::fs::create_dir_all(dest_dir).await.map_err(|e| {
        GeckoDriverError::download_error_with_source(
            format!("Failed to create directory: {}", dest_dir.display()),
            e,
        )
    })?;

    let dest = dest_dir.join(&file_name);
    let temp_path = dest_dir.join(format!("{file_name}.tmp"));

    let show_progress = show_progress && std::io::stderr().is_terminal();
    if let Err(e) = stream_to_file(client, url, &temp_path, show_progress).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, &dest).await.map_err(|e| {
        GeckoDriverError::download_error_with_source(
            format!("Failed to rename {} to {}", temp_path.display(), dest.display()),
            e,
        )
    })?;

    tracing::info!(path = %dest.display(), "download finished");
    Ok((dest, file_name))
}

async fn stream_to_file(client: &HttpClient, url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let response = client.get_archive(url).await?;
    let total_size = response.content_length().unwrap_or(0);

    let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
        GeckoDriverError::download_error_with_source(format!("Failed to create file: {}", dest.display()), e)
    })?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;
    let start_time = Instant::now();
    let mut last_update = Instant::now();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            GeckoDriverError::download_error_with_source(format!("Failed to read chunk from {url}"), e)
        })?;
        file.write_all(&chunk).await.map_err(|e| {
            GeckoDriverError::download_error_with_source(format!("Failed to write to {}", dest.display()), e)
        })?;
        downloaded += chunk.len() as u64;

        if show_progress && last_update.elapsed().as_millis() >= PROGRESS_INTERVAL_MS {
            print_progress(downloaded, total_size, start_time.elapsed().as_secs_f64());
            last_update = Instant::now();
        }
    }

    file.flush().await.map_err(|e| {
        GeckoDriverError::download_error_with_source(format!("Failed to flush {}", dest.display()), e)
    })?;

    if show_progress {
        print_progress(downloaded, total_size, start_time.elapsed().as_secs_f64());
        eprintln!();
    }

    Ok(())
}

/// Prints a single-line progress report on stderr.
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
fn print_progress(downloaded: u64, total: u64, elapsed_secs: f64) {
    let percent = if total > 0 {
        (downloaded as f64 / total as f64 * 100.0) as u8
    } else {
        0
    };
    let speed = if elapsed_secs > 0.0 {
        (downloaded as f64 / elapsed_secs) as u64
    } else {
        0
    };

    eprint!(
        "\r{}/{} ({percent}%) {}/s     ",
        format_bytes(downloaded),
        format_bytes(total),
        format_bytes(speed)
    );
    let _ = std::io::stderr().flush();
}

/// Formats bytes into a human-readable string (KB, MB).
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    #[allow(clippy::cast_precision_loss)]
    let bytes_f = bytes as f64;

    if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.2} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriverConfig;
    use std::time::Duration;

    #[test]
    fn file_name_is_last_path_segment() {
        let url = "https://github.com/mozilla/geckodriver/releases/download/v0.34.0/geckodriver-v0.34.0-linux64.tar.gz";
        assert_eq!(file_name_from_url(url).unwrap(), "geckodriver-v0.34.0-linux64.tar.gz");
    }

    #[test]
    fn file_name_ignores_query_and_fragment() {
        assert_eq!(
            file_name_from_url("https://mirror.example/a/geckodriver-win64.zip?token=1#x").unwrap(),
            "geckodriver-win64.zip"
        );
    }

    #[test]
    fn file_name_rejects_directory_urls() {
        assert!(file_name_from_url("https://mirror.example/releases/").is_err());
        assert!(file_name_from_url("https://").is_err());
    }

    #[test]
    fn format_bytes_picks_unit() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }

    #[tokio::test]
    async fn failed_download_leaves_no_files() {
        let temp = tempfile::tempdir().unwrap();
        let dest_dir = temp.path().join("geckodriver").join("0.34.0").join("bin");
        let config = DriverConfig {
            request_timeout: Duration::from_secs(2),
            download_timeout: Duration::from_secs(2),
            ..DriverConfig::default()
        };
        let client = HttpClient::new(&config).unwrap();

        let err = download_file(&client, "http://127.0.0.1:9/geckodriver-v0.34.0-linux64.tar.gz", &dest_dir, false)
            .await
            .unwrap_err();

        assert!(matches!(err, GeckoDriverError::DownloadError { .. }));
        assert!(dest_dir.is_dir(), "destination directory is created up front");
        assert_eq!(std::fs::read_dir(&dest_dir).unwrap().count(), 0);
    }
}
