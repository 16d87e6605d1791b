//! Archive extraction for downloaded driver releases.
//!
//! Windows releases ship as `.zip`, Linux and macOS releases as `.tar.gz`.
//! Both contain the driver binary at the archive root. Extraction is not
//! atomic: a failure part way leaves whatever was already written.

use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::errors::{GeckoDriverError, Result};
use crate::platform::{ArchiveKind, Platform};

/// Extracts `archive_path`, removes it, and prepares the driver binary.
///
/// Returns the path of the driver binary inside `dest_dir`.
///
/// # Errors
///
/// Returns [`GeckoDriverError::Archive`] if extraction fails, the archive
/// does not contain `binary_name`, or permissions cannot be set.
pub fn install_archive(
    archive_path: &Path,
    dest_dir: &Path,
    kind: ArchiveKind,
    platform: Platform,
    binary_name: &str,
) -> Result<PathBuf> {
    extract(archive_path, dest_dir, kind)?;

    std::fs::remove_file(archive_path).map_err(|e| {
        GeckoDriverError::archive_error_with_source(
            format!("Failed to remove archive: {}", archive_path.display()),
            e,
        )
    })?;

    let binary = dest_dir.join(binary_name);
    if !binary.is_file() {
        return Err(GeckoDriverError::archive_error(format!(
            "{binary_name} not found after extracting {}",
            archive_path.display()
        )));
    }

    if !platform.is_windows() {
        set_executable_permissions(&binary)?;
    }

    tracing::info!(path = %binary.display(), "driver extracted");
    Ok(binary)
}

/// Extracts an archive of the given kind into `dest_dir`.
///
/// # Errors
///
/// Returns [`GeckoDriverError::Archive`] if the archive cannot be read or an
/// entry cannot be written.
pub fn extract(archive_path: &Path, dest_dir: &Path, kind: ArchiveKind) -> Result<()> {
    match kind {
        ArchiveKind::Zip => extract_zip(archive_path, dest_dir),
        ArchiveKind::TarGz => extract_tar_gz(archive_path, dest_dir),
    }
}

/// Extracts a ZIP archive into `dest_dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`GeckoDriverError::Archive`] on unreadable archives, entries
/// escaping `dest_dir`, or write failures.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = std::fs::File::open(archive_path).map_err(|e| open_error(archive_path, e))?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        GeckoDriverError::archive_error_with_source(
            format!("Failed to read ZIP archive: {}", archive_path.display()),
            e,
        )
    })?;

    create_dir(dest_dir)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            GeckoDriverError::archive_error_with_source(format!("Failed to read archive entry {i}"), e)
        })?;

        let entry_path = entry.enclosed_name().ok_or_else(|| {
            GeckoDriverError::archive_error(format!("Invalid entry path in archive: {}", entry.name()))
        })?;
        ensure_relative(&entry_path)?;

        let output_path = dest_dir.join(&entry_path);

        if entry.is_dir() {
            create_dir(&output_path)?;
        } else {
            if let Some(parent) = output_path.parent() {
                create_dir(parent)?;
            }

            let mut outfile = std::fs::File::create(&output_path).map_err(|e| write_error(&output_path, e))?;
            std::io::copy(&mut entry, &mut outfile).map_err(|e| write_error(&output_path, e))?;
        }
    }

    Ok(())
}

/// Extracts a tar.gz archive into `dest_dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`GeckoDriverError::Archive`] on unreadable archives, entries
/// escaping `dest_dir`, or write failures.
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    create_dir(dest_dir)?;

    let file = std::fs::File::open(archive_path).map_err(|e| open_error(archive_path, e))?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let entries = archive.entries().map_err(|e| {
        GeckoDriverError::archive_error_with_source(
            format!("Failed to read tar entries: {}", archive_path.display()),
            e,
        )
    })?;

    for entry in entries {
        let mut entry = entry.map_err(|e| {
            GeckoDriverError::archive_error_with_source(
                format!("Failed to read tar entry: {}", archive_path.display()),
                e,
            )
        })?;

        let entry_path = entry
            .path()
            .map_err(|e| GeckoDriverError::archive_error_with_source("Failed to get entry path", e))?
            .into_owned();
        ensure_relative(&entry_path)?;

        // "./" entries produced by `tar -C dir .`
        if entry_path.components().all(|c| matches!(c, Component::CurDir)) {
            continue;
        }

        let output_path = dest_dir.join(&entry_path);

        if entry.header().entry_type().is_dir() {
            create_dir(&output_path)?;
        } else {
            if let Some(parent) = output_path.parent() {
                create_dir(parent)?;
            }
            entry.unpack(&output_path).map_err(|e| write_error(&output_path, e))?;
        }
    }

    Ok(())
}

/// Sets `0o755` on the driver binary (Unix only).
///
/// # Errors
///
/// Returns [`GeckoDriverError::Archive`] if the metadata cannot be read or
/// the permissions cannot be changed.
#[cfg(unix)]
pub fn set_executable_permissions(binary: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(binary)
        .map_err(|e| {
            GeckoDriverError::archive_error_with_source(format!("Failed to get metadata: {}", binary.display()), e)
        })?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(binary, perms).map_err(|e| {
        GeckoDriverError::archive_error_with_source(format!("Failed to set permissions: {}", binary.display()), e)
    })
}

/// Sets executable permissions (no-op on Windows).
#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
pub fn set_executable_permissions(_binary: &Path) -> Result<()> {
    Ok(())
}

/// Rejects absolute entries and entries containing `..`.
fn ensure_relative(entry_path: &Path) -> Result<()> {
    if entry_path.is_absolute()
        || entry_path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir))
    {
        return Err(GeckoDriverError::archive_error(format!(
            "Refusing to extract path with parent directory or absolute reference: {}",
            entry_path.display()
        )));
    }
    Ok(())
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        GeckoDriverError::archive_error_with_source(format!("Failed to create directory: {}", dir.display()), e)
    })
}

fn open_error(archive_path: &Path, e: std::io::Error) -> GeckoDriverError {
    GeckoDriverError::archive_error_with_source(format!("Failed to open archive: {}", archive_path.display()), e)
}

fn write_error(output_path: &Path, e: std::io::Error) -> GeckoDriverError {
    GeckoDriverError::archive_error_with_source(format!("Failed to extract: {}", output_path.display()), e)
}
