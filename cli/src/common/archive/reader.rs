//! # Stowage Archive Reader (`common::archive::reader`)
//!
//! File: cli/src/common/archive/reader.rs
//!
//! ## Overview
//!
//! Extracts an archive written by stowage (or any archive of a supported
//! format) into a destination directory. The format is taken from the file
//! name; nothing is read or created before it is recognized.
//!
use super::{tar, zip, ArchiveFormat, EntryCounts};
use crate::common::fs::io::ensure_dir_exists;
use crate::core::error::{Result, StowageError};
use anyhow::{bail, Context};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// # Extract Archive (`extract`)
///
/// Unpacks `archive` below `destination`.
///
/// ## Arguments
///
/// * `archive` - Path of the archive; its suffix selects the format.
/// * `destination` - Output directory. Created if missing.
/// * `force` - Allow an existing `destination`; files and symlinks in the way
///   of archive members are replaced.
///
/// ## Errors
///
/// Returns an `Err` if:
/// - The suffix is not one of the supported formats (`UnsupportedFormat`).
/// - `destination` exists and `force` is false (`DestinationExists`).
/// - The archive is unreadable or a member cannot be written.
pub fn extract(archive: &Path, destination: &Path, force: bool) -> Result<EntryCounts> {
    let format = ArchiveFormat::from_archive_path(archive)?;
    if !force && destination.symlink_metadata().is_ok() {
        bail!(StowageError::DestinationExists(destination.to_path_buf()));
    }

    let file = File::open(archive)
        .with_context(|| format!("Failed to open archive: {}", archive.display()))?;
    ensure_dir_exists(destination)?;

    let counts = if format.is_zip() {
        zip::extract_entries(file, destination, force)?
    } else {
        tar::extract_compressed(file, format, destination, force)?
    };
    info!(
        "Extracted {} ({}): {} files, {} symlinks, {} dirs into {}",
        archive.display(),
        format,
        counts.files,
        counts.symlinks,
        counts.dirs,
        destination.display()
    );
    if counts.skipped > 0 {
        info!("Skipped {} unsafe members", counts.skipped);
    }
    Ok(counts)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::ArchiveEntry;
    use crate::core::error::{stowage_error, ErrorKind};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn small_archive(dir: &Path, format: ArchiveFormat) -> Result<PathBuf> {
        let source = dir.join("payload.txt");
        fs::write(&source, "payload")?;
        let entries = vec![ArchiveEntry::file(source, PathBuf::from("nested/payload.txt"))];
        let archive = format.append_suffix(&dir.join("small"));
        let file = File::create(&archive)?;
        if format.is_zip() {
            zip::write_entries(file, &entries, zip::compression_method(format))?;
        } else {
            tar::write_compressed(file, &entries, format)?;
        }
        Ok(archive)
    }

    #[test]
    fn test_unknown_extension_is_checked_first() -> Result<()> {
        let work = tempdir()?;
        // Neither the archive nor the destination matter for this error.
        let err = extract(&work.path().join("missing.rar"), work.path(), false).unwrap_err();
        assert_eq!(stowage_error(&err).map(|e| e.kind()), Some(ErrorKind::Compression));
        Ok(())
    }

    #[test]
    fn test_existing_destination_requires_force() -> Result<()> {
        let work = tempdir()?;
        let archive = small_archive(work.path(), ArchiveFormat::TarGz)?;
        let out = work.path().join("out");
        fs::create_dir(&out)?;

        let err = extract(&archive, &out, false).unwrap_err();
        assert!(matches!(
            stowage_error(&err),
            Some(StowageError::DestinationExists(_))
        ));

        let counts = extract(&archive, &out, true)?;
        assert_eq!(counts.files, 1);
        assert_eq!(fs::read_to_string(out.join("nested/payload.txt"))?, "payload");
        Ok(())
    }

    #[test]
    fn test_force_overwrites_previous_extraction() -> Result<()> {
        let work = tempdir()?;
        let archive = small_archive(work.path(), ArchiveFormat::Zip)?;
        let out = work.path().join("out");
        extract(&archive, &out, false)?;
        fs::write(out.join("nested/payload.txt"), "edited")?;

        extract(&archive, &out, true)?;
        assert_eq!(fs::read_to_string(out.join("nested/payload.txt"))?, "payload");
        Ok(())
    }
}
