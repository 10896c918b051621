//! # Stowage ZIP Container (`common::archive::zip`)
//!
//! File: cli/src/common/archive/zip.rs
//!
//! ## Overview
//!
//! Reads and writes the zip family (`.zip`, `.lzma`, `.bz2`) with the `zip`
//! crate. All three share the container; only the per-member compression
//! method differs.
//!
//! Symlinks are stored the way Info-ZIP does it: the member's unix mode has
//! the `S_IFLNK` file type and its payload is the link text. On extraction the
//! payload is first written as a regular file, then read back and replaced by
//! a real symlink.
//!
use super::{link_text, ArchiveEntry, ArchiveFormat, EntryCounts, ExtractRoot};
use crate::common::fs::io::{ensure_dir_exists, ensure_parent_dir, remove_existing};
use crate::common::fs::links::replace_placeholder;
use crate::core::error::Result;
use anyhow::Context;
use std::fs::{self, File};
use std::io::{self, Read, Seek, Write};
use std::path::Path;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Zip members larger than this need zip64 extensions.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Per-member compression method used for `format`.
pub fn compression_method(format: ArchiveFormat) -> CompressionMethod {
    match format {
        ArchiveFormat::ZipBzip2 => CompressionMethod::Bzip2,
        ArchiveFormat::ZipLzma => CompressionMethod::Xz,
        _ => CompressionMethod::Deflated,
    }
}

/// Writes `entries` as a zip archive into `writer` and returns the writer.
pub fn write_entries<W: Write + Seek>(
    writer: W,
    entries: &[ArchiveEntry],
    method: CompressionMethod,
) -> Result<(W, EntryCounts)> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(method);
    let mut counts = EntryCounts::default();

    for entry in entries {
        let name = entry.member_name();
        if let Some(target) = &entry.link_target {
            zip.add_symlink(name.as_str(), link_text(target), options)
                .with_context(|| format!("Failed to add symlink to zip: {}", name))?;
            debug!("zip: {} -> {}", name, target.display());
        } else {
            let mut source = File::open(&entry.source)
                .with_context(|| format!("Failed to open {}", entry.source.display()))?;
            let meta = source
                .metadata()
                .with_context(|| format!("Failed to stat {}", entry.source.display()))?;
            let member_options = options
                .large_file(meta.len() >= ZIP64_THRESHOLD)
                .unix_permissions(permissions_of(&meta));
            zip.start_file(name.as_str(), member_options)
                .with_context(|| format!("Failed to add file to zip: {}", name))?;
            io::copy(&mut source, &mut zip)
                .with_context(|| format!("Failed to write file content: {}", name))?;
            debug!("zip: {}", name);
        }
        counts.record(entry);
    }

    let writer = zip.finish().context("Failed to finalize zip archive")?;
    Ok((writer, counts))
}

#[cfg(unix)]
fn permissions_of(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permissions_of(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

/// Extracts every member of the zip archive read from `reader` below `destination`.
///
/// With `force`, a file or symlink already present at a member's path is
/// removed before that member is written. Members that would land outside
/// `destination`, by name or through a symlink extracted earlier, are skipped
/// with a warning.
pub fn extract_entries<R: Read + Seek>(
    reader: R,
    destination: &Path,
    force: bool,
) -> Result<EntryCounts> {
    let root = ExtractRoot::new(destination)?;
    let mut archive = ZipArchive::new(reader).context("Failed to read zip archive")?;
    let mut counts = EntryCounts::default();

    for index in 0..archive.len() {
        let mut member = archive
            .by_index(index)
            .with_context(|| format!("Failed to read zip member #{}", index))?;
        let Some(relative) = member.enclosed_name() else {
            warn!("Skipping unsafe zip member name \"{}\"", member.name());
            counts.skipped += 1;
            continue;
        };
        let Some(target) = root.target(&relative)? else {
            warn!("Skipping zip member \"{}\" leading outside the destination", member.name());
            counts.skipped += 1;
            continue;
        };

        if member.is_dir() {
            ensure_dir_exists(&target)?;
            counts.dirs += 1;
            continue;
        }

        ensure_parent_dir(&target)?;
        // File::create would write through a link left by an earlier member.
        if force || is_symlink(&target) {
            remove_existing(&target)?;
        }
        let mode = member.unix_mode();
        {
            let mut out = File::create(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
            io::copy(&mut member, &mut out)
                .with_context(|| format!("Failed to extract {}", relative.display()))?;
        }

        match mode {
            Some(mode) if mode & S_IFMT == S_IFLNK => {
                replace_placeholder(&target)?;
                counts.symlinks += 1;
            }
            Some(mode) => {
                set_permissions(&target, mode)?;
                counts.files += 1;
            }
            None => counts.files += 1,
        }
        debug!("unzip: {}", relative.display());
    }
    Ok(counts)
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
