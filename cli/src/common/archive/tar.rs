//! # Stowage TAR Archive Operations (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//!
//! ## Overview
//!
//! This module reads and writes the tar family (`.tar.gz`, `.tar.bz2`,
//! `.tar.xz`). The container is handled by the `tar` crate; the compression
//! stream wrapped around it comes from `flate2`, `bzip2` or `xz2`.
//!
//! ## Architecture
//!
//! - Writing is generic over the output stream: [`write_entries`] fills a
//!   `tar::Builder` around any `Write` and hands the stream back, so the caller
//!   can finish its encoder.
//! - Symlinks get a GNU header with entry type `Symlink` and the literal link
//!   text as link name; the builder never follows them.
//! - Every member name is checked against the destination first (see
//!   [`ExtractRoot`]); only then may `--force` remove what is in the way.
//!   `Entry::unpack_in` then recreates files, directories and symlinks.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::tar;
//!
//! let file = File::create("game.tar.gz")?;
//! let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
//! let (encoder, _counts) = tar::write_entries(encoder, &entries)?;
//! encoder.finish()?;
//! ```
//!
use super::{link_text, ArchiveEntry, ArchiveFormat, EntryCounts, ExtractRoot};
use crate::common::fs::io::remove_existing;
use crate::core::error::Result;
use anyhow::{bail, Context};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tar::{Archive, Builder, EntryType, Header};
use tracing::{debug, warn};

/// Compression level passed to the xz encoder.
const XZ_PRESET: u32 = 6;

/// # Write TAR Entries (`write_entries`)
///
/// Appends every entry to a tar stream written into `writer`.
///
/// ## Arguments
///
/// * `writer` - The (usually compressing) stream receiving the tar data.
/// * `entries` - Members in write order. Regular files are read from `source`.
///
/// ## Returns
///
/// * `Result<(W, EntryCounts)>` - The writer, with the tar trailer written but
///   not yet finished as a compression stream, and the member counts.
///
/// ## Errors
///
/// Returns an `Err` if a source file cannot be read or a header cannot be
/// built (e.g. a member name the tar format cannot represent).
pub fn write_entries<W: Write>(writer: W, entries: &[ArchiveEntry]) -> Result<(W, EntryCounts)> {
    let mut builder = Builder::new(writer);
    builder.follow_symlinks(false);
    let mut counts = EntryCounts::default();

    for entry in entries {
        let name = entry.member_name();
        if let Some(target) = &entry.link_target {
            let mut header = Header::new_gnu();
            header.set_entry_type(EntryType::Symlink);
            header.set_size(0);
            header.set_mode(0o777);
            builder
                .append_link(&mut header, &name, link_text(target))
                .with_context(|| format!("Failed to add symlink to tar archive: {}", name))?;
            debug!("tar: {} -> {}", name, target.display());
        } else {
            builder
                .append_path_with_name(&entry.source, &name)
                .with_context(|| {
                    format!(
                        "Failed to add '{}' to the tar archive as '{}'",
                        entry.source.display(),
                        name
                    )
                })?;
            debug!("tar: {}", name);
        }
        counts.record(entry);
    }

    let writer = builder
        .into_inner()
        .context("Failed to finalize tar archive structure")?;
    Ok((writer, counts))
}

/// Writes `entries` to `file` as a compressed tar of the given `format`.
pub fn write_compressed(file: File, entries: &[ArchiveEntry], format: ArchiveFormat) -> Result<EntryCounts> {
    let counts = match format {
        ArchiveFormat::TarGz => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            let (encoder, counts) = write_entries(encoder, entries)?;
            encoder
                .finish()
                .context("Failed to finish gzip compression stream")?;
            counts
        }
        ArchiveFormat::TarBz2 => {
            let encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
            let (encoder, counts) = write_entries(encoder, entries)?;
            encoder
                .finish()
                .context("Failed to finish bzip2 compression stream")?;
            counts
        }
        ArchiveFormat::TarXz => {
            let encoder = xz2::write::XzEncoder::new(file, XZ_PRESET);
            let (encoder, counts) = write_entries(encoder, entries)?;
            encoder
                .finish()
                .context("Failed to finish xz compression stream")?;
            counts
        }
        other => bail!("'{}' is not a tar format", other),
    };
    Ok(counts)
}

/// Extracts the tar stream read from `reader` below `destination`.
///
/// With `force`, a file or symlink already present at a member's path is
/// removed before that member is unpacked. Members that would land outside
/// `destination` are skipped with a warning before anything is touched.
pub fn extract_entries<R: Read>(reader: R, destination: &Path, force: bool) -> Result<EntryCounts> {
    let root = ExtractRoot::new(destination)?;
    let mut archive = Archive::new(reader);
    archive.set_preserve_permissions(true);
    let mut counts = EntryCounts::default();

    for entry in archive.entries().context("Failed to read tar archive")? {
        let mut entry = entry.context("Failed to read tar entry")?;
        let relative = entry
            .path()
            .context("Tar entry has an unreadable path")?
            .into_owned();
        let kind = entry.header().entry_type();

        let Some(target) = root.target(&relative)? else {
            warn!("Skipping unsafe tar member name \"{}\"", relative.display());
            counts.skipped += 1;
            continue;
        };
        if force && !kind.is_dir() {
            remove_existing(&target)?;
        }
        let unpacked = entry
            .unpack_in(destination)
            .with_context(|| format!("Failed to extract {}", relative.display()))?;
        if !unpacked {
            warn!("Skipping unsafe tar member name \"{}\"", relative.display());
            counts.skipped += 1;
            continue;
        }

        match kind {
            EntryType::Directory => counts.dirs += 1,
            EntryType::Symlink => counts.symlinks += 1,
            _ => counts.files += 1,
        }
        debug!("untar: {}", relative.display());
    }
    Ok(counts)
}

/// Extracts `file`, decompressing it according to `format`.
pub fn extract_compressed(
    file: File,
    format: ArchiveFormat,
    destination: &Path,
    force: bool,
) -> Result<EntryCounts> {
    match format {
        ArchiveFormat::TarGz => {
            extract_entries(flate2::read::GzDecoder::new(file), destination, force)
        }
        ArchiveFormat::TarBz2 => {
            extract_entries(bzip2::read::BzDecoder::new(file), destination, force)
        }
        ArchiveFormat::TarXz => extract_entries(xz2::read::XzDecoder::new(file), destination, force),
        other => bail!("'{}' is not a tar format", other),
    }
}
