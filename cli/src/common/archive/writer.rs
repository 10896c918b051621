//! # Stowage Archive Writer (`common::archive::writer`)
//!
//! File: cli/src/common/archive/writer.rs
//!
//! ## Overview
//!
//! Serializes a [`ScanResult`] into one archive file. Everything that can make
//! the archive wrong is checked before the file is created:
//! - an empty selection (`EmptySelection`),
//! - two sources sharing a destination (`NameCollision`),
//! - the archive itself being part of the selection (`SelfInclusion`).
//!
//! ## Symlinks
//!
//! A selected symlink is stored with its literal link text, but only when the
//! extracted link would point at something that is also in the archive:
//! - `.` is always kept,
//! - an absolute target must lie below the package root, and its
//!   root-relative form must be a selected source or destination,
//! - a relative target is resolved against the link's destination directory
//!   and must name a destination, or a directory containing one.
//!
//! Links failing these checks are skipped with a warning.
//!
//! Member names are the already-relative destinations; the working directory
//! is never changed.
//!
use super::{tar, zip, ArchiveEntry, ArchiveFormat, EntryCounts};
use crate::common::fs::io::ensure_parent_dir;
use crate::common::fs::links::read_link_text;
use crate::common::fs::paths::{absolute, normalize};
use crate::core::error::{Result, StowageError};
use crate::engine::selection::{Placement, ScanResult};
use anyhow::{bail, Context};
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// # Validate Selection (`validate`)
///
/// Runs the checks that must pass before `archive` is created.
///
/// ## Errors
///
/// `EmptySelection`, `NameCollision` or `SelfInclusion`.
pub fn validate(root: &Path, scan: &ScanResult, archive: &Path) -> Result<()> {
    if scan.is_empty() {
        bail!(StowageError::EmptySelection);
    }
    scan.check_collisions()?;

    for relative in archive_paths_below_root(root, archive)? {
        if scan.has_destination(&relative) || scan.contains_source(&relative) {
            bail!(StowageError::SelfInclusion {
                archive: archive.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// The archive path relative to `root`, once lexically and once through the
/// canonical root, for every form in which it lies below the root.
fn archive_paths_below_root(root: &Path, archive: &Path) -> Result<Vec<PathBuf>> {
    let abs_root = absolute(root)?;
    let abs_archive = absolute(archive)?;
    let mut candidates = vec![(abs_root, abs_archive.clone())];

    if let (Ok(canon_root), Some(parent), Some(name)) = (
        root.canonicalize(),
        abs_archive.parent(),
        abs_archive.file_name(),
    ) {
        if let Ok(canon_parent) = parent.canonicalize() {
            candidates.push((canon_root, canon_parent.join(name)));
        }
    }

    Ok(candidates
        .into_iter()
        .filter_map(|(base, path)| pathdiff::diff_paths(path, base))
        .filter(|relative| {
            !relative.as_os_str().is_empty()
                && relative
                    .components()
                    .all(|component| matches!(component, Component::Normal(_)))
        })
        .collect())
}

/// Builds the archive members for `scan`, screening symlinks.
pub fn collect_entries(root: &Path, scan: &ScanResult) -> Result<(Vec<ArchiveEntry>, usize)> {
    let abs_root = absolute(root)?;
    let canon_root = root.canonicalize().ok();
    let mut entries = Vec::with_capacity(scan.len());
    let mut skipped = 0;

    for placement in scan.pairs() {
        let source = root.join(&placement.source);
        if !placement.is_symlink {
            entries.push(ArchiveEntry::file(source, placement.destination));
            continue;
        }
        let text = read_link_text(&source)?;
        if link_is_packable(&placement, &text, &abs_root, canon_root.as_deref(), scan) {
            entries.push(ArchiveEntry::symlink(source, placement.destination, text));
        } else {
            skipped += 1;
        }
    }
    Ok((entries, skipped))
}

fn link_is_packable(
    placement: &Placement,
    text: &Path,
    abs_root: &Path,
    canon_root: Option<&Path>,
    scan: &ScanResult,
) -> bool {
    if text == Path::new(".") {
        return true;
    }
    if text.is_absolute() {
        let relative = text
            .strip_prefix(abs_root)
            .ok()
            .or_else(|| canon_root.and_then(|c| text.strip_prefix(c).ok()));
        return match relative {
            Some(rel) if scan.contains_source(rel) || scan.target_exists(rel) => true,
            Some(_) => {
                warn!(
                    "Skipping symlink \"{}\": absolute target \"{}\" is not part of the archive",
                    placement.source.display(),
                    text.display()
                );
                false
            }
            None => {
                warn!(
                    "Skipping symlink \"{}\": absolute target \"{}\" is outside the package root",
                    placement.source.display(),
                    text.display()
                );
                false
            }
        };
    }

    let base = placement.destination.parent().unwrap_or(Path::new(""));
    match normalize(&base.join(text)) {
        Some(resolved) if scan.target_exists(&resolved) => true,
        _ => {
            warn!(
                "Skipping symlink \"{}\": target \"{}\" is not part of the archive",
                placement.source.display(),
                text.display()
            );
            false
        }
    }
}

/// # Write Archive (`write`)
///
/// Validates the selection, then writes it to `archive` in `format`,
/// creating missing parent directories of `archive`.
///
/// ## Returns
///
/// * `Result<Duration>` - Time spent writing the archive.
///
/// ## Errors
///
/// Any [`validate`] error, or an I/O error while reading sources or writing
/// the archive. A failure after the file was created leaves it in place.
pub fn write(root: &Path, scan: &ScanResult, archive: &Path, format: ArchiveFormat) -> Result<Duration> {
    let started = Instant::now();
    validate(root, scan, archive)?;
    let (entries, skipped) = collect_entries(root, scan)?;

    ensure_parent_dir(archive)?;
    let file = File::create(archive)
        .with_context(|| format!("Failed to create archive file: {}", archive.display()))?;
    debug!("Writing {} members to {}", entries.len(), archive.display());

    let mut counts: EntryCounts = if format.is_zip() {
        let (_, counts) = zip::write_entries(file, &entries, zip::compression_method(format))?;
        counts
    } else {
        tar::write_compressed(file, &entries, format)?
    };
    counts.skipped += skipped;

    let elapsed = started.elapsed();
    info!(
        "Wrote {} ({}): {} files, {} symlinks, {} skipped in {:.2?}",
        archive.display(),
        format,
        counts.files,
        counts.symlinks,
        counts.skipped,
        elapsed
    );
    Ok(elapsed)
}
