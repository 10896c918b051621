//! # Stowage Filesystem Copier
//!
//! File: cli/src/common/fs/copy.rs
//!
//! ## Overview
//!
//! Applies a selection directly to another directory tree instead of packing
//! it into an archive. Output paths are the same destinations an archive would
//! contain, rooted at the destination directory.
//!
//! ## Architecture
//!
//! Copying runs in two passes:
//! 1. Every regular file is copied right away, creating parent directories on
//!    demand. Two files mapping to one destination is a `NameCollision`.
//! 2. Symlinks are created afterwards, with the literal link text read from the
//!    source tree. A destination that already got a symlink is skipped.
//!
//! Files below a selected directory symlink whose target is selected too are
//! left out of pass 1: the link brings them along, as it does in an archive.
//!
//! Symlink failures follow one policy, see [`place_symlink`]:
//! - an existing path is fatal when the destination had to be empty, otherwise
//!   it is replaced,
//! - a missing parent is created and the link retried once,
//! - a parent that exists but is not a directory is fatal,
//! - anything else is a warning.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::copy;
//!
//! let (_scan, summary) = copy::copy(root, &filters, Path::new("/tmp/staging"), true)?;
//! println!("{} files, {} symlinks", summary.files, summary.symlinks);
//! ```
//!
use crate::common::fs::io::{
    dir_is_empty, ensure_dir_exists, ensure_parent_dir, find_non_dir_ancestor, remove_existing,
};
use crate::common::fs::links::{create_symlink, read_link_text};
use crate::common::fs::paths::normalize;
use crate::core::error::{Result, StowageError};
use crate::engine::resolver::Filters;
use crate::engine::selection::{select, Placement, ScanResult};
use anyhow::{anyhow, bail, Context};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// What a copy run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopySummary {
    pub matches: usize,
    pub files: usize,
    pub symlinks: usize,
    /// Symlinks that could not be reproduced and were skipped with a warning.
    pub skipped: usize,
}

/// Fails with `NonEmptyDestination` when `require_empty` is set and
/// `destination` already has entries. A missing destination is fine.
pub fn check_destination(destination: &Path, require_empty: bool) -> Result<()> {
    if require_empty && destination.is_dir() && !dir_is_empty(destination)? {
        bail!(StowageError::NonEmptyDestination(destination.to_path_buf()));
    }
    Ok(())
}

/// # Copy Selection (`copy`)
///
/// Selects the files below `root` with `filters` and copies them under
/// `destination`.
///
/// ## Arguments
///
/// * `root` - The package root the rules are evaluated against.
/// * `filters` - Resolved rule section.
/// * `destination` - Output directory, created if missing.
/// * `require_empty` - Refuse a non-empty `destination` (checked before
///   anything is scanned or copied).
///
/// ## Errors
///
/// `NonEmptyDestination`, `NameCollision`, `InvalidDestinationParent`,
/// `Symlink` (pre-existing link target while `require_empty`), and I/O errors
/// while copying regular files.
pub fn copy(
    root: &Path,
    filters: &Filters,
    destination: &Path,
    require_empty: bool,
) -> Result<(ScanResult, CopySummary)> {
    check_destination(destination, require_empty)?;
    let scan = select(root, filters)?;
    let summary = copy_selection(root, &scan, destination, require_empty)?;
    Ok((scan, summary))
}

/// Copies an already computed selection. See [`copy`].
pub fn copy_selection(
    root: &Path,
    scan: &ScanResult,
    destination: &Path,
    require_empty: bool,
) -> Result<CopySummary> {
    ensure_dir_exists(destination)?;
    let mut summary = CopySummary {
        matches: scan.len(),
        ..Default::default()
    };
    let placements = scan.pairs();

    // Files reached through a selected directory symlink arrive with the link.
    let mut dir_links: Vec<&Path> = Vec::new();
    for placement in &placements {
        if carries_files(root, scan, placement)? {
            dir_links.push(&placement.destination);
        }
    }

    // Pass 1: regular files.
    let mut copied: HashMap<&Path, &Path> = HashMap::new();
    for placement in placements.iter().filter(|p| !p.is_symlink) {
        if let Some(link) = dir_links
            .iter()
            .find(|link| placement.destination.starts_with(link))
        {
            debug!("{:?} comes with symlink {:?}", placement.destination, link);
            continue;
        }
        if let Some(first) = copied.get(placement.destination.as_path()) {
            bail!(StowageError::NameCollision {
                destination: placement.destination.clone(),
                first: first.to_path_buf(),
                second: placement.source.clone(),
            });
        }
        let source = root.join(&placement.source);
        let target = destination.join(&placement.destination);
        ensure_parent_dir(&target)?;
        remove_existing(&target)?;
        fs::copy(&source, &target)
            .with_context(|| format!("Failed to copy {:?} to {:?}", source, target))?;
        debug!("Copied {:?} -> {:?}", placement.source, placement.destination);
        copied.insert(&placement.destination, &placement.source);
        summary.files += 1;
    }

    // Pass 2: symlinks, with their literal text.
    let mut linked: HashSet<&Path> = HashSet::new();
    for placement in placements.iter().filter(|p| p.is_symlink) {
        let dest = placement.destination.as_path();
        if !linked.insert(dest) {
            debug!("Symlink {:?} already created, skipping", dest);
            continue;
        }
        if let Some(file) = copied.keys().find(|copied_dest| copied_dest.starts_with(dest)) {
            warn!(
                "Skipping symlink \"{}\": \"{}\" was already copied there",
                dest.display(),
                file.display()
            );
            summary.skipped += 1;
            continue;
        }

        let text = read_link_text(&root.join(&placement.source))?;
        let target = destination.join(dest);
        if place_symlink(&text, &target, require_empty)? {
            summary.symlinks += 1;
        } else {
            summary.skipped += 1;
        }
    }

    info!(
        "Copied {} files and {} symlinks to {}",
        summary.files,
        summary.symlinks,
        destination.display()
    );
    Ok(summary)
}

/// True for a selected symlink to a directory whose relative target is also
/// part of the selection. Such a link is recreated as a link, like an archive
/// member, and the files below it are not copied on their own.
fn carries_files(root: &Path, scan: &ScanResult, placement: &Placement) -> Result<bool> {
    let source = root.join(&placement.source);
    if !placement.is_symlink || !source.is_dir() {
        return Ok(false);
    }
    let text = read_link_text(&source)?;
    if text.is_absolute() {
        return Ok(false);
    }
    let base = placement.destination.parent().unwrap_or(Path::new(""));
    Ok(normalize(&base.join(&text)).is_some_and(|target| scan.target_exists(&target)))
}

/// Creates `link -> text`, applying the copier's failure policy.
///
/// Returns `Ok(false)` when the link was skipped with a warning.
fn place_symlink(text: &Path, link: &Path, require_empty: bool) -> Result<bool> {
    let err = match create_symlink(text, link) {
        Ok(()) => return Ok(true),
        Err(err) => err,
    };

    let parent = link.parent().unwrap_or(Path::new(""));
    if let Some(blocker) = find_non_dir_ancestor(parent) {
        return Err(anyhow!(StowageError::InvalidDestinationParent {
            path: link.to_path_buf(),
            parent: blocker,
        }));
    }

    let retried = match err.kind() {
        io::ErrorKind::AlreadyExists => {
            if require_empty {
                bail!(StowageError::Symlink(format!(
                    "'{}' already exists",
                    link.display()
                )));
            }
            remove_existing(link)?;
            create_symlink(text, link)
        }
        io::ErrorKind::NotFound => {
            debug!("Creating missing parent {:?} for symlink", parent);
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
            create_symlink(text, link)
        }
        _ => Err(err),
    };

    match retried {
        Ok(()) => Ok(true),
        Err(err) => {
            warn!(
                "Failed to create symlink {:?} -> {:?}: {}",
                link, text, err
            );
            Ok(false)
        }
    }
}
