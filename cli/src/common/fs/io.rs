//! # Stowage Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! This module centralizes the small filesystem operations the archive reader,
//! the archive writer and the copier have in common:
//! - **`ensure_dir_exists`**: `mkdir -p` that refuses to treat a file as a directory.
//! - **`ensure_parent_dir`**: the same for the parent of a file about to be written.
//! - **`dir_is_empty`**: whether a destination directory may be used without `--force`.
//! - **`remove_existing`**: clears a file or symlink standing where an entry will be written.
//! - **`find_non_dir_ancestor`**: the first ancestor of a path that exists but is not a directory.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! io::ensure_parent_dir(&target)?;
//! io::remove_existing(&target)?;
//! std::fs::copy(&source, &target)?;
//! ```
//!
use crate::core::error::{Result, StowageError};
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Ensures that a directory exists at the specified path.
///
/// If the path does not exist, it is created along with any missing parents.
///
/// # Errors
///
/// Returns an `Err` if:
/// - The path exists but is not a directory (`InvalidDestinationParent`).
/// - Creating the directory fails (e.g., due to permissions).
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.is_dir() {
        trace!("Directory already exists: {:?}", path);
        return Ok(());
    }
    if let Some(blocker) = find_non_dir_ancestor(path) {
        anyhow::bail!(StowageError::InvalidDestinationParent {
            path: path.to_path_buf(),
            parent: blocker,
        });
    }
    fs::create_dir_all(path).with_context(|| format!("Failed to create directory {:?}", path))?;
    debug!("Created directory: {:?}", path);
    Ok(())
}

/// Ensures the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir_exists(parent),
        _ => Ok(()),
    }
}

/// True when `path` is a directory without entries.
pub fn dir_is_empty(path: &Path) -> Result<bool> {
    let mut entries =
        fs::read_dir(path).with_context(|| format!("Failed to read directory {:?}", path))?;
    Ok(entries.next().is_none())
}

/// Removes the file or symlink at `path`, if any. Directories are left alone.
pub fn remove_existing(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if !meta.is_dir() => {
            debug!("Removing existing {:?}", path);
            fs::remove_file(path).with_context(|| format!("Failed to remove {:?}", path))
        }
        _ => Ok(()),
    }
}

/// Walks up from `path` (inclusive) and returns the first existing entry
/// that is not a directory.
pub fn find_non_dir_ancestor(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .filter(|ancestor| !ancestor.as_os_str().is_empty())
        .find(|ancestor| {
            fs::metadata(ancestor).is_ok_and(|meta| !meta.is_dir())
        })
        .map(Path::to_path_buf)
}
