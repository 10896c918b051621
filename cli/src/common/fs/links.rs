//! # Stowage Filesystem Link Operations
//!
//! File: cli/src/common/fs/links.rs
//!
//! ## Overview
//!
//! Cross-platform helpers for reproducing symbolic links. Link targets are
//! always written back verbatim, exactly as they were read from the source
//! tree or the archive; nothing here resolves or canonicalizes them.
//!
//! ## Architecture
//!
//! - **`create_symlink`**: platform-specific link creation. Windows needs to
//!   know whether the target is a directory, which is decided by resolving the
//!   target relative to the link's own directory.
//! - **`read_link_text`**: the literal target of an existing link.
//! - **`replace_placeholder`**: turns a regular file whose contents are a link
//!   target into that link. The archive reader extracts symlink entries this way.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Creates a symbolic link at `link` pointing to `target`.
///
/// # Arguments
///
/// * `target` - The link text, relative to the link's directory or absolute.
/// * `link` - Where the link is created. Its parent must exist.
///
/// # Errors
///
/// Returns the raw `io::Error` so callers can react to `AlreadyExists` or
/// `NotFound` (missing parent) individually.
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }
    #[cfg(windows)]
    {
        let resolved = link
            .parent()
            .map_or_else(|| target.to_path_buf(), |parent| parent.join(target));
        if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (target, link);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "symlinks are not supported on this platform",
        ))
    }
}

/// The literal target text of the symlink at `link`.
pub fn read_link_text(link: &Path) -> Result<PathBuf> {
    fs::read_link(link).with_context(|| format!("Failed to read symlink {:?}", link))
}

/// Replaces the placeholder file at `path`, whose contents are a link target,
/// with a symlink to that target. Returns the target.
pub fn replace_placeholder(path: &Path) -> Result<PathBuf> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read symlink placeholder {:?}", path))?;
    let target = PathBuf::from(text);
    fs::remove_file(path)
        .with_context(|| format!("Failed to remove symlink placeholder {:?}", path))?;
    create_symlink(&target, path)
        .with_context(|| format!("Failed to create symlink {:?} -> {:?}", path, target))?;
    debug!("Created symlink: {:?} -> {:?}", path, target);
    Ok(target)
}
