//! # Stowage Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! This module writes a selection into a single archive file and extracts
//! archives back into a directory tree. Regular files and symbolic links are
//! both reproduced; a symlink is stored with its literal link text.
//!
//! ## Architecture
//!
//! - **`compression`**: [`ArchiveFormat`], the six supported container and
//!   compression combinations, identifiers and suffix detection.
//! - **`writer`**: validation (empty selection, collisions, self-inclusion),
//!   symlink screening and dispatch to a container codec.
//! - **`reader`**: format detection and extraction into a destination.
//! - **`zip`** / **`tar`**: the container codecs, built on the `zip` crate and
//!   on `tar` with `flate2`, `bzip2` and `xz2` streams.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::{reader, writer, ArchiveFormat};
//!
//! let elapsed = writer::write(root, &scan, Path::new("dist/game.tar.xz"), ArchiveFormat::TarXz)?;
//! reader::extract(Path::new("dist/game.tar.xz"), Path::new("/tmp/game"), false)?;
//! ```
//!
use crate::common::fs::io::ensure_dir_exists;
use crate::core::error::Result;
use anyhow::Context;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub mod compression;
pub mod reader;
pub mod tar;
pub mod writer;
pub mod zip;

pub use compression::ArchiveFormat;

/// One member about to be written into an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Where the bytes (or the link) are read from.
    pub source: PathBuf,
    /// Relative path inside the archive.
    pub destination: PathBuf,
    /// Literal link text when the member is a symlink.
    pub link_target: Option<PathBuf>,
}

impl ArchiveEntry {
    pub fn file(source: PathBuf, destination: PathBuf) -> Self {
        ArchiveEntry {
            source,
            destination,
            link_target: None,
        }
    }

    pub fn symlink(source: PathBuf, destination: PathBuf, target: PathBuf) -> Self {
        ArchiveEntry {
            source,
            destination,
            link_target: Some(target),
        }
    }

    pub fn is_symlink(&self) -> bool {
        self.link_target.is_some()
    }

    /// Member name with `/` separators on every platform.
    pub fn member_name(&self) -> String {
        crate::common::fs::paths::slash_path(&self.destination)
    }
}

/// Totals reported after writing or extracting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryCounts {
    pub files: usize,
    pub symlinks: usize,
    pub dirs: usize,
    pub skipped: usize,
}

impl EntryCounts {
    fn record(&mut self, entry: &ArchiveEntry) {
        if entry.is_symlink() {
            self.symlinks += 1;
        } else {
            self.files += 1;
        }
    }
}

/// `link_target` rendered for archive headers, which only carry UTF-8 text.
fn link_text(target: &Path) -> String {
    target.to_string_lossy().into_owned()
}

/// The directory an archive is extracted into, resolved once so every member
/// can be checked against it.
#[derive(Debug)]
pub struct ExtractRoot {
    destination: PathBuf,
    real: PathBuf,
}

impl ExtractRoot {
    /// Creates `destination` if needed and resolves its real path.
    pub fn new(destination: &Path) -> Result<Self> {
        ensure_dir_exists(destination)?;
        let real = fs::canonicalize(destination)
            .with_context(|| format!("Failed to resolve {}", destination.display()))?;
        Ok(ExtractRoot {
            destination: destination.to_path_buf(),
            real,
        })
    }

    /// Where member `relative` lands, or `None` when it would end up outside
    /// the destination. That is the case for names with `..`, a root or a
    /// drive prefix, and for names whose parent directory leads out through a
    /// symlink already present in the destination.
    pub fn target(&self, relative: &Path) -> Result<Option<PathBuf>> {
        let lexical = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if !lexical {
            return Ok(None);
        }
        let target = self.destination.join(relative);

        // Deepest ancestor that exists, following symlinks.
        let Some(existing) = target.ancestors().skip(1).find(|dir| dir.exists()) else {
            return Ok(None);
        };
        let real = fs::canonicalize(existing)
            .with_context(|| format!("Failed to resolve {}", existing.display()))?;
        Ok(real.starts_with(&self.real).then_some(target))
    }
}
