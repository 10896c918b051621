//! # Stowage Tree Scanner (`engine::scanner`)
//!
//! File: cli/src/engine/scanner.rs
//!
//! ## Overview
//!
//! Lazily walks a package root with `walkdir`, yielding every file, directory
//! and symlink below it as a root-relative path. Entries are sorted by file name
//! so that a fixed tree always produces the same sequence.
//!
//! Symlinked directories are descended into, while the entry for the link
//! itself still reports `is_symlink`. Broken symlinks and symlink loops are
//! skipped with a warning instead of aborting the walk.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};
use walkdir::WalkDir;

/// One entry found below the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path relative to the scanned root.
    pub path: PathBuf,
    /// Directory, or symlink pointing at a directory.
    pub is_dir: bool,
    pub is_symlink: bool,
}

/// Iterator over the entries below a root. See [`walk`].
pub struct TreeWalker {
    root: PathBuf,
    inner: walkdir::IntoIter,
    files_visited: usize,
    dirs_visited: usize,
}

/// Starts a walk of `root`. Nothing is read until the iterator is polled.
pub fn walk(root: &Path) -> TreeWalker {
    let inner = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();
    TreeWalker {
        root: root.to_path_buf(),
        inner,
        files_visited: 0,
        dirs_visited: 0,
    }
}

impl TreeWalker {
    /// Non-directory entries seen so far, including skipped ones.
    pub fn files_visited(&self) -> usize {
        self.files_visited
    }

    /// Directories seen so far, not counting the root.
    pub fn dirs_visited(&self) -> usize {
        self.dirs_visited
    }
}

impl Iterator for TreeWalker {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    if let Some(ancestor) = err.loop_ancestor() {
                        warn!(
                            "ignoring \"{}\" (symlink loop back to \"{}\")",
                            err.path().unwrap_or(&self.root).display(),
                            ancestor.display()
                        );
                        continue;
                    }
                    if err.depth() > 0
                        && err.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound)
                    {
                        self.files_visited += 1;
                        warn!(
                            "ignoring \"{}\" (broken symlink?)",
                            err.path().unwrap_or(&self.root).display()
                        );
                        continue;
                    }
                    let shown = err.path().unwrap_or(&self.root).display().to_string();
                    return Some(
                        Err(err).with_context(|| format!("Failed to scan '{}'", shown)),
                    );
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let is_dir = entry.file_type().is_dir();
            if is_dir {
                self.dirs_visited += 1;
            } else {
                self.files_visited += 1;
            }

            let path = match entry.path().strip_prefix(&self.root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => entry.path().to_path_buf(),
            };
            trace!("scan: {}", path.display());
            return Some(Ok(WalkEntry {
                path,
                is_dir,
                is_symlink: entry.path_is_symlink(),
            }));
        }
    }
}
