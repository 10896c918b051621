//! # Stowage Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared building blocks used by the command handlers, kept apart from the
//! command logic (`commands::`), the selection engine (`engine::`) and the
//! core infrastructure (`core::`).
//!
//! ## Architecture
//!
//! - **`archive`**: writing and reading the zip and tar archive families.
//! - **`fs`**: filesystem helpers (directory creation, symlinks, lexical
//!   paths) and the copier that mirrors a selection into a directory.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::{archive, fs};
//!
//! let format = archive::ArchiveFormat::from_archive_path(path)?;
//! fs::io::ensure_dir_exists(destination)?;
//! ```
//!

/// Archive formats, writer and reader.
pub mod archive;
/// Filesystem operations (I/O helpers, links, paths, copying).
pub mod fs;
