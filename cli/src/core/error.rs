//! # Stowage Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout stowage. Every failure the
//! selection engine or the archive layer can report is a variant of
//! [`StowageError`]; the variants are grouped into broad categories
//! ([`ErrorKind`]) so callers can react to a class of problem without matching
//! every variant.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `StowageError`: a custom error enum using `thiserror` for specific error types
//! - `Result<T>`: a type alias for `anyhow::Result<T>` for flexible error handling
//!
//! Errors are raised as `anyhow!(StowageError::...)` so that I/O context can be
//! layered on top with `.with_context(..)`, and recovered with
//! `err.downcast_ref::<StowageError>()`.
//!
//! ## Examples
//!
//! ```rust
//! if scan_result.is_empty() {
//!     return Err(anyhow!(StowageError::EmptySelection));
//! }
//!
//! match result {
//!     Err(e) if e.downcast_ref::<StowageError>().map_or(false, |se| se.kind() == ErrorKind::Destination) => {
//!         println!("Pick another destination or pass --force");
//!     }
//!     other => other?,
//! }
//! ```
//!
use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of nested `inherit` levels, counting the requested section.
pub const MAX_INHERIT_DEPTH: usize = 10;

/// Broad failure categories reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed configuration, unknown section, bad pattern.
    Config,
    /// Inheritance cycle or inheritance nested too deeply.
    Recursion,
    /// Empty match set, destination collision, self-inclusion.
    Selection,
    /// Unknown compression identifier or archive extension.
    Compression,
    /// Symlink that cannot be reproduced.
    Symlink,
    /// Destination that cannot be written to.
    Destination,
}

/// Custom error type for stowage.
#[derive(Error, Debug)]
pub enum StowageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Section '{name}' not found")]
    SectionNotFound { name: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Too many inherit levels resolving '{section}' (limit is {limit})")]
    RecursionLimitExceeded { section: String, limit: usize },

    #[error("Section '{section}' inherits itself (cycle through {path})")]
    InheritCycle { section: String, path: String },

    #[error("No files matched the rules")]
    EmptySelection,

    #[error("Name collision: '{first}' and '{second}' both map to '{destination}'")]
    NameCollision {
        destination: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Archive '{archive}' would include itself (fix the rules or delete the archive first)")]
    SelfInclusion { archive: PathBuf },

    #[error("Unknown compression '{0}' (expected zip, lzma, bz2, tar.gz, tar.bz2 or tar.xz)")]
    UnsupportedCompression(String),

    #[error("Cannot decompress '{0}': unrecognized archive extension")]
    UnsupportedFormat(PathBuf),

    #[error("Symlink error: {0}")]
    Symlink(String),

    #[error("Destination '{0}' already exists (see --force)")]
    DestinationExists(PathBuf),

    #[error("Destination directory '{0}' is not empty (see --force)")]
    NonEmptyDestination(PathBuf),

    #[error("Cannot create '{path}': parent '{parent}' exists but is not a directory")]
    InvalidDestinationParent { path: PathBuf, parent: PathBuf },
}

impl StowageError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StowageError::Config(_)
            | StowageError::SectionNotFound { .. }
            | StowageError::InvalidPattern { .. } => ErrorKind::Config,
            StowageError::RecursionLimitExceeded { .. } | StowageError::InheritCycle { .. } => {
                ErrorKind::Recursion
            }
            StowageError::EmptySelection
            | StowageError::NameCollision { .. }
            | StowageError::SelfInclusion { .. } => ErrorKind::Selection,
            StowageError::UnsupportedCompression(_) | StowageError::UnsupportedFormat(_) => {
                ErrorKind::Compression
            }
            StowageError::Symlink(_) => ErrorKind::Symlink,
            StowageError::DestinationExists(_)
            | StowageError::NonEmptyDestination(_)
            | StowageError::InvalidDestinationParent { .. } => ErrorKind::Destination,
        }
    }
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

/// Returns the [`StowageError`] carried by `err`, if any.
pub fn stowage_error(err: &anyhow::Error) -> Option<&StowageError> {
    err.downcast_ref::<StowageError>()
}
