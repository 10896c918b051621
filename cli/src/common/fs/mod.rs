//! # Stowage Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! This module groups the filesystem helpers used by the selection engine, the
//! archive layer and the `copy` command.
//!
//! ## Architecture
//!
//! - **`copy`**: mirrors a selection into a destination directory (`stowage copy`).
//! - **`io`**: directory creation, emptiness checks and removal of stale entries.
//! - **`links`**: symlink creation that keeps link text verbatim.
//! - **`paths`**: lexical path helpers (`/`-joined names, normalization).
//!
//! Functions are imported from their submodule, e.g.
//! `use crate::common::fs::io::ensure_parent_dir;`.
//!
pub mod copy;
pub mod io;
pub mod links;
pub mod paths;
