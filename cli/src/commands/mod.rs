//! # Stowage Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the top-level commands of the stowage CLI and the
//! helpers they share. Each command module defines its `clap` arguments, a
//! library-style operation taking plain values, and a `handle_*` function
//! wiring the two together for `main.rs`.
//!
//! ## Commands
//!
//! - `compress`: select files with a rule section and write an archive
//! - `decompress`: extract an archive into a directory
//! - `copy`: select files with a rule section and mirror them into a directory
//! - `sections`: list the rule sections of a rule file
//!
use crate::core::config::PackageConfig;
use crate::core::error::Result;
use crate::engine::resolver::resolve;
use crate::engine::selection::{select, ScanResult};
use anyhow::bail;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Packs a rule-based selection into an archive.
pub mod compress;
/// Mirrors a rule-based selection into a directory.
pub mod copy;
/// Extracts an archive.
pub mod decompress;
/// Lists rule sections.
pub mod sections;

/// Resolves `section`, selects the matching files below `root` and logs the
/// scan report.
pub fn scan_section(root: &Path, config: &PackageConfig, section: &str) -> Result<ScanResult> {
    if !root.is_dir() {
        bail!("Package root '{}' is not a directory", root.display());
    }
    let filters = resolve(config, section)?;
    let scan = select(root, &filters)?;
    scan.log_report(section, &filters);
    Ok(scan)
}

/// Expands a leading `~` in a path given on the command line.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::tilde(&raw).into_owned();
    if expanded != raw {
        debug!("Expanded {:?} to {:?}", raw, expanded);
    }
    PathBuf::from(expanded)
}

/// The package root argument, defaulting to the current directory.
pub fn root_or_cwd(root: Option<PathBuf>) -> PathBuf {
    root.map_or_else(|| PathBuf::from("."), |root| expand_path(&root))
}
