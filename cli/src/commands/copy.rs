//! # Stowage Copy Command
//!
//! File: cli/src/commands/copy.rs
//!
//! ## Overview
//!
//! Implements `stowage copy [ROOT] DESTINATION`: the same selection as
//! `compress`, mirrored into a directory instead of an archive. Without
//! `--force` the destination must be empty (or missing); this is checked
//! before anything is scanned.
//!
//! ```bash
//! stowage copy /tmp/staging -s release
//! stowage copy ~/games/tetra /tmp/staging --all --force
//! ```
//!
use crate::commands::{expand_path, root_or_cwd};
use crate::common::fs::copy::{copy as copy_tree, CopySummary};
use crate::core::config::{ConfigSource, CATCH_ALL_SECTION};
use crate::core::error::Result;
use crate::engine::resolver::resolve;
use anyhow::bail;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::debug;

/// # Copy Arguments (`CopyArgs`)
#[derive(Parser, Debug)]
pub struct CopyArgs {
    /// [ROOT] DESTINATION. ROOT defaults to the current directory.
    #[arg(value_names = ["ROOT", "DESTINATION"], num_args = 1..=2, required = true)]
    paths: Vec<PathBuf>,

    /// Rule section to copy.
    #[arg(short, long, required_unless_present = "all")]
    section: Option<String>,

    /// Rule file (defaults to <ROOT>/stowage.json).
    #[arg(short, long, conflicts_with = "all")]
    config: Option<PathBuf>,

    /// Copy into a non-empty destination, replacing existing files and links.
    #[arg(short, long)]
    force: bool,

    /// Use the built-in rules selecting every file (section "everything").
    #[arg(long)]
    all: bool,
}

impl CopyArgs {
    /// Splits the positional paths into root and destination.
    fn root_and_destination(&self) -> Result<(PathBuf, PathBuf)> {
        match self.paths.as_slice() {
            [destination] => Ok((root_or_cwd(None), expand_path(destination))),
            [root, destination] => Ok((expand_path(root), expand_path(destination))),
            _ => bail!("Expected [ROOT] DESTINATION"),
        }
    }
}

/// # Copy (`copy`)
///
/// Selects files below `root` with `section` of the rules from `source` and
/// copies them under `destination`. Without `force` the destination must be
/// empty or missing.
pub fn copy(
    root: &Path,
    source: ConfigSource,
    section: &str,
    destination: &Path,
    force: bool,
) -> Result<CopySummary> {
    let config = source.load()?;
    let filters = resolve(&config, section)?;
    let (scan, summary) = copy_tree(root, &filters, destination, !force)?;
    scan.log_report(section, &filters);
    Ok(summary)
}

/// # Handle Copy Command (`handle_copy`)
pub fn handle_copy(args: CopyArgs) -> Result<()> {
    debug!("Copy args: {:?}", args);
    let (root, destination) = args.root_and_destination()?;
    let source = ConfigSource::from_args(&root, args.config.map(|c| expand_path(&c)), args.all);
    let section = args.section.as_deref().unwrap_or(CATCH_ALL_SECTION);

    let summary = copy(&root, source, section, &destination, args.force)?;
    println!(
        "Copied {} files and {} symlinks to {}",
        summary.files,
        summary.symlinks,
        destination.display()
    );
    if summary.skipped > 0 {
        println!("Skipped {} symlinks (see warnings)", summary.skipped);
    }
    Ok(())
}
