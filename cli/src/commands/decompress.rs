//! # Stowage Decompress Command
//!
//! File: cli/src/commands/decompress.rs
//!
//! ## Overview
//!
//! Implements `stowage decompress ARCHIVE DESTINATION`. The format is picked
//! from the archive's suffix. An existing destination is refused unless
//! `--force` is given, in which case files and symlinks in the way are
//! replaced.
//!
//! ```bash
//! stowage decompress dist/tetra.tar.xz /tmp/tetra
//! stowage decompress dist/tetra.zip /tmp/tetra --force
//! ```
//!
use crate::commands::expand_path;
use crate::common::archive::{reader, EntryCounts};
use crate::core::error::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::debug;

/// # Decompress Arguments (`DecompressArgs`)
#[derive(Parser, Debug)]
pub struct DecompressArgs {
    /// Archive to extract (.zip, .lzma, .bz2, .tar.gz, .tar.bz2 or .tar.xz).
    archive: PathBuf,

    /// Directory to extract into.
    destination: PathBuf,

    /// Extract into an existing destination, replacing files in the way.
    #[arg(short, long)]
    force: bool,
}

/// Extracts `archive` into `destination`. See [`reader::extract`].
pub fn decompress(archive: &Path, destination: &Path, force: bool) -> Result<EntryCounts> {
    reader::extract(archive, destination, force)
}

/// # Handle Decompress Command (`handle_decompress`)
pub fn handle_decompress(args: DecompressArgs) -> Result<()> {
    debug!("Decompress args: {:?}", args);
    let archive = expand_path(&args.archive);
    let destination = expand_path(&args.destination);

    let counts = decompress(&archive, &destination, args.force)?;
    println!(
        "Extracted {} files and {} symlinks to {}",
        counts.files,
        counts.symlinks,
        destination.display()
    );
    if counts.skipped > 0 {
        println!("Skipped {} unsafe or unusable entries (see warnings)", counts.skipped);
    }
    Ok(())
}
