//! # Stowage Compress Command
//!
//! File: cli/src/commands/compress.rs
//!
//! ## Overview
//!
//! Implements `stowage compress`: resolve a rule section, select the matching
//! files below the package root and write them into one archive.
//!
//! ## Examples
//!
//! ```bash
//! # Package section "release" of ./stowage.json into ./<root name>.zip
//! stowage compress -s release
//!
//! # Explicit root, rule file, archive name and format
//! stowage compress ~/games/tetra -c rules.toml -s assets -a dist/tetra -z tar.xz
//!
//! # Show what would be packaged, write nothing
//! stowage compress --all --dry-run
//! ```
//!
//! The archive suffix (`.zip`, `.tar.xz`, ...) is appended to the archive path
//! unless it is already there. The format comes from `--compression`, else
//! from the rule file's `config.compression`, else `zip`.
//!
use crate::commands::{expand_path, root_or_cwd, scan_section};
use crate::common::archive::{writer, ArchiveFormat};
use crate::common::fs::paths::absolute;
use crate::core::config::{ConfigSource, CATCH_ALL_SECTION};
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// # Compress Arguments (`CompressArgs`)
#[derive(Parser, Debug)]
pub struct CompressArgs {
    /// Package root the rules are applied to (defaults to the current directory).
    root: Option<PathBuf>,

    /// Rule section to package.
    #[arg(short, long, required_unless_present = "all")]
    section: Option<String>,

    /// Rule file (defaults to <ROOT>/stowage.json).
    #[arg(short, long, conflicts_with = "all")]
    config: Option<PathBuf>,

    /// Archive path without suffix (defaults to ./<root directory name>).
    #[arg(short, long)]
    archive: Option<PathBuf>,

    /// Scan and report, but do not write the archive.
    #[arg(long)]
    dry_run: bool,

    /// Compression: zip, lzma, bz2, tar.gz, tar.bz2 or tar.xz.
    #[arg(short = 'z', long)]
    compression: Option<String>,

    /// Use the built-in rules selecting every file (section "everything").
    #[arg(long)]
    all: bool,
}

/// Outcome of [`compress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressSummary {
    /// Archive path including its suffix.
    pub archive: PathBuf,
    pub format: ArchiveFormat,
    pub matches: usize,
    /// Time spent writing; `None` on a dry run.
    pub elapsed: Option<Duration>,
}

/// # Compress (`compress`)
///
/// Selects files below `root` with `section` of the rules from `source` and
/// writes them to an archive.
///
/// ## Arguments
///
/// * `root` - Package root.
/// * `source` - Rule file or inline rules.
/// * `section` - Rule section to apply.
/// * `archive` - Archive path, suffix optional. Defaults to `<cwd>/<root name>`.
/// * `dry_run` - Stop after the scan report.
/// * `compression` - Format identifier overriding the rule file's setting.
///
/// ## Errors
///
/// Configuration, recursion, selection and compression errors as raised by the
/// resolver, the selection and the archive writer.
pub fn compress(
    root: &Path,
    source: ConfigSource,
    section: &str,
    archive: Option<&Path>,
    dry_run: bool,
    compression: Option<&str>,
) -> Result<CompressSummary> {
    let config = source.load()?;
    let format = match compression {
        Some(identifier) => identifier.parse()?,
        None => config.default_format()?,
    };
    let base = match archive {
        Some(path) => path.to_path_buf(),
        None => default_archive_base(root)?,
    };
    let archive = format.append_suffix(&base);
    debug!("Archive {} (format {})", archive.display(), format);

    let scan = scan_section(root, &config, section)?;

    let elapsed = if dry_run {
        info!("Dry run: {} not written", archive.display());
        None
    } else {
        Some(writer::write(root, &scan, &archive, format)?)
    };

    Ok(CompressSummary {
        archive,
        format,
        matches: scan.len(),
        elapsed,
    })
}

/// `<cwd>/<name of root>`, the archive path used without `--archive`.
fn default_archive_base(root: &Path) -> Result<PathBuf> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let name = absolute(root)?
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "archive".into());
    Ok(cwd.join(name))
}

/// # Handle Compress Command (`handle_compress`)
pub fn handle_compress(args: CompressArgs) -> Result<()> {
    debug!("Compress args: {:?}", args);
    let root = root_or_cwd(args.root);
    let source = ConfigSource::from_args(&root, args.config.map(|c| expand_path(&c)), args.all);
    let section = args.section.as_deref().unwrap_or(CATCH_ALL_SECTION);
    let archive = args.archive.map(|a| expand_path(&a));

    let summary = compress(
        &root,
        source,
        section,
        archive.as_deref(),
        args.dry_run,
        args.compression.as_deref(),
    )?;

    match summary.elapsed {
        Some(elapsed) => println!(
            "Wrote {} files to {} ({}) in {:.2?}",
            summary.matches,
            summary.archive.display(),
            summary.format,
            elapsed
        ),
        None => println!(
            "Dry run: {} files would be written to {}",
            summary.matches,
            summary.archive.display()
        ),
    }
    Ok(())
}
