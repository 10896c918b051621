//! # Stowage Sections Command
//!
//! File: cli/src/commands/sections.rs
//!
//! ## Overview
//!
//! Implements `stowage sections [ROOT]`: lists the rule sections of a rule
//! file, one per line, with the sections each one inherits.
//!
//! Example output:
//!
//! ```text
//! assets (inherits common)
//! common
//! release (inherits assets, docs)
//! ```
//!
use crate::commands::{expand_path, root_or_cwd};
use crate::core::config::ConfigSource;
use crate::core::error::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

/// # Sections Arguments (`SectionsArgs`)
#[derive(Parser, Debug)]
pub struct SectionsArgs {
    /// Package root holding stowage.json (defaults to the current directory).
    root: Option<PathBuf>,

    /// Rule file (defaults to <ROOT>/stowage.json).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// One listed section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    pub name: String,
    pub inherit: Vec<String>,
}

/// Sections defined by the rules from `source`, sorted by name.
pub fn sections(source: ConfigSource) -> Result<Vec<SectionInfo>> {
    let config = source.load()?;
    Ok(config
        .sections
        .iter()
        .map(|(name, section)| SectionInfo {
            name: name.clone(),
            inherit: section.inherit.clone(),
        })
        .collect())
}

/// # Handle Sections Command (`handle_sections`)
pub fn handle_sections(args: SectionsArgs) -> Result<()> {
    debug!("Sections args: {:?}", args);
    let root = root_or_cwd(args.root);
    let source = ConfigSource::from_args(&root, args.config.map(|c| expand_path(&c)), false);

    let listed = sections(source)?;
    if listed.is_empty() {
        println!("No sections defined.");
    }
    for section in listed {
        if section.inherit.is_empty() {
            println!("{}", section.name);
        } else {
            println!("{} (inherits {})", section.name, section.inherit.join(", "));
        }
    }
    Ok(())
}
