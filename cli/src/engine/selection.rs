//! # Stowage Selection (`engine::selection`)
//!
//! File: cli/src/engine/selection.rs
//!
//! ## Overview
//!
//! Runs the scanner over a package root and keeps every file (and every
//! symlink, including symlinks to directories) that an include rule selects
//! and no exclude rule rejects. Directories themselves are never selected;
//! they only appear in the output as parents of selected files.
//!
//! For each candidate:
//! 1. try `include_files`, then `include_dirs`; no hit means skip,
//! 2. `exclude_dirs` (containing directory, then ancestors) and
//!    `exclude_files` are tested against the source path and override the include,
//! 3. the survivor is recorded under the destination tag of its include hit.
//!
//! The result is a [`ScanResult`], from which destination paths are derived.
//!
use crate::common::fs::paths::{normalize, slash_path};
use crate::core::error::{Result, StowageError};
use crate::engine::matcher::{
    match_dir, match_file, match_include_dir, match_include_file, DestinationTag,
};
use crate::engine::resolver::Filters;
use crate::engine::scanner::walk;
use anyhow::anyhow;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Placements listed at info level by [`ScanResult::log_report`].
pub const REPORT_PREVIEW: usize = 20;

/// A source kept by the selection, still relative to the root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Selected {
    pub source: PathBuf,
    /// Literal prefix shared with the winning glob, used by `@@@` tags.
    pub prefix_len: usize,
    pub is_symlink: bool,
}

/// A source together with its computed output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub is_symlink: bool,
}

/// Scanner counters collected while selecting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanStats {
    pub files: usize,
    pub dirs: usize,
    pub elapsed: Duration,
}

/// The outcome of one selection run.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    groups: BTreeMap<DestinationTag, Vec<Selected>>,
    matches: usize,
    stats: ScanStats,
}

impl ScanResult {
    fn add(&mut self, tag: &DestinationTag, selected: Selected) {
        self.groups.entry(tag.clone()).or_default().push(selected);
        self.matches += 1;
    }

    fn sort(&mut self) {
        for sources in self.groups.values_mut() {
            sources.sort();
        }
    }

    /// Number of selected sources.
    pub fn len(&self) -> usize {
        self.matches
    }

    pub fn is_empty(&self) -> bool {
        self.matches == 0
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Every selected source with its destination, grouped by tag and sorted
    /// by source within each group.
    pub fn pairs(&self) -> Vec<Placement> {
        self.groups
            .iter()
            .flat_map(|(tag, sources)| {
                sources.iter().map(move |selected| Placement {
                    source: selected.source.clone(),
                    destination: tag.destination(&selected.source, selected.prefix_len),
                    is_symlink: selected.is_symlink,
                })
            })
            .collect()
    }

    /// True when `path`, lexically normalized, is a destination or a
    /// directory containing one.
    pub fn target_exists(&self, path: &Path) -> bool {
        let Some(target) = normalize(path) else {
            return false;
        };
        if target.as_os_str().is_empty() {
            return !self.is_empty();
        }
        self.pairs()
            .iter()
            .any(|placement| placement.destination.starts_with(&target))
    }

    /// True when `path` is exactly one of the destinations.
    pub fn has_destination(&self, path: &Path) -> bool {
        self.pairs()
            .iter()
            .any(|placement| placement.destination == path)
    }

    /// True when `path` is one of the selected sources.
    pub fn contains_source(&self, path: &Path) -> bool {
        self.groups
            .values()
            .flatten()
            .any(|selected| selected.source == path)
    }

    /// Logs the resolved filters, the first [`REPORT_PREVIEW`] placements
    /// (all of them at debug level) and the scan counters.
    pub fn log_report(&self, section: &str, filters: &Filters) {
        filters.log_summary(section);
        info!("Matches: {}", self.matches);
        for (index, placement) in self.pairs().iter().enumerate() {
            if index < REPORT_PREVIEW {
                info!(
                    "  {} -as- {}",
                    placement.source.display(),
                    placement.destination.display()
                );
            } else {
                debug!(
                    "  {} -as- {}",
                    placement.source.display(),
                    placement.destination.display()
                );
            }
        }
        if self.matches > REPORT_PREVIEW {
            info!("  ... {} more (use -v to list all)", self.matches - REPORT_PREVIEW);
        }
        let stats = self.stats();
        info!(
            "Scanned {} files and {} dirs in {:.2?}",
            stats.files, stats.dirs, stats.elapsed
        );
    }

    /// Fails with `NameCollision` when two sources share a destination.
    pub fn check_collisions(&self) -> Result<()> {
        let mut seen: HashMap<PathBuf, PathBuf> = HashMap::new();
        for placement in self.pairs() {
            if let Some(first) = seen.get(&placement.destination) {
                return Err(anyhow!(StowageError::NameCollision {
                    destination: placement.destination,
                    first: first.clone(),
                    second: placement.source,
                }));
            }
            seen.insert(placement.destination, placement.source);
        }
        Ok(())
    }
}

/// Selects the files below `root` that `filters` keep.
pub fn select(root: &Path, filters: &Filters) -> Result<ScanResult> {
    let started = Instant::now();
    let mut result = ScanResult::default();
    let mut walker = walk(root);

    for entry in walker.by_ref() {
        let entry = entry?;
        if entry.is_dir && !entry.is_symlink {
            continue;
        }
        let candidate = slash_path(&entry.path);
        trace!("Checking \"{}\"", candidate);

        let Some(hit) = match_include_file(&filters.include_files, &candidate)
            .or_else(|| match_include_dir(&filters.include_dirs, &candidate))
        else {
            continue;
        };

        if let Some((pattern, dir)) = match_dir(&filters.exclude_dirs, &candidate) {
            debug!(
                "exclude \"{}\": dir \"{}\" matches \"{}\"",
                candidate,
                dir,
                pattern.text()
            );
            continue;
        }
        if let Some(pattern) = match_file(&filters.exclude_files, &candidate) {
            debug!("exclude \"{}\": matches \"{}\"", candidate, pattern.text());
            continue;
        }

        debug!("Adding \"{}\" (include \"{}\")", candidate, hit.pattern.text());
        result.add(
            hit.tag,
            Selected {
                source: entry.path,
                prefix_len: hit.prefix_len,
                is_symlink: entry.is_symlink,
            },
        );
    }

    result.sort();
    result.stats = ScanStats {
        files: walker.files_visited(),
        dirs: walker.dirs_visited(),
        elapsed: started.elapsed(),
    };
    Ok(result)
}
