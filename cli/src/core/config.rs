//! # Stowage Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads the packaging rule file. A rule file is a single document
//! with one reserved key, `config`, holding global settings, and any number of
//! other keys, each naming a rule section:
//!
//! ```json
//! {
//!     "config": { "compression": "tar.gz" },
//!     "common": { "exclude_dirs": ["**/.git"] },
//!     "assets": {
//!         "inherit": ["common"],
//!         "include_files": ["README.md", "@@@textures", "art/textures/**"],
//!         "exclude_files": ["!\\.psd$"]
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - Rule files are JSON (`.json`, the default `stowage.json`) or TOML (`.toml`),
//!   picked by extension.
//! - Sections are plain text here; pattern classification and compilation happen
//!   in `engine::resolver` when a section is resolved.
//! - Unknown keys inside a section are rejected so that typos such as
//!   `include_file` do not silently select nothing.
//! - [`ConfigSource`] lets callers hand over either a file path or an already
//!   built [`PackageConfig`].
//!
use crate::common::archive::ArchiveFormat;
use crate::core::error::{Result, StowageError};
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rule file looked up in the package root when no `--config` is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "stowage.json";

/// Name of the only section in [`PackageConfig::catch_all`].
pub const CATCH_ALL_SECTION: &str = "everything";

/// A complete rule file.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct PackageConfig {
    /// Global settings, stored under the reserved `config` key.
    #[serde(default, rename = "config")]
    pub settings: Settings,
    /// Every other key is a rule section.
    #[serde(flatten)]
    pub sections: BTreeMap<String, RuleSection>,
}

/// Global settings (`"config": { ... }`).
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Default compression identifier, see [`ArchiveFormat`].
    #[serde(default = "default_compression")]
    pub compression: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            compression: default_compression(),
        }
    }
}

fn default_compression() -> String {
    "zip".to_string()
}

/// One named rule section.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuleSection {
    /// File patterns, optionally interleaved with `@`, `@@` and `@@@` destination tags.
    #[serde(default)]
    pub include_files: Vec<String>,
    #[serde(default)]
    pub include_dirs: Vec<String>,
    #[serde(default)]
    pub exclude_files: Vec<String>,
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
    /// Sections whose patterns are appended after this section's own.
    #[serde(default)]
    pub inherit: Vec<String>,
}

impl PackageConfig {
    /// Built-in rule set selecting every file below the root.
    pub fn catch_all() -> Self {
        let mut sections = BTreeMap::new();
        sections.insert(
            CATCH_ALL_SECTION.to_string(),
            RuleSection {
                include_files: vec!["**".to_string()],
                ..Default::default()
            },
        );
        PackageConfig {
            settings: Settings::default(),
            sections,
        }
    }

    /// Names of all rule sections, sorted.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.keys().map(String::as_str).collect()
    }

    /// Compression format configured in the `config` block.
    pub fn default_format(&self) -> Result<ArchiveFormat> {
        self.settings.compression.parse()
    }
}

/// Where a [`PackageConfig`] comes from: a rule file or an in-memory value.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    File(PathBuf),
    Inline(PackageConfig),
}

impl ConfigSource {
    /// Picks the explicit `--config` path, the built-in catch-all rules, or
    /// `<root>/stowage.json`, in that order.
    pub fn from_args(root: &Path, config: Option<PathBuf>, catch_all: bool) -> Self {
        match config {
            Some(path) => ConfigSource::File(path),
            None if catch_all => ConfigSource::Inline(PackageConfig::catch_all()),
            None => ConfigSource::File(root.join(DEFAULT_CONFIG_FILENAME)),
        }
    }

    /// Produces the configuration, reading the file if needed.
    pub fn load(self) -> Result<PackageConfig> {
        match self {
            ConfigSource::File(path) => {
                info!("Loading configuration file {}", path.display());
                load_config_from_path(&path)
            }
            ConfigSource::Inline(config) => {
                debug!("Using inline configuration");
                Ok(config)
            }
        }
    }
}

/// Reads and parses a rule file, choosing the parser from the extension.
pub fn load_config_from_path(path: &Path) -> Result<PackageConfig> {
    if !path.is_file() {
        return Err(anyhow!(StowageError::Config(format!(
            "Configuration file '{}' not found",
            path.display()
        ))));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let config = if is_toml {
        parse_toml(&content)
    } else {
        parse_json(&content)
    }
    .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;
    debug!(
        "Loaded sections {:?} from {}",
        config.section_names(),
        path.display()
    );
    Ok(config)
}

/// Parses a JSON rule document.
pub fn parse_json(content: &str) -> Result<PackageConfig> {
    serde_json::from_str(content).map_err(|e| anyhow!(StowageError::Config(e.to_string())))
}

/// Parses a TOML rule document.
pub fn parse_toml(content: &str) -> Result<PackageConfig> {
    toml::from_str(content).map_err(|e| anyhow!(StowageError::Config(e.to_string())))
}
