//! # Stowage Rule Resolver (`engine::resolver`)
//!
//! File: cli/src/engine/resolver.rs
//!
//! ## Overview
//!
//! Flattens a named rule section and everything it inherits into one
//! [`Filters`] value. The section's own patterns always come first, followed by
//! each inherited section (recursively) in the order listed in `inherit`. Since
//! matching is first-match-wins, a section's own patterns take priority over the
//! ones it inherits.
//!
//! ## Recursion
//!
//! The walk carries its depth and the current inheritance chain explicitly:
//! - more than [`MAX_INHERIT_DEPTH`] levels is `RecursionLimitExceeded`,
//! - a section appearing twice on the chain is `InheritCycle`,
//! - a section reached a second time through another branch (diamond) is
//!   merged only once.
//!
use crate::core::config::{PackageConfig, RuleSection};
use crate::core::error::{Result, StowageError, MAX_INHERIT_DEPTH};
use crate::engine::matcher::{DestinationTag, IncludeRule, Pattern};
use anyhow::anyhow;
use std::collections::HashSet;
use tracing::{debug, info};

/// The effective, compiled pattern lists of one resolved section.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub include_files: Vec<IncludeRule>,
    pub include_dirs: Vec<Pattern>,
    pub exclude_files: Vec<Pattern>,
    pub exclude_dirs: Vec<Pattern>,
}

impl Filters {
    /// Appends the four pattern lists of `section`. Destination tags only
    /// apply within the section's own `include_files` list.
    fn append_section(&mut self, section: &RuleSection) -> Result<()> {
        let mut tag = DestinationTag::Identity;
        for entry in &section.include_files {
            if let Some(marker) = DestinationTag::parse_marker(entry) {
                tag = marker;
                continue;
            }
            self.include_files.push(IncludeRule {
                tag: tag.clone(),
                pattern: Pattern::parse(entry)?,
            });
        }
        self.include_dirs.extend(parse_all(&section.include_dirs)?);
        self.exclude_files.extend(parse_all(&section.exclude_files)?);
        self.exclude_dirs.extend(parse_all(&section.exclude_dirs)?);
        Ok(())
    }

    /// Logs the resolved lists, one line per list.
    pub fn log_summary(&self, section: &str) {
        info!("Parsing package list for section \"{}\"", section);
        info!(
            "  Include files: {:?}",
            self.include_files
                .iter()
                .map(|rule| (rule.tag.clone(), rule.pattern.text()))
                .collect::<Vec<_>>()
        );
        info!("  Include dirs: {:?}", texts(&self.include_dirs));
        info!("  Exclude files: {:?}", texts(&self.exclude_files));
        info!("  Exclude dirs: {:?}", texts(&self.exclude_dirs));
        let regexes = self
            .include_files
            .iter()
            .map(|rule| &rule.pattern)
            .chain(&self.include_dirs)
            .chain(&self.exclude_files)
            .chain(&self.exclude_dirs)
            .filter(|pattern| pattern.is_regex())
            .count();
        debug!("  {} regular expression patterns", regexes);
    }
}

/// Pattern texts of `patterns`, in order.
pub fn texts(patterns: &[Pattern]) -> Vec<&str> {
    patterns.iter().map(Pattern::text).collect()
}

fn parse_all(raw: &[String]) -> Result<Vec<Pattern>> {
    raw.iter().map(|p| Pattern::parse(p)).collect()
}

/// Resolves `section` and its transitive `inherit` list into [`Filters`].
pub fn resolve(config: &PackageConfig, section: &str) -> Result<Filters> {
    let mut filters = Filters::default();
    let mut chain = Vec::new();
    let mut merged = HashSet::new();
    resolve_into(config, section, 1, &mut chain, &mut merged, &mut filters)?;
    Ok(filters)
}

fn resolve_into(
    config: &PackageConfig,
    name: &str,
    depth: usize,
    chain: &mut Vec<String>,
    merged: &mut HashSet<String>,
    filters: &mut Filters,
) -> Result<()> {
    if chain.iter().any(|seen| seen == name) {
        let path = chain
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(anyhow!(StowageError::InheritCycle {
            section: name.to_string(),
            path,
        }));
    }
    if depth > MAX_INHERIT_DEPTH {
        return Err(anyhow!(StowageError::RecursionLimitExceeded {
            section: name.to_string(),
            limit: MAX_INHERIT_DEPTH,
        }));
    }

    let section = config.sections.get(name).ok_or_else(|| {
        for available in config.section_names() {
            info!(" found section \"{}\"", available);
        }
        anyhow!(StowageError::SectionNotFound {
            name: name.to_string(),
        })
    })?;

    if !merged.insert(name.to_string()) {
        debug!("Section \"{}\" already merged, skipping", name);
        return Ok(());
    }
    filters.append_section(section)?;

    chain.push(name.to_string());
    for parent in &section.inherit {
        debug!("Adding inherited \"{}\" (depth {})", parent, depth + 1);
        resolve_into(config, parent, depth + 1, chain, merged, filters)?;
    }
    chain.pop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::parse_json;
    use crate::core::error::{stowage_error, ErrorKind};
    use crate::engine::matcher::match_include_file;
    use std::collections::BTreeMap;

    fn include_texts(filters: &Filters) -> Vec<&str> {
        filters
            .include_files
            .iter()
            .map(|rule| rule.pattern.text())
            .collect()
    }

    /// `s1` inherits `s2` inherits ... `s{levels}`.
    fn chain_config(levels: usize) -> PackageConfig {
        let mut sections = BTreeMap::new();
        for level in 1..=levels {
            let inherit = if level < levels {
                vec![format!("s{}", level + 1)]
            } else {
                Vec::new()
            };
            sections.insert(
                format!("s{}", level),
                RuleSection {
                    include_files: vec![format!("level{}/**", level)],
                    inherit,
                    ..Default::default()
                },
            );
        }
        PackageConfig {
            sections,
            ..Default::default()
        }
    }

    #[test]
    fn test_section_without_inherit_keeps_declared_order() {
        let config = parse_json(
            r#"{ "a": {
                "include_files": ["z.txt", "a.txt", "!m"],
                "include_dirs": ["docs", "art"],
                "exclude_files": ["*.bak", "*.tmp"],
                "exclude_dirs": [".git", "target"]
            } }"#,
        )
        .unwrap();
        let filters = resolve(&config, "a").unwrap();
        assert_eq!(include_texts(&filters), vec!["z.txt", "a.txt", "!m"]);
        assert_eq!(texts(&filters.include_dirs), vec!["docs", "art"]);
        assert_eq!(texts(&filters.exclude_files), vec!["*.bak", "*.tmp"]);
        assert_eq!(texts(&filters.exclude_dirs), vec![".git", "target"]);
    }

    #[test]
    fn test_own_patterns_precede_inherited() {
        let config = parse_json(
            r#"{
                "base": { "include_files": ["@@base", "*.png"] },
                "top": { "inherit": ["base"], "include_files": ["@top", "*.png"] }
            }"#,
        )
        .unwrap();
        let filters = resolve(&config, "top").unwrap();
        assert_eq!(include_texts(&filters), vec!["*.png", "*.png"]);
        let hit = match_include_file(&filters.include_files, "img/a.png").unwrap();
        assert_eq!(hit.tag, &DestinationTag::Flatten("top".into()));
    }

    #[test]
    fn test_tags_do_not_leak_between_sections() {
        let config = parse_json(
            r#"{
                "base": { "include_files": ["*.txt"] },
                "top": { "inherit": ["base"], "include_files": ["@out", "*.png"] }
            }"#,
        )
        .unwrap();
        let filters = resolve(&config, "top").unwrap();
        assert_eq!(filters.include_files[1].tag, DestinationTag::Identity);
    }

    #[test]
    fn test_ten_levels_resolve() {
        let filters = resolve(&chain_config(10), "s1").unwrap();
        assert_eq!(filters.include_files.len(), 10);
        assert_eq!(filters.include_files[9].pattern.text(), "level10/**");
    }

    #[test]
    fn test_eleven_levels_fail() {
        let err = resolve(&chain_config(11), "s1").unwrap_err();
        let inner = stowage_error(&err).unwrap();
        assert!(matches!(inner, StowageError::RecursionLimitExceeded { section, .. } if section == "s11"));
        assert_eq!(inner.kind(), ErrorKind::Recursion);
    }

    #[test]
    fn test_cycle_is_reported() {
        let config = parse_json(
            r#"{
                "a": { "inherit": ["b"] },
                "b": { "inherit": ["a"] }
            }"#,
        )
        .unwrap();
        let err = resolve(&config, "a").unwrap_err();
        match stowage_error(&err) {
            Some(StowageError::InheritCycle { path, .. }) => assert_eq!(path, "a -> b -> a"),
            other => panic!("expected InheritCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_diamond_is_merged_once() {
        let config = parse_json(
            r#"{
                "root": { "include_files": ["root.txt"] },
                "left": { "inherit": ["root"] },
                "right": { "inherit": ["root"] },
                "top": { "inherit": ["left", "right"] }
            }"#,
        )
        .unwrap();
        let filters = resolve(&config, "top").unwrap();
        assert_eq!(include_texts(&filters), vec!["root.txt"]);
    }

    #[test]
    fn test_missing_section() {
        let config = parse_json(r#"{ "a": { "inherit": ["ghost"] } }"#).unwrap();
        let err = resolve(&config, "nope").unwrap_err();
        assert!(matches!(
            stowage_error(&err),
            Some(StowageError::SectionNotFound { name }) if name == "nope"
        ));
        let err = resolve(&config, "a").unwrap_err();
        assert!(matches!(
            stowage_error(&err),
            Some(StowageError::SectionNotFound { name }) if name == "ghost"
        ));
    }

    #[test]
    fn test_reserved_config_key_is_not_a_section() {
        let config = parse_json(r#"{ "config": { "compression": "zip" } }"#).unwrap();
        assert!(resolve(&config, "config").is_err());
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let config = parse_json(r#"{ "a": { "exclude_files": ["![oops"] } }"#).unwrap();
        let err = resolve(&config, "a").unwrap_err();
        assert_eq!(stowage_error(&err).map(|e| e.kind()), Some(ErrorKind::Config));
    }
}
