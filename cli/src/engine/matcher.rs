//! # Stowage Path Matcher (`engine::matcher`)
//!
//! File: cli/src/engine/matcher.rs
//!
//! ## Overview
//!
//! Decides whether a candidate path (relative, `/`-separated) is matched by a
//! list of patterns. Lists are always evaluated in declaration order and the
//! first matching pattern wins.
//!
//! ## Patterns
//!
//! - A pattern starting with `!` is a regular expression, searched anywhere in
//!   the candidate (unanchored).
//! - Anything else is a glob. `*` and `?` stay within one path component, `**`
//!   spans directories. A glob without any `/` is also tried against the final
//!   component of the candidate, so `*.png` matches `assets/sprite.png`.
//!
//! Patterns are classified and compiled once, by [`Pattern::parse`].
//!
//! ## Destination tags
//!
//! `include_files` lists may contain tag markers that change where the files
//! matched by the following patterns land in the output:
//!
//! | Marker | Tag | Destination |
//! |---|---|---|
//! | (none) | `Identity` | `source` |
//! | `@dest` | `Flatten` | `dest/basename(source)` |
//! | `@@dest` | `PreserveRelative` | `dest/source` |
//! | `@@@dest` | `StripMatchedPrefix` | `dest/source[prefix..]` |
//!
use crate::common::fs::paths::slash_path;
use crate::core::error::{Result, StowageError};
use anyhow::anyhow;
use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Leading character marking a pattern as a regular expression.
pub const REGEX_SIGIL: char = '!';

/// Leading character of a destination tag marker in `include_files`.
pub const TAG_SIGIL: char = '@';

/// A compiled include/exclude pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    Glob {
        text: String,
        matcher: GlobMatcher,
        match_basename: bool,
    },
    Regex {
        text: String,
        regex: Regex,
    },
}

impl Pattern {
    /// Classifies and compiles one pattern string.
    pub fn parse(raw: &str) -> Result<Self> {
        if let Some(expression) = raw.strip_prefix(REGEX_SIGIL) {
            let regex = Regex::new(expression).map_err(|e| {
                anyhow!(StowageError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: e.to_string(),
                })
            })?;
            return Ok(Pattern::Regex {
                text: raw.to_string(),
                regex,
            });
        }

        let glob = GlobBuilder::new(raw)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                anyhow!(StowageError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: e.to_string(),
                })
            })?;
        Ok(Pattern::Glob {
            text: raw.to_string(),
            matcher: glob.compile_matcher(),
            match_basename: !raw.contains('/'),
        })
    }

    /// The pattern as written in the rule file.
    pub fn text(&self) -> &str {
        match self {
            Pattern::Glob { text, .. } | Pattern::Regex { text, .. } => text,
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Pattern::Regex { .. })
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        match self {
            Pattern::Regex { regex, .. } => regex.is_match(candidate),
            Pattern::Glob {
                matcher,
                match_basename,
                ..
            } => {
                if matcher.is_match(candidate) {
                    return true;
                }
                *match_basename
                    && candidate
                        .rsplit_once('/')
                        .is_some_and(|(_, name)| matcher.is_match(name))
            }
        }
    }

    /// Length in bytes of the literal prefix shared by `candidate` and this
    /// pattern's text. Regular expressions share nothing.
    pub fn prefix_len(&self, candidate: &str) -> usize {
        match self {
            Pattern::Glob { text, .. } => common_prefix_len(candidate, text),
            Pattern::Regex { .. } => 0,
        }
    }
}

/// Byte length of the longest common prefix of `a` and `b`, on char boundaries.
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .take_while(|((_, left), right)| left == right)
        .last()
        .map_or(0, |((index, c), _)| index + c.len_utf8())
}

/// Where a matched source lands in the output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DestinationTag {
    Identity,
    Flatten(PathBuf),
    PreserveRelative(PathBuf),
    StripMatchedPrefix(PathBuf),
}

static IDENTITY: DestinationTag = DestinationTag::Identity;

impl DestinationTag {
    /// Recognizes an `@dest`, `@@dest` or `@@@dest` marker.
    pub fn parse_marker(entry: &str) -> Option<Self> {
        if let Some(dest) = entry.strip_prefix("@@@") {
            Some(DestinationTag::StripMatchedPrefix(PathBuf::from(dest)))
        } else if let Some(dest) = entry.strip_prefix("@@") {
            Some(DestinationTag::PreserveRelative(PathBuf::from(dest)))
        } else {
            entry
                .strip_prefix(TAG_SIGIL)
                .map(|dest| DestinationTag::Flatten(PathBuf::from(dest)))
        }
    }

    /// Computes the output path of `source`, whose glob hit shared
    /// `prefix_len` bytes with the winning pattern.
    pub fn destination(&self, source: &Path, prefix_len: usize) -> PathBuf {
        let basename = || source.file_name().map(PathBuf::from).unwrap_or_default();
        match self {
            DestinationTag::Identity => source.to_path_buf(),
            DestinationTag::Flatten(dest) => dest.join(basename()),
            DestinationTag::PreserveRelative(dest) => dest.join(source),
            DestinationTag::StripMatchedPrefix(dest) => {
                let text = slash_path(source);
                let rest = text.get(prefix_len..).unwrap_or("").trim_start_matches('/');
                if rest.is_empty() {
                    dest.join(basename())
                } else {
                    dest.join(rest)
                }
            }
        }
    }
}

/// One `include_files` pattern together with the tag in force where it was declared.
#[derive(Debug, Clone)]
pub struct IncludeRule {
    pub tag: DestinationTag,
    pub pattern: Pattern,
}

/// A successful include match.
#[derive(Debug, Clone, Copy)]
pub struct IncludeHit<'a> {
    pub tag: &'a DestinationTag,
    pub pattern: &'a Pattern,
    pub prefix_len: usize,
}

/// First include-file rule matching `candidate`.
pub fn match_include_file<'a>(rules: &'a [IncludeRule], candidate: &str) -> Option<IncludeHit<'a>> {
    rules
        .iter()
        .find(|rule| rule.pattern.is_match(candidate))
        .map(|rule| IncludeHit {
            tag: &rule.tag,
            pattern: &rule.pattern,
            prefix_len: rule.pattern.prefix_len(candidate),
        })
}

/// First include-dir pattern matching a directory containing `candidate`.
/// Directory hits never relocate, so the tag is always `Identity`.
pub fn match_include_dir<'a>(patterns: &'a [Pattern], candidate: &str) -> Option<IncludeHit<'a>> {
    match_dir(patterns, candidate).map(|(pattern, _)| IncludeHit {
        tag: &IDENTITY,
        pattern,
        prefix_len: 0,
    })
}

/// First pattern matching `candidate` itself.
pub fn match_file<'a>(patterns: &'a [Pattern], candidate: &str) -> Option<&'a Pattern> {
    patterns.iter().find(|pattern| pattern.is_match(candidate))
}

/// First pattern matching the immediate containing directory of `candidate`
/// or, failing that, one of its ancestors. Returns the pattern and the
/// directory it matched.
pub fn match_dir<'a, 'c>(patterns: &'a [Pattern], candidate: &'c str) -> Option<(&'a Pattern, &'c str)> {
    patterns.iter().find_map(|pattern| {
        containing_dirs(candidate)
            .find(|dir| pattern.is_match(dir))
            .map(|dir| (pattern, dir))
    })
}

/// `a/b/c/f.txt` yields `a/b/c`, `a/b`, `a`. Root-level names yield nothing.
fn containing_dirs(candidate: &str) -> impl Iterator<Item = &str> {
    let mut current = candidate;
    std::iter::from_fn(move || {
        let (parent, _) = current.rsplit_once('/')?;
        current = parent;
        Some(parent)
    })
    .filter(|dir| !dir.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(raw: &[&str]) -> Vec<Pattern> {
        raw.iter().map(|p| Pattern::parse(p).unwrap()).collect()
    }

    #[test]
    fn test_parse_classifies_once() {
        assert!(Pattern::parse("!\\.txt$").unwrap().is_regex());
        assert!(!Pattern::parse("**/*.txt").unwrap().is_regex());
        assert_eq!(Pattern::parse("!\\.txt$").unwrap().text(), "!\\.txt$");
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(Pattern::parse("![unclosed").is_err());
        assert!(Pattern::parse("a/[b").is_err());
    }

    #[test]
    fn test_glob_separator_semantics() {
        let star = Pattern::parse("images/*").unwrap();
        assert!(star.is_match("images/a.png"));
        assert!(!star.is_match("images/icons/a.png"));

        let globstar = Pattern::parse("images/**").unwrap();
        assert!(globstar.is_match("images/a.png"));
        assert!(globstar.is_match("images/icons/a.png"));
        assert!(!globstar.is_match("docs/images/a.png"));

        let everything = Pattern::parse("**").unwrap();
        assert!(everything.is_match("a.txt"));
        assert!(everything.is_match("sub/b.txt"));
    }

    #[test]
    fn test_glob_without_slash_matches_basename() {
        let png = Pattern::parse("*.png").unwrap();
        assert!(png.is_match("sprite.png"));
        assert!(png.is_match("assets/sprite.png"));
        assert!(!png.is_match("assets/sprite.jpg"));
    }

    #[test]
    fn test_regex_is_unanchored() {
        let regex = Pattern::parse("!ico").unwrap();
        assert!(regex.is_match("images/icons/a.png"));
        assert!(!regex.is_match("images/a.png"));
    }

    #[test]
    fn test_first_match_wins() {
        let rules = vec![
            IncludeRule {
                tag: DestinationTag::Flatten("first".into()),
                pattern: Pattern::parse("*.png").unwrap(),
            },
            IncludeRule {
                tag: DestinationTag::Flatten("second".into()),
                pattern: Pattern::parse("assets/**").unwrap(),
            },
        ];
        let hit = match_include_file(&rules, "assets/sprite.png").unwrap();
        assert_eq!(hit.tag, &DestinationTag::Flatten("first".into()));
        let hit = match_include_file(&rules, "assets/notes.txt").unwrap();
        assert_eq!(hit.tag, &DestinationTag::Flatten("second".into()));
        assert!(match_include_file(&rules, "readme.md").is_none());
    }

    #[test]
    fn test_dir_patterns_check_containing_dir_then_ancestors() {
        let dirs = patterns(&["build"]);
        let (pattern, dir) = match_dir(&dirs, "build/out/bin/tool").unwrap();
        assert_eq!(pattern.text(), "build");
        assert_eq!(dir, "build");

        let nested = patterns(&["a/b"]);
        assert_eq!(match_dir(&nested, "a/b/c/f.txt").unwrap().1, "a/b");
        assert!(match_dir(&nested, "a/f.txt").is_none());

        // Root-level files have no containing directory.
        assert!(match_dir(&patterns(&["**"]), "top.txt").is_none());
    }

    #[test]
    fn test_include_dir_hit_is_identity() {
        let dirs = patterns(&["docs"]);
        let hit = match_include_dir(&dirs, "docs/guide/intro.md").unwrap();
        assert_eq!(hit.tag, &DestinationTag::Identity);
        assert_eq!(hit.prefix_len, 0);
    }

    #[test]
    fn test_common_prefix_len() {
        assert_eq!(common_prefix_len("images/icons/a.png", "images/**"), 7);
        assert_eq!(common_prefix_len("abc", "xyz"), 0);
        assert_eq!(common_prefix_len("", "**"), 0);
        assert_eq!(common_prefix_len("ü/x", "ü/**"), "ü/".len());
    }

    #[test]
    fn test_parse_marker() {
        assert_eq!(
            DestinationTag::parse_marker("@out"),
            Some(DestinationTag::Flatten("out".into()))
        );
        assert_eq!(
            DestinationTag::parse_marker("@@out"),
            Some(DestinationTag::PreserveRelative("out".into()))
        );
        assert_eq!(
            DestinationTag::parse_marker("@@@out"),
            Some(DestinationTag::StripMatchedPrefix("out".into()))
        );
        assert_eq!(DestinationTag::parse_marker("*.png"), None);
    }

    #[test]
    fn test_destinations() {
        let source = Path::new("images/icons/a.png");
        assert_eq!(DestinationTag::Identity.destination(source, 0), source);
        assert_eq!(
            DestinationTag::Flatten("out".into()).destination(source, 0),
            PathBuf::from("out/a.png")
        );
        assert_eq!(
            DestinationTag::PreserveRelative("out".into()).destination(source, 0),
            PathBuf::from("out/images/icons/a.png")
        );
        assert_eq!(
            DestinationTag::StripMatchedPrefix("out".into()).destination(source, 7),
            PathBuf::from("out/icons/a.png")
        );
        // A prefix ending just before a separator does not produce an absolute remainder.
        assert_eq!(
            DestinationTag::StripMatchedPrefix("out".into()).destination(source, 6),
            PathBuf::from("out/icons/a.png")
        );
        // A pattern spelling out the whole path keeps the file name.
        assert_eq!(
            DestinationTag::StripMatchedPrefix("out".into()).destination(source, 18),
            PathBuf::from("out/a.png")
        );
        assert_eq!(
            DestinationTag::Flatten("".into()).destination(source, 0),
            PathBuf::from("a.png")
        );
    }
}
