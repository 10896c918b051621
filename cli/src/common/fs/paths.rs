//! # Stowage Path Helpers
//!
//! File: cli/src/common/fs/paths.rs
//!
//! Small, purely lexical helpers shared by the matcher, the selection engine and
//! the archive layer. None of these functions touch the filesystem except
//! [`absolute`], which consults the current directory for relative input.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::path::{Component, Path, PathBuf};

/// Renders a relative path with `/` separators, the form patterns are matched
/// against and archive members are named with.
pub fn slash_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}

/// Resolves `.` and `..` without following symlinks.
///
/// Returns `None` when a `..` would climb above the start of a relative path.
pub fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    if out.has_root() {
                        continue;
                    }
                    return None;
                }
                out.pop();
                depth -= 1;
            }
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
        }
    }
    Some(out)
}

/// Absolute, lexically normalized form of `path`.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(path)
    };
    Ok(normalize(&joined).unwrap_or(joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_path() {
        assert_eq!(slash_path(Path::new("sub/dir/file.txt")), "sub/dir/file.txt");
        assert_eq!(slash_path(Path::new("./a.txt")), "a.txt");
        assert_eq!(slash_path(Path::new("")), "");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("sub/../a.txt")),
            Some(PathBuf::from("a.txt"))
        );
        assert_eq!(
            normalize(Path::new("out/./x/../y")),
            Some(PathBuf::from("out/y"))
        );
        assert_eq!(normalize(Path::new("../escape")), None);
        assert_eq!(normalize(Path::new("/../etc")), Some(PathBuf::from("/etc")));
    }

    #[test]
    fn test_absolute_is_absolute() {
        let abs = absolute(Path::new("some/relative/../path")).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("some/path"));
    }
}
