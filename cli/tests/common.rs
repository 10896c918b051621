//! # Stowage CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! declares `mod common;` and uses [`stowage_cmd`] to run the compiled binary
//! and [`game_project`] to lay out a small package root.
//!

// Not every test file uses every helper.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

/// Rule file written by [`game_project`].
pub const GAME_RULES: &str = r#"{
    "config": { "compression": "zip" },
    "common": {
        "include_files": ["README.md"]
    },
    "assets": {
        "include_dirs": ["assets"],
        "exclude_files": ["*.psd"],
        "inherit": ["common"]
    },
    "release": {
        "include_files": ["@", "bin/*"],
        "inherit": ["assets"]
    }
}"#;

/// # Get Stowage Command (`stowage_cmd`)
///
/// An `assert_cmd::Command` for the `stowage` binary of the current test run.
///
/// ## Panics
/// Panics if the binary cannot be found via `Command::cargo_bin`.
pub fn stowage_cmd() -> Command {
    Command::cargo_bin("stowage").expect("Failed to find stowage binary for testing")
}

/// Writes `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, contents).expect("Failed to write file");
}

/// Lays out a small game project with a `stowage.json` under `root`:
///
/// ```text
/// README.md
/// assets/hero.png
/// assets/hero.psd
/// assets/sfx/jump.ogg
/// bin/tetra
/// src/main.rs
/// stowage.json
/// ```
pub fn game_project(root: &Path) {
    write_file(root, "README.md", "readme");
    write_file(root, "assets/hero.png", "png");
    write_file(root, "assets/hero.psd", "psd");
    write_file(root, "assets/sfx/jump.ogg", "ogg");
    write_file(root, "bin/tetra", "elf");
    write_file(root, "src/main.rs", "fn main() {}");
    write_file(root, "stowage.json", GAME_RULES);
}

/// Relative paths of all files below `root`, sorted, with `/` separators.
pub fn files_below(root: &Path) -> Vec<String> {
    let mut files = Vec::new();
    collect(root, root, &mut files);
    files.sort();
    files
}

fn collect(root: &Path, dir: &Path, files: &mut Vec<String>) {
    for entry in fs::read_dir(dir).expect("Failed to read directory") {
        let path: PathBuf = entry.expect("Failed to read entry").path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            let rel = path.strip_prefix(root).expect("Path outside root");
            files.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}
