//! # Stowage Copy Integration Tests
//!
//! File: cli/tests/copy.rs
//!
//! ## Overview
//!
//! Checks `stowage copy`: destination tags decide where files land, a
//! non-empty destination needs `--force`, and ROOT defaults to the current
//! directory when only DESTINATION is given.
//!

mod common;
use common::{files_below, game_project, stowage_cmd, write_file};
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_copy_release_section() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    game_project(root.path());
    let dest = out.path().join("staging");

    stowage_cmd()
        .arg("copy")
        .arg(root.path())
        .arg(&dest)
        .args(["-s", "release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied 4 files"));

    assert_eq!(
        files_below(&dest),
        vec![
            "README.md",
            "assets/hero.png",
            "assets/sfx/jump.ogg",
            "tetra",
        ]
    );
}

#[test]
fn test_copy_root_defaults_to_cwd() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    game_project(root.path());

    stowage_cmd()
        .current_dir(root.path())
        .arg("copy")
        .arg(out.path())
        .args(["-s", "common"])
        .assert()
        .success();
    assert_eq!(files_below(out.path()), vec!["README.md"]);
}

#[test]
fn test_copy_non_empty_destination() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    game_project(root.path());
    write_file(out.path(), "README.md", "old");

    stowage_cmd()
        .arg("copy")
        .arg(root.path())
        .arg(out.path())
        .arg("--all")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not empty"));
    assert_eq!(fs::read_to_string(out.path().join("README.md")).unwrap(), "old");

    stowage_cmd()
        .arg("copy")
        .arg(root.path())
        .arg(out.path())
        .args(["--all", "--force"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(out.path().join("README.md")).unwrap(), "readme");
    assert!(out.path().join("src/main.rs").is_file());
}

#[test]
fn test_copy_name_collision() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_file(root.path(), "a/config.ini", "a");
    write_file(root.path(), "b/config.ini", "b");
    write_file(
        root.path(),
        "stowage.json",
        r#"{ "flat": { "include_files": ["@out", "*.ini"] } }"#,
    );

    stowage_cmd()
        .arg("copy")
        .arg(root.path())
        .arg(out.path().join("flat"))
        .args(["-s", "flat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Name collision"));
}
