//! # Stowage Sections Integration Tests
//!
//! File: cli/tests/sections.rs
//!
//! ## Overview
//!
//! Checks the output of `stowage sections`.
//!

mod common;
use common::{game_project, stowage_cmd};
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_sections_listing() {
    let root = tempdir().unwrap();
    game_project(root.path());

    stowage_cmd()
        .arg("sections")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::eq(
            "assets (inherits common)\ncommon\nrelease (inherits assets)\n",
        ));
}

#[test]
fn test_sections_missing_rule_file() {
    let root = tempdir().unwrap();

    stowage_cmd()
        .arg("sections")
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("stowage.json"));
}
