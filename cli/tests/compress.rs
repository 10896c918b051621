//! # Stowage Compress Integration Tests
//!
//! File: cli/tests/compress.rs
//!
//! ## Overview
//!
//! Runs `stowage compress` against a fixture project and checks the archive
//! that comes out by extracting it again with `stowage decompress`.
//!

mod common;
use common::{files_below, game_project, stowage_cmd, write_file};
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_compress_release_section() {
    let root = tempdir().unwrap();
    let work = tempdir().unwrap();
    let out = tempdir().unwrap();
    game_project(root.path());

    stowage_cmd()
        .arg("compress")
        .arg(root.path())
        .args(["-s", "release", "-a"])
        .arg(work.path().join("game"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 files"));

    let archive = work.path().join("game.zip");
    assert!(archive.is_file());

    let dest = out.path().join("game");
    stowage_cmd()
        .arg("decompress")
        .arg(&archive)
        .arg(&dest)
        .assert()
        .success();
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
fn test_compress_default_archive_name_in_cwd() {
    let parent = tempdir().unwrap();
    let work = tempdir().unwrap();
    let root = parent.path().join("tetra");
    game_project(&root);

    stowage_cmd()
        .current_dir(work.path())
        .arg("compress")
        .arg(&root)
        .args(["-s", "common", "-z", "tar.gz"])
        .assert()
        .success();
    assert!(work.path().join("tetra.tar.gz").is_file());
}

#[test]
fn test_compress_toml_rules() {
    let root = tempdir().unwrap();
    let work = tempdir().unwrap();
    write_file(root.path(), "docs/guide.md", "guide");
    write_file(root.path(), "docs/draft.md", "draft");
    write_file(
        root.path(),
        "rules.toml",
        "[config]\ncompression = \"tar.bz2\"\n\n[docs]\ninclude_files = [\"docs/*.md\"]\nexclude_files = [\"draft.md\"]\n",
    );

    stowage_cmd()
        .arg("compress")
        .arg(root.path())
        .arg("-c")
        .arg(root.path().join("rules.toml"))
        .args(["-s", "docs", "-a"])
        .arg(work.path().join("docs"))
        .assert()
        .success();

    let dest = work.path().join("unpacked");
    stowage_cmd()
        .arg("decompress")
        .arg(work.path().join("docs.tar.bz2"))
        .arg(&dest)
        .assert()
        .success();
    assert_eq!(files_below(&dest), vec!["docs/guide.md"]);
}

#[test]
fn test_compress_dry_run() {
    let root = tempdir().unwrap();
    let work = tempdir().unwrap();
    game_project(root.path());

    stowage_cmd()
        .arg("compress")
        .arg(root.path())
        .args(["--all", "--dry-run", "-a"])
        .arg(work.path().join("all"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: 7 files"));
    assert!(!work.path().join("all.zip").exists());
}

#[test]
fn test_compress_unknown_section() {
    let root = tempdir().unwrap();
    game_project(root.path());

    stowage_cmd()
        .arg("compress")
        .arg(root.path())
        .args(["-s", "nightly", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Section 'nightly' not found"));
}

#[test]
fn test_compress_unknown_compression() {
    let root = tempdir().unwrap();
    game_project(root.path());

    stowage_cmd()
        .arg("compress")
        .arg(root.path())
        .args(["--all", "--dry-run", "-z", "rar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown compression 'rar'"));
}

#[test]
fn test_compress_empty_selection() {
    let root = tempdir().unwrap();
    let work = tempdir().unwrap();
    game_project(root.path());
    write_file(
        root.path(),
        "stowage.json",
        r#"{ "none": { "include_files": ["*.nothing"] } }"#,
    );

    stowage_cmd()
        .arg("compress")
        .arg(root.path())
        .args(["-s", "none", "-a"])
        .arg(work.path().join("none"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No files matched"));
}
