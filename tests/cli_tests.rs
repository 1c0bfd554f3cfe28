//! CLI integration tests
//!
//! These tests verify the CLI flags work correctly by running the binary
//! against scratch copies of the sample export.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn acp_editor_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_acp-editor"))
}

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn scratch_copy() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("export.xml");
    fs::copy(fixtures_dir().join("sample_export.xml"), &path).expect("Failed to copy fixture");
    (dir, path)
}

fn run(args: &[&str]) -> Output {
    Command::new(acp_editor_bin())
        .args(args)
        .env("RUST_LOG", "info")
        .output()
        .expect("Failed to execute command")
}

fn file_count(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

// ============================================================================
// Usage and validation
// ============================================================================

#[test]
fn test_cli_help() {
    for flag in ["--help", "-?"] {
        let output = run(&[flag]);
        let stdout = String::from_utf8_lossy(&output.stdout);

        assert!(output.status.success(), "{} should succeed", flag);
        assert!(stdout.contains("--file"), "should list --file");
        assert!(stdout.contains("--analyze"), "should list --analyze");
        assert!(stdout.contains("--purge"), "should list --purge");
        assert!(stdout.contains("--rename"), "should list --rename");
    }
}

#[test]
fn test_cli_missing_file_flag() {
    let output = run(&["--analyze"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2), "missing --file is a usage error");
    assert!(stderr.contains("Missing --file"), "should report missing --file");
    assert!(output.stdout.is_empty(), "should not analyze anything");
}

#[test]
fn test_cli_short_file_value() {
    let output = run(&["-f", "x", "-a"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_unknown_flag_prints_help() {
    let output = run(&["--bogus"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("--bogus"), "should name the bad flag");
    assert!(stderr.contains("--file"), "should print help after the error");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_cli_malformed_rename() {
    let (dir, path) = scratch_copy();
    let original = fs::read(&path).unwrap();

    let output = run(&["-f", path.to_str().unwrap(), "-p", "-r", "bob"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("olduser:newuser"), "should show the expected form");
    assert_eq!(fs::read(&path).unwrap(), original, "file must be untouched");
    assert_eq!(file_count(dir.path()), 1, "no backup should be made");
}

#[test]
fn test_cli_nonexistent_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.xml");

    let output = run(&["-f", missing.to_str().unwrap(), "-a"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("parse error"), "should report the load failure");
}

// ============================================================================
// Analyze
// ============================================================================

#[test]
fn test_cli_analyze() {
    let (dir, path) = scratch_copy();

    let output = run(&["--file", path.to_str().unwrap(), "--analyze"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "analyze should succeed");
    assert!(stdout.contains("===RENDITIONS===\nRenditionCount: 3\n"));
    assert!(stdout.contains("===USERS===\n[bob, ALICE, system, Bob, carol, BOB]\n"));
    assert!(stdout.contains(
        "===CUSTOMCONTENT_MODELS===\n[http://www.acme.com/model/hr/1.0, http://example.org/model/ext]\n"
    ));
    assert_eq!(file_count(dir.path()), 1, "analyze alone must not write");
}

#[test]
fn test_cli_analyze_json() {
    let (_dir, path) = scratch_copy();

    let output = run(&["-f", path.to_str().unwrap(), "-a", "--json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "analyze --json should succeed");

    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert_eq!(json["renditionCount"], 3);
    assert_eq!(json["users"].as_array().unwrap().len(), 6);
    assert_eq!(json["customModels"][0], "http://www.acme.com/model/hr/1.0");
}

#[test]
fn test_cli_analyze_without_folder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nofolder.xml");
    fs::write(&path, "<view><cm_content/></view>").unwrap();

    let output = run(&["-f", path.to_str().unwrap(), "-a"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("(no folder element found)"));
}

// ============================================================================
// Purge and rename
// ============================================================================

#[test]
fn test_cli_purge() {
    let (dir, path) = scratch_copy();

    let output = run(&["-f", path.to_str().unwrap(), "-p"]);
    assert!(output.status.success(), "purge should succeed");
    assert_eq!(file_count(dir.path()), 2, "backup and new file");

    let written = fs::read_to_string(&path).unwrap();
    assert!(!written.contains("rendition>"));
    assert!(!written.contains("rn:renditioned"));
    assert!(written.contains("cm:auditable"));
}

#[test]
fn test_cli_analyze_runs_before_purge() {
    let (_dir, path) = scratch_copy();

    let output = run(&["-f", path.to_str().unwrap(), "-a", "-p"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("RenditionCount: 3"), "analysis sees the unpurged tree");
    assert!(stdout.contains("system"));
}

#[test]
fn test_cli_rename() {
    let (_dir, path) = scratch_copy();

    let output = run(&["-f", path.to_str().unwrap(), "-r", "bob:robert"]);
    assert!(output.status.success(), "rename should succeed");

    let output = run(&["-f", path.to_str().unwrap(), "-a"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[robert, ALICE, system, carol]"));
}

#[test]
fn test_cli_rename_empty_user() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty_creator.xml");
    fs::write(
        &path,
        r#"<view:view xmlns:view="http://v" xmlns:cm="http://cm"><cm:creator></cm:creator><cm:modifier>carol</cm:modifier></view:view>"#,
    )
    .unwrap();

    let output = run(&["-f", path.to_str().unwrap(), "-r", ":robert"]);
    assert!(output.status.success(), "an empty old name is a valid rename");
    assert_eq!(file_count(dir.path()), 2, "backup and new file");

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("<cm:creator>robert</cm:creator>"));
    assert!(written.contains("<cm:modifier>carol</cm:modifier>"));
}

#[test]
fn test_cli_purge_and_wildcard_rename() {
    let (dir, path) = scratch_copy();

    let output = run(&["-f", path.to_str().unwrap(), "-p", "-r", "*:anon"]);
    assert!(output.status.success());
    assert_eq!(file_count(dir.path()), 2, "one write for both operations");

    let output = run(&["-f", path.to_str().unwrap(), "-a"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RenditionCount: 0"));
    assert!(stdout.contains("===USERS===\n[anon]\n"));
}
