//! CLI integration tests
//!
//! These tests run the depprune binary against temporary Gradle projects.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use support::{class_using, ClassBuilder, ProjectFixture};

fn depprune() -> Command {
    let mut cmd = Command::cargo_bin("depprune").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Run depprune with arguments and return (stdout, stderr, success)
fn run_cli(project: &Path, args: &[&str]) -> (String, String, bool) {
    let output = depprune().arg(project).args(args).output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

/// `app` declares both libraries and only uses the tracker
fn sample_app() -> ProjectFixture {
    let fixture = ProjectFixture::new(&["app", "library-data", "library-tracker"]);
    fixture
        .with_build_file(
            "app",
            &[
                "implementation(project(\":library-data\"))",
                "implementation(project(\":library-tracker\"))",
            ],
        )
        .with_class(
            "app",
            class_using("com/example/app/MainActivity", "com/example/tracker/Tracker"),
            "com/example/app/MainActivity",
        )
        .with_build_file("library-data", &[])
        .with_class(
            "library-data",
            ClassBuilder::new("com/example/data/UserRepository"),
            "com/example/data/UserRepository",
        )
        .with_build_file("library-tracker", &[])
        .with_class(
            "library-tracker",
            ClassBuilder::new("com/example/tracker/Tracker"),
            "com/example/tracker/Tracker",
        );
    fixture
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    depprune()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--cleanup"))
        .stdout(predicate::str::contains("--from-report"))
        .stdout(predicate::str::contains("--fail-on-unused"));
}

#[test]
fn test_cli_version() {
    depprune()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_nonexistent_path() {
    depprune()
        .arg("/nonexistent/path/for/depprune")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_from_report_requires_cleanup() {
    let fixture = sample_app();
    depprune()
        .arg(fixture.path())
        .args(["--from-report", "dependency-report.txt"])
        .assert()
        .failure();
}

// ============================================================================
// Analysis
// ============================================================================

#[test]
fn test_cli_writes_report() {
    let fixture = sample_app();
    let (stdout, stderr, success) = run_cli(fixture.path(), &[]);

    assert!(success, "analysis failed: {}", stderr);
    assert!(stdout.contains("Module: app"));
    assert!(stdout.contains("- implementation library-data"));

    let report = fixture.read(&fixture.path().join("dependency-report.txt"));
    assert!(report.starts_with("Unused Dependencies Analysis:"));
    assert!(report.contains("Module: app\n    - implementation library-data\n"));
    assert!(!report.contains("library-tracker"));
    assert!(!fixture.path().join("full-dependency-report.txt").exists());
}

#[test]
fn test_cli_full_report() {
    let fixture = sample_app();
    let (stdout, _, success) = run_cli(fixture.path(), &["--full-report"]);

    assert!(success);
    assert!(stdout.contains("DETAILED MODULE ANALYSIS REPORT"));
    let full = fixture.read(&fixture.path().join("full-dependency-report.txt"));
    assert!(full.contains("MODULE: library-tracker"));
    assert!(full.contains("com.example.tracker.Tracker"));
    assert!(full.contains("Total Unused:             1"));
}

#[test]
fn test_cli_module_filter() {
    let fixture = sample_app();
    let (_, _, success) = run_cli(fixture.path(), &["--module", "library-tracker"]);

    assert!(success);
    let report = fixture.read(&fixture.path().join("dependency-report.txt"));
    assert!(report.starts_with("Unused Dependencies Analysis for module: library-tracker"));
    assert!(report.contains("No unused dependencies found!"));
}

#[test]
fn test_cli_fail_on_unused() {
    let fixture = sample_app();
    depprune()
        .arg(fixture.path())
        .arg("--fail-on-unused")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Found 1 unused dependencies"));
}

#[test]
fn test_cli_exclude_module() {
    let fixture = sample_app();
    depprune()
        .arg(fixture.path())
        .args(["--exclude-module", "app", "--fail-on-unused"])
        .assert()
        .success();
}

#[test]
fn test_cli_json_output() {
    let fixture = sample_app();
    let (stdout, _, success) = run_cli(fixture.path(), &["--format", "json"]);

    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["summary"]["modules"], 3);
    assert_eq!(value["summary"]["unused"], 1);
    let app = value["modules"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["name"] == "app")
        .unwrap();
    assert_eq!(app["unused_dependencies"][0]["name"], "library-data");
}

#[test]
fn test_cli_json_output_file() {
    let fixture = sample_app();
    let output = fixture.path().join("out.json");

    depprune()
        .arg(fixture.path())
        .args(["-f", "json", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let value: serde_json::Value = serde_json::from_str(&fixture.read(&output)).unwrap();
    assert_eq!(value["summary"]["dependencies"], 2);
}

#[test]
fn test_cli_without_settings() {
    let dir = tempfile::TempDir::new().unwrap();
    let (stdout, _, success) = run_cli(dir.path(), &[]);

    assert!(success);
    assert!(stdout.contains("No unused dependencies found!"));
}

#[test]
fn test_cli_config_excludes_dependency() {
    let fixture = sample_app();
    let config = fixture.path().join("depprune.yml");
    fixture.write(
        &config,
        b"excluded-dependencies:\n  app:\n    - library-data\n",
    );

    depprune()
        .arg(fixture.path())
        .arg("--config")
        .arg(&config)
        .arg("--fail-on-unused")
        .assert()
        .success();
}

#[test]
fn test_cli_invalid_config_fails() {
    let fixture = sample_app();
    let config = fixture.path().join("broken.yml");
    fixture.write(&config, b"excluded-modules: [unterminated\n");

    depprune()
        .arg(fixture.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

// ============================================================================
// Cleanup
// ============================================================================

#[test]
fn test_cli_cleanup_dry_run() {
    let fixture = sample_app();
    let build_file = fixture.build_file("app");
    let before = fixture.read(&build_file);

    let (stdout, stderr, success) = run_cli(fixture.path(), &["--cleanup", "--dry-run"]);

    assert!(success, "dry run failed: {}", stderr);
    assert!(stdout.contains("Dry run"));
    assert!(stdout.contains("implementation library-data"));
    assert_eq!(fixture.read(&build_file), before);
    assert!(!fixture.path().join("dependency-cleanup-report.txt").exists());
}

#[test]
fn test_cli_cleanup_dry_run_from_report() {
    let fixture = sample_app();
    let report = fixture.path().join("saved-report.txt");
    fixture.write(
        &report,
        b"Unused Dependencies Analysis:\n=============================\n\nModule: library-tracker\n    - api library-core\n",
    );

    let (stdout, _, success) = run_cli(
        fixture.path(),
        &["--cleanup", "--dry-run", "--from-report", report.to_str().unwrap()],
    );

    assert!(success);
    assert!(stdout.contains("library-tracker"));
    assert!(stdout.contains("api library-core"));
    assert!(!stdout.contains("library-data"));
}

#[test]
fn test_cli_cleanup_missing_report() {
    let fixture = sample_app();
    depprune()
        .arg(fixture.path())
        .args(["--cleanup", "--from-report", "missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dependency report not found"));
}

#[cfg(unix)]
#[test]
fn test_cli_cleanup_with_wrapper() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = sample_app();
    let wrapper = fixture.path().join("gradlew");
    fixture.write(&wrapper, b"#!/bin/sh\necho BUILD SUCCESSFUL\n");
    std::fs::set_permissions(&wrapper, std::fs::Permissions::from_mode(0o755)).unwrap();

    let (stdout, stderr, success) = run_cli(fixture.path(), &["--cleanup"]);

    assert!(success, "cleanup failed: {}", stderr);
    assert!(stdout.contains("Successfully Removed (1):"));
    let build_file = fixture.read(&fixture.build_file("app"));
    assert!(!build_file.contains("library-data"));
    assert!(build_file.contains("library-tracker"));

    let report = fixture.read(&fixture.path().join("dependency-cleanup-report.txt"));
    assert!(report.contains("Summary: 1 dependencies removed, 0 failed"));
    assert!(report.contains("Full build validation: passed"));
}
