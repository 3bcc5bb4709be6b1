//! Build oracle tests against stand-in wrapper scripts
#![cfg(unix)]

use depprune::config::OracleConfig;
use depprune::oracle::{BuildOracle, GradleOracle, LAUNCH_FAILURE_EXIT_CODE};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const SCRIPT: &str = "build.sh";

/// Runs `sh build.sh <tasks>` inside a temporary project
fn shell_project(script: &str) -> (TempDir, OracleConfig) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(SCRIPT), script).unwrap();
    let config = OracleConfig {
        command: "sh".to_string(),
        full_tasks: vec![SCRIPT.to_string(), "assembleDebug".to_string()],
        quick_tasks: vec![SCRIPT.to_string(), ":{module}:assembleDebug".to_string()],
        flags: Vec::new(),
        join_timeout_ms: 2000,
        build_timeout_secs: None,
    };
    (dir, config)
}

fn tasks(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Exit status and captured output
// ============================================================================

#[test]
fn test_successful_build() {
    let (dir, config) = shell_project("echo BUILD SUCCESSFUL\nexit 0\n");
    let oracle = GradleOracle::new(dir.path(), config);

    let outcome = oracle.run_oracle(&tasks(&[SCRIPT]));
    assert!(outcome.succeeded);
    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.stdout, "BUILD SUCCESSFUL\n");
    assert!(outcome.stderr.is_empty());
}

#[test]
fn test_failed_build_keeps_exit_code_and_stderr() {
    let (dir, config) = shell_project("echo 'e: Unresolved reference: Tracker' >&2\necho 'BUILD FAILED' >&2\nexit 3\n");
    let oracle = GradleOracle::new(dir.path(), config);

    let outcome = oracle.run_oracle(&tasks(&[SCRIPT]));
    assert!(!outcome.succeeded);
    assert_eq!(outcome.exit_code, 3);
    assert!(outcome.stderr.contains("Unresolved reference: Tracker"));
    assert!(outcome.stderr.ends_with("BUILD FAILED\n"));
}

#[test]
fn test_large_output_on_both_streams() {
    let script = "yes out | head -n 200000\nyes err | head -n 200000 >&2\nexit 0\n";
    let (dir, config) = shell_project(script);
    let oracle = GradleOracle::new(dir.path(), config);

    let outcome = oracle.run_oracle(&tasks(&[SCRIPT]));
    assert!(outcome.succeeded);
    assert_eq!(outcome.stdout.len(), 800_000);
    assert_eq!(outcome.stderr.len(), 800_000);
    assert!(outcome.stdout.lines().all(|line| line == "out"));
}

#[test]
fn test_invalid_utf8_is_replaced() {
    let (dir, config) = shell_project("printf 'caf\\351\\n'\n");
    let oracle = GradleOracle::new(dir.path(), config);

    let outcome = oracle.run_oracle(&tasks(&[SCRIPT]));
    assert!(outcome.succeeded);
    assert_eq!(outcome.stdout, "caf\u{FFFD}\n");
}

// ============================================================================
// Task lists
// ============================================================================

#[test]
fn test_quick_check_substitutes_module() {
    let (dir, mut config) = shell_project("echo \"$@\"\n");
    config.flags = tasks(&["--offline"]);
    let oracle = GradleOracle::new(dir.path(), config);

    let outcome = oracle.quick_compile_check("feature:home");
    assert!(outcome.succeeded);
    assert_eq!(outcome.stdout, ":feature:home:assembleDebug --offline\n");
}

#[test]
fn test_full_build_runs_full_tasks() {
    let (dir, config) = shell_project("echo \"$@\"\n");
    let oracle = GradleOracle::new(dir.path(), config);

    let outcome = oracle.validate_full_build();
    assert_eq!(outcome.stdout, "assembleDebug\n");
}

#[test]
fn test_runs_in_project_root() {
    let (dir, config) = shell_project("pwd\n");
    let oracle = GradleOracle::new(dir.path(), config);

    let outcome = oracle.run_oracle(&tasks(&[SCRIPT]));
    let reported = Path::new(outcome.stdout.trim()).canonicalize().unwrap();
    assert_eq!(reported, dir.path().canonicalize().unwrap());
}

#[test]
fn test_wrapper_relative_to_project_root() {
    let dir = TempDir::new().unwrap();
    let wrapper = dir.path().join("gradlew");
    fs::write(&wrapper, "#!/bin/sh\necho wrapper \"$@\"\n").unwrap();
    fs::set_permissions(&wrapper, fs::Permissions::from_mode(0o755)).unwrap();

    let config = OracleConfig {
        flags: Vec::new(),
        ..OracleConfig::default()
    };
    let oracle = GradleOracle::new(dir.path(), config);

    let outcome = oracle.run_oracle(&tasks(&["help"]));
    assert!(outcome.succeeded, "stderr: {}", outcome.stderr);
    assert_eq!(outcome.stdout, "wrapper help\n");
}

// ============================================================================
// Launch failures and timeouts
// ============================================================================

#[test]
fn test_missing_wrapper_is_launch_failure() {
    let dir = TempDir::new().unwrap();
    let oracle = GradleOracle::new(dir.path(), OracleConfig::default());

    let outcome = oracle.quick_compile_check("app");
    assert!(!outcome.succeeded);
    assert_eq!(outcome.exit_code, LAUNCH_FAILURE_EXIT_CODE);
    assert!(outcome.stderr.starts_with("Build execution failed"));
    assert!(outcome.stdout.is_empty());
}

#[test]
fn test_build_timeout_kills_build() {
    let (dir, mut config) = shell_project("echo started\nexec sleep 30\n");
    config.build_timeout_secs = Some(1);
    config.join_timeout_ms = 500;
    let oracle = GradleOracle::new(dir.path(), config);

    let start = Instant::now();
    let outcome = oracle.run_oracle(&tasks(&[SCRIPT]));
    assert!(start.elapsed().as_secs() < 10);
    assert!(!outcome.succeeded);
    assert_eq!(outcome.exit_code, LAUNCH_FAILURE_EXIT_CODE);
    assert_eq!(outcome.stdout, "started\n");
}

#[test]
fn test_join_timeout_bounds_capture_after_exit() {
    // The background sleep keeps both pipes open after the script exits
    let (dir, mut config) = shell_project("echo started\n(sleep 20) &\nexit 0\n");
    config.join_timeout_ms = 500;
    let oracle = GradleOracle::new(dir.path(), config);

    let start = Instant::now();
    let outcome = oracle.run_oracle(&tasks(&[SCRIPT]));
    assert!(start.elapsed().as_secs() < 10);
    assert!(outcome.succeeded);
    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.stdout, "started\n");
}

#[test]
fn test_concurrent_runs_on_one_oracle_are_serialized() {
    let (dir, config) = shell_project("sleep 1\n");
    let oracle = GradleOracle::new(dir.path(), config);

    let start = Instant::now();
    std::thread::scope(|scope| {
        let runs: Vec<_> = (0..2)
            .map(|_| scope.spawn(|| oracle.run_oracle(&tasks(&[SCRIPT]))))
            .collect();
        for run in runs {
            assert!(run.join().unwrap().succeeded);
        }
    });
    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[test]
fn test_oracle_by_reference() {
    let (dir, config) = shell_project("exit 0\n");
    let oracle = GradleOracle::new(dir.path(), config);

    fn check(oracle: impl BuildOracle) -> bool {
        oracle.quick_compile_check("app").succeeded
    }
    assert!(check(&oracle));
    assert!(check(&oracle));
}
