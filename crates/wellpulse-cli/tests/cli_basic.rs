//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_wellpulse-cli"))
        .args(args)
        .env("WELLPULSE_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// A data dir whose backend points at a closed port.
fn offline_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "api.base_url", "http://127.0.0.1:9/api"]);
    assert_eq!(code, 0);
    dir
}

#[test]
fn test_route_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(dir.path(), &["route", "#/Pomodoro"]);
    assert_eq!(code, 0);
    assert_eq!(out.trim(), "pomodoro");

    let (out, _, _) = run_cli(dir.path(), &["route", "#/nowhere"]);
    assert_eq!(out.trim(), "home");
}

#[test]
fn test_home_json() {
    let dir = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(dir.path(), &["home", "--json"]);
    assert_eq!(code, 0);
    let cards: serde_json::Value = serde_json::from_str(&out).unwrap();
    let routes: Vec<&str> = cards
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["route"].as_str().unwrap())
        .collect();
    assert_eq!(routes, ["stress", "pomodoro", "concentration"]);
}

#[test]
fn test_open_home() {
    let dir = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(dir.path(), &["open", "#/"]);
    assert_eq!(code, 0);
    assert!(out.contains("Pomodoro Timer"));
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(dir.path(), &["config", "get", "metrics.history_cap"]);
    assert_eq!(code, 0);
    assert_eq!(out.trim(), "50");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "audio.muted", "true"]);
    assert_eq!(code, 0);
    let (out, _, _) = run_cli(dir.path(), &["config", "get", "audio.muted"]);
    assert_eq!(out.trim(), "true");
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let (_, err, code) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
    assert!(err.contains("unknown key"));

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "audio.muted", "loud"]);
    assert_ne!(code, 0);
}

#[test]
fn test_sleep_phases() {
    let dir = offline_dir();
    let (out, _, code) = run_cli(dir.path(), &["stress", "--exercise", "sleep", "--phases"]);
    assert_eq!(code, 0);
    let phases: serde_json::Value = serde_json::from_str(&out).unwrap();
    let names: Vec<&str> = phases
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["intro", "feet", "legs", "stomach", "shoulders", "face", "complete"]);
}

#[test]
fn test_breathing_countdown_phases() {
    let dir = offline_dir();
    let (out, _, code) = run_cli(dir.path(), &["stress", "--countdown", "3", "--phases"]);
    assert_eq!(code, 0);
    let phases: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(phases.as_array().unwrap().len(), 7);
    assert_eq!(phases[3]["name"], "inhale");
}

#[test]
fn test_unknown_pattern_fails() {
    let dir = offline_dir();
    let (_, err, code) = run_cli(dir.path(), &["stress", "--pattern", "panting", "--phases"]);
    assert_ne!(code, 0);
    assert!(err.contains("unknown breathing pattern"));
}

#[test]
fn test_pomodoro_plan_offline_uses_defaults() {
    let dir = offline_dir();
    let (out, _, code) = run_cli(dir.path(), &["pomodoro", "--plan", "4", "--no-metrics"]);
    assert_eq!(code, 0);
    let steps: serde_json::Value = serde_json::from_str(&out).unwrap();
    let steps = steps.as_array().unwrap();
    assert_eq!(steps.len(), 8);
    assert_eq!(steps[0]["phase"], "work");
    assert_eq!(steps[7]["phase"], "longBreak");
}

#[test]
fn test_pomodoro_plan_rejects_out_of_range() {
    let dir = offline_dir();
    for n in ["0", "101", "4294967295"] {
        let (out, err, code) = run_cli(dir.path(), &["pomodoro", "--plan", n, "--no-metrics"]);
        assert_ne!(code, 0, "--plan {n} should be rejected");
        assert!(out.is_empty());
        assert!(err.contains("--plan"), "{err}");
    }
}

#[test]
fn test_metrics_offline_fails() {
    let dir = offline_dir();
    let (out, err, code) = run_cli(dir.path(), &["metrics"]);
    assert_ne!(code, 0);
    assert!(out.contains("metrics unavailable"));
    assert!(err.contains("error:"));
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (out, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(out.contains("wellpulse-cli"));
}
