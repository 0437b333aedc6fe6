//! End-to-end CLI integration tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn bytepool() -> Command {
    Command::cargo_bin("bytepool").expect("binary not found")
}

#[test]
fn help_flag() {
    bytepool()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--iterations"));
}

#[test]
fn version_flag() {
    bytepool()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bytepool"));
}

#[test]
fn text_report() {
    bytepool()
        .args(["-i", "100", "-t", "2", "-p", "256", "--min-size", "2", "--max-size", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2..=8 bytes, 3 classes"));
}

#[test]
fn json_report() {
    let output = bytepool()
        .args(["-i", "100", "-t", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["cycles"], 100);
    assert!(value["stats"]["hits"].as_u64().unwrap() > 0);
}

#[test]
fn config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pool.json");
    std::fs::write(&path, r#"{"min_size": 16, "max_size": 128}"#).unwrap();
    bytepool()
        .args(["-i", "10", "-t", "1", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("16..=128 bytes"));
}

#[test]
fn missing_config_file_fails() {
    bytepool()
        .args(["--config", "/nonexistent/pool.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pool configuration"));
}

#[test]
fn env_overrides_defaults() {
    bytepool()
        .env("BYTEPOOL_MAX_SIZE", "32")
        .args(["-i", "10", "-t", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2..=32 bytes"));
}
