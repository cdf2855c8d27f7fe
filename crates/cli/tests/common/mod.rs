//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::process::Command;

use assert_cmd::cargo;

/// Fixture schema shared with the engine tests.
pub const SCHEMA: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../core/tests/fixtures/test-schema.json"
);

pub fn schemash_cmd() -> Command {
    Command::new(cargo::cargo_bin!("schemash"))
}

pub fn schemash_stdin() -> assert_cmd::Command {
    assert_cmd::Command::new(cargo::cargo_bin!("schemash"))
}

/// Write `content` to `name` inside a fresh temp dir.
pub fn write_temp(name: &str, content: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write temp file");
    (dir, path.to_string_lossy().to_string())
}

pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid json ({e}): {stdout}"))
}

/// Parse stdout as one JSON value per line.
pub fn stdout_json_lines(output: &std::process::Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("invalid json ({e}): {l}")))
        .collect()
}
