//! Ensure CLI command failures honor `--output json`.

mod common;

use common::{SCHEMA, schemash_cmd, stdout_json, write_temp};

fn assert_envelope(output: &std::process::Output, needle: &str) {
    assert!(!output.status.success());
    let json = stdout_json(output);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "command_failed");
    assert!(
        json["message"].as_str().is_some_and(|m| m.contains(needle)),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn missing_schema_emits_json_error_envelope() {
    let output = schemash_cmd()
        .args(["parse", "nope-does-not-exist.json", "config", "--output", "json"])
        .output()
        .expect("run parse command");
    assert_envelope(&output, "failed to load schema");
}

#[test]
fn missing_script_emits_json_error_envelope() {
    let output = schemash_cmd()
        .args(["run", SCHEMA, "missing-script.cli", "--output", "json"])
        .output()
        .expect("run run command");
    assert_envelope(&output, "failed to read script");
}

#[test]
fn invalid_profile_emits_json_error_envelope() {
    let (_dir, profile) = write_temp(
        "bad.json",
        r#"{ "id": "lab", "schema_version": "1.0.0", "max_mode_depth": 0 }"#,
    );
    let output = schemash_cmd()
        .args(["complete", SCHEMA, "", "--profile", &profile, "--output", "json"])
        .output()
        .expect("run complete command");
    assert_envelope(&output, "max_mode_depth");
}

#[test]
fn pretty_errors_go_to_stderr() {
    let output = schemash_cmd()
        .args(["run", SCHEMA, "missing-script.cli", "--output", "pretty"])
        .output()
        .expect("run run command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: failed to read script"), "{stderr}");
}
