//! CLI tests for `schemash explain`.

mod common;

use common::{schemash_cmd, stdout_json};

#[test]
fn explain_known_code_json_returns_explanation() {
    let output = schemash_cmd()
        .args(["explain", "SCH1003", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["id"], "SCH1003");
    assert!(
        json["explanation"]
            .as_str()
            .is_some_and(|t| t.contains("prefix")),
        "unexpected explanation: {}",
        json["explanation"]
    );
}

#[test]
fn explain_unknown_code_json_returns_null_explanation() {
    let output = schemash_cmd()
        .args(["explain", "SCH9999", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["id"], "SCH9999");
    assert!(json["explanation"].is_null());
}

#[test]
fn explain_pretty_shows_human_readable_text() {
    let output = schemash_cmd()
        .args(["explain", "SCH2001", "--output", "pretty"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("SCH2001") && stdout.contains("max_mode_depth"),
        "unexpected output: {stdout}"
    );
}
