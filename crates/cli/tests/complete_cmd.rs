//! CLI tests for `schemash complete`.

mod common;

use common::{SCHEMA, schemash_cmd, stdout_json};

fn displays(json: &serde_json::Value) -> Vec<String> {
    json["completions"]
        .as_array()
        .expect("completions array")
        .iter()
        .map(|c| c["display"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn operational_root_completions() {
    let output = schemash_cmd()
        .args(["complete", SCHEMA, "", "--output", "json"])
        .output()
        .expect("run complete");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["line"], "");
    assert_eq!(displays(&json), vec!["config", "reboot", "show", "trace"]);
}

#[test]
fn colliding_names_are_flagged() {
    let output = schemash_cmd()
        .args(["complete", SCHEMA, "sys", "--config", "--output", "json"])
        .output()
        .expect("run complete");

    assert!(output.status.success());
    let json = stdout_json(&output);
    let completions = json["completions"].as_array().unwrap();
    assert_eq!(completions.len(), 2);
    assert!(completions.iter().all(|c| c["needs_prefix"] == true));
    let mut qualified: Vec<&str> = completions
        .iter()
        .filter_map(|c| c["qualified"].as_str())
        .collect();
    qualified.sort_unstable();
    assert_eq!(qualified, vec!["o:system", "t:system"]);
}

#[test]
fn trailing_space_asks_for_the_next_word() {
    let output = schemash_cmd()
        .args(["complete", SCHEMA, "route ", "--config", "--output", "json"])
        .output()
        .expect("run complete");

    let json = stdout_json(&output);
    assert_eq!(displays(&json), vec!["<string>"]);
    assert_eq!(json["completions"][0]["is_value"], true);
}

#[test]
fn pretty_lists_labels() {
    let output = schemash_cmd()
        .args(["complete", SCHEMA, "sys", "--config", "--output", "pretty"])
        .output()
        .expect("run complete");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("o:system"), "{stdout}");
    assert!(stdout.contains("t:system"), "{stdout}");
}

#[test]
fn nothing_matches() {
    let output = schemash_cmd()
        .args(["complete", SCHEMA, "zzz", "--output", "pretty"])
        .output()
        .expect("run complete");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("no completions"), "{stdout}");
}
