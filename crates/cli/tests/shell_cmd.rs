//! CLI tests for `schemash shell` driven through stdin.

mod common;

use common::{SCHEMA, schemash_stdin, stdout_json_lines};

#[test]
fn prompts_follow_the_mode() {
    let output = schemash_stdin()
        .args(["shell", SCHEMA, "--output", "pretty"])
        .write_stdin("config\nnetwork 4\nexit\nend\n")
        .output()
        .expect("run shell");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("schemash> "), "{stdout}");
    assert!(stdout.contains("schemash(config)# "), "{stdout}");
    assert!(stdout.contains("schemash(config-net)# "), "{stdout}");
}

#[test]
fn question_mark_lists_completions_with_help() {
    let output = schemash_stdin()
        .args(["shell", SCHEMA, "--output", "pretty"])
        .write_stdin("config\nnetwork 4\n?\n")
        .output()
        .expect("run shell");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for expected in ["description", "enabled", "qos", "exit", "end"] {
        assert!(stdout.contains(expected), "{expected} missing from {stdout}");
    }
}

#[test]
fn json_shell_emits_one_object_per_line() {
    let output = schemash_stdin()
        .args(["shell", SCHEMA, "--output", "json"])
        .write_stdin("config\nnetwork ?\nnetwork 4\n")
        .output()
        .expect("run shell");

    assert!(output.status.success());
    let lines = stdout_json_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["outcome"], "config-entered");
    assert_eq!(lines[1]["line"], "network ");
    assert_eq!(lines[1]["completions"][0]["display"], "<uint32>");
    assert_eq!(lines[2]["outcome"], "mode-entered");
    assert_eq!(lines[2]["depth"], 2);
}

#[test]
fn rejected_lines_fail_the_session() {
    let output = schemash_stdin()
        .args(["shell", SCHEMA, "--output", "json"])
        .write_stdin("bogus\nconfig\n")
        .output()
        .expect("run shell");

    assert!(!output.status.success());
    let lines = stdout_json_lines(&output);
    assert_eq!(lines[0]["outcome"], "error");
    assert_eq!(lines[0]["diagnostics"][0]["id"], "SCH1002");
    assert_eq!(lines[1]["outcome"], "config-entered");
}

#[test]
fn exit_at_the_operational_root_ends_the_session() {
    let output = schemash_stdin()
        .args(["shell", SCHEMA, "--output", "json"])
        .write_stdin("exit\nconfig\n")
        .output()
        .expect("run shell");

    assert!(output.status.success());
    assert!(stdout_json_lines(&output).is_empty());
}
