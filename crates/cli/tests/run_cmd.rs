//! CLI tests for `schemash run`.

mod common;

use common::{SCHEMA, schemash_cmd, stdout_json, write_temp};

fn outcomes(json: &serde_json::Value) -> Vec<String> {
    json["lines"]
        .as_array()
        .expect("lines array")
        .iter()
        .map(|l| l["outcome"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn modes_persist_across_lines() {
    let (_dir, script) = write_temp(
        "setup.cli",
        "config\nnetwork 31415\n description uplink\n exit\nend\n",
    );
    let output = schemash_cmd()
        .args(["run", SCHEMA, &script, "--output", "json"])
        .output()
        .expect("run script");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["success"], true);
    assert_eq!(json["prompt"], "schemash>");
    assert_eq!(outcomes(&json), vec![
        "config-entered",
        "mode-entered",
        "command",
        "mode-exited",
        "config-exited",
    ]);

    let line = &json["lines"][2];
    assert_eq!(line["prompt"], "schemash(config-net)#");
    assert_eq!(line["depth"], 2);
    let xml = line["xml"].as_str().unwrap();
    assert!(xml.contains("<network-id>31415</network-id>"), "{xml}");
    assert!(xml.contains("<description>uplink</description>"), "{xml}");
}

#[test]
fn comments_are_skipped() {
    let (_dir, script) = write_temp("c.cli", "# setup\n!\n\nconfig\n");
    let output = schemash_cmd()
        .args(["run", SCHEMA, &script, "--output", "json"])
        .output()
        .expect("run script");

    let json = stdout_json(&output);
    assert_eq!(outcomes(&json), vec!["config-entered"]);
}

#[test]
fn stops_at_the_first_rejected_line() {
    let (_dir, script) = write_temp("bad.cli", "config\nbogus\nnetwork 1\n");
    let output = schemash_cmd()
        .args(["run", SCHEMA, &script, "--output", "json"])
        .output()
        .expect("run script");

    assert!(!output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["success"], false);
    assert_eq!(outcomes(&json), vec!["config-entered", "error"]);
    assert_eq!(json["lines"][1]["diagnostics"][0]["id"], "SCH1002");
}

#[test]
fn keep_going_runs_every_line() {
    let (_dir, script) = write_temp("bad.cli", "config\nbogus\nnetwork 1\n");
    let output = schemash_cmd()
        .args(["run", SCHEMA, &script, "--keep-going", "--output", "json"])
        .output()
        .expect("run script");

    assert!(!output.status.success());
    let json = stdout_json(&output);
    assert_eq!(outcomes(&json), vec!["config-entered", "error", "mode-entered"]);
    assert_eq!(json["prompt"], "schemash(config-net)#");
}

#[test]
fn candidate_changes_block_leaving_configuration() {
    let (_dir, profile) = write_temp(
        "lab.json",
        r#"{ "id": "lab", "schema_version": "1.0.0", "hostname": "lab1", "candidate_store": true }"#,
    );
    let (_sdir, script) = write_temp(
        "commit.cli",
        "config\nnetwork 1\n description x\nend\ncommit\nend\n",
    );
    let output = schemash_cmd()
        .args(["run", SCHEMA, &script, "--profile", &profile, "--output", "json"])
        .output()
        .expect("run script");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(outcomes(&json), vec![
        "config-entered",
        "mode-entered",
        "command",
        "vetoed",
        "commit",
        "config-exited",
    ]);
    let vetoed = &json["lines"][3]["diagnostics"][0];
    assert_eq!(vetoed["id"], "SCH2002");
    assert_eq!(vetoed["severity"], "info");
    assert_eq!(json["prompt"], "lab1>");
}

#[test]
fn pretty_prints_a_transcript() {
    let (_dir, script) = write_temp("t.cli", "config\nnetwork 8\n enabled maybe\n");
    let output = schemash_cmd()
        .args(["run", SCHEMA, &script, "--output", "pretty"])
        .output()
        .expect("run script");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("schemash> config"), "{stdout}");
    assert!(stdout.contains("schemash(config)# network 8"), "{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SCH1002"), "{stderr}");
    assert!(stderr.contains("t.cli:3"), "{stderr}");
}
