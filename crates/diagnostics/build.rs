//! Build script for generating diagnostic code data at compile time.
//!
//! Reads `data/diagnostics.jsonc` and generates:
//! - `generated_codes.rs`: public constants mapping constant names to ids
//! - `generated_explain.rs`: match expression mapping ids to descriptions
//! - `generated_severity.rs`: match expression mapping ids to default severity

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use schemash_jsonc_strip::strip_jsonc;

const HEADER: &str = "// Auto-generated from data/diagnostics.jsonc — DO NOT EDIT.\n\n";

fn main() {
    let catalogue_path = Path::new("data/diagnostics.jsonc");
    println!("cargo:rerun-if-changed={}", catalogue_path.display());

    let raw = fs::read_to_string(catalogue_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", catalogue_path.display()));

    let catalogue: serde_json::Value = serde_json::from_str(&strip_jsonc(&raw))
        .expect("failed to parse diagnostics.jsonc as JSON");

    let diagnostics = catalogue["diagnostics"]
        .as_array()
        .expect("diagnostics.jsonc: expected `diagnostics` array");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let out_path = Path::new(&out_dir);

    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut seen_names: HashSet<&str> = HashSet::new();

    let mut codes = String::from(HEADER);
    let mut explain = String::from("match id {\n");
    let mut severity = String::from("match id {\n");

    for (i, entry) in diagnostics.iter().enumerate() {
        let field = |name: &str| {
            entry[name]
                .as_str()
                .unwrap_or_else(|| panic!("diagnostics[{i}] missing string field `{name}`"))
        };
        let id = field("id");
        let const_name = field("constName");
        let summary = field("summary");
        let description = field("description");
        let sev = field("severity");

        assert!(
            id.len() == 7 && id.starts_with("SCH") && id[3..].bytes().all(|b| b.is_ascii_digit()),
            "diagnostics[{i}]: id '{id}' must look like SCHnnnn"
        );
        assert!(
            !const_name.is_empty()
                && const_name
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
                && const_name.as_bytes()[0].is_ascii_uppercase(),
            "diagnostics[{i}] (id={id}): constName '{const_name}' is not SCREAMING_SNAKE_CASE"
        );
        assert!(seen_ids.insert(id), "diagnostics[{i}]: duplicate id '{id}'");
        assert!(
            seen_names.insert(const_name),
            "diagnostics[{i}] (id={id}): duplicate constName '{const_name}'"
        );

        let sev_rs = match sev {
            "error" => "Severity::Error",
            "warn" => "Severity::Warn",
            "info" => "Severity::Info",
            other => panic!("diagnostics[{i}] (id={id}): invalid severity '{other}'"),
        };

        codes.push_str(&format!("/// {summary}\n"));
        codes.push_str(&format!("pub const {const_name}: &str = \"{id}\";\n\n"));
        explain.push_str(&format!(
            "    \"{id}\" => Some(\"{}\"),\n",
            escape_rust_string_literal(description)
        ));
        severity.push_str(&format!("    \"{id}\" => Some({sev_rs}),\n"));
    }

    explain.push_str("    _ => None,\n}\n");
    severity.push_str("    _ => None,\n}\n");

    fs::write(out_path.join("generated_codes.rs"), codes)
        .expect("failed to write generated_codes.rs");
    fs::write(out_path.join("generated_explain.rs"), explain)
        .expect("failed to write generated_explain.rs");
    fs::write(
        out_path.join("generated_severity.rs"),
        format!("{HEADER}{severity}"),
    )
    .expect("failed to write generated_severity.rs");
}

fn escape_rust_string_literal(value: &str) -> String {
    value.chars().flat_map(char::escape_default).collect()
}
