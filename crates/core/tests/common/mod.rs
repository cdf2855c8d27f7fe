//! Shared test helpers for `schemash_core` integration tests.

#![allow(unreachable_pub)]

use std::sync::{Arc, LazyLock};

use schemash_core::{Completion, Engine, Outcome};
use schemash_profile::Profile;
use schemash_schema::{Schema, load_schema_from_path};

/// Fixture schema loaded once per test binary via LazyLock.
pub static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/test-schema.json");
    let schema = load_schema_from_path(&path)
        .unwrap_or_else(|e| panic!("failed to load {}: {}", path.display(), e));
    Arc::new(schema)
});

/// Engine over the fixture with the default profile, operational root.
pub fn engine() -> Engine {
    engine_with(Profile::default())
}

/// Engine over the fixture with a custom profile.
pub fn engine_with(profile: Profile) -> Engine {
    Engine::new(Arc::clone(&SCHEMA), profile).expect("fixture profile is valid")
}

/// Engine that has already entered configuration.
#[allow(dead_code)]
pub fn config_engine() -> Engine {
    let mut e = engine();
    enter_config(&mut e);
    e
}

/// Run `config` and check it was accepted.
#[allow(dead_code)]
pub fn enter_config(e: &mut Engine) {
    let outcome = e.execute_line("config").expect("config parses");
    assert!(matches!(outcome, Outcome::ConfigEntered), "got {outcome:?}");
}

/// Completion labels in offer order.
#[allow(dead_code)]
pub fn labels(completions: &[Completion]) -> Vec<String> {
    completions.iter().map(|c| c.label().to_string()).collect()
}

/// Schema node id of a fixture path.
#[allow(dead_code)]
pub fn sid(path: &str) -> schemash_schema::SchemaNodeId {
    SCHEMA
        .find_path(path)
        .unwrap_or_else(|| panic!("fixture has no node {path}"))
}
