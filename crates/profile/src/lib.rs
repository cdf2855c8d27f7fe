//! CLI session profile definitions and validation for schemash.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default prompt hostname.
pub const DEFAULT_HOSTNAME: &str = "schemash";

/// Default bound on nested modes.
pub const DEFAULT_MAX_MODE_DEPTH: usize = 16;

/// Errors that can occur when loading or validating a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// JSON deserialization failed.
    #[error("invalid profile JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is out of its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

/// How list key values are entered.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyKeywords {
    /// Keys are typed positionally: `interface eth0`.
    #[default]
    Suppressed,
    /// Keys are typed with their name: `interface name eth0`.
    Shown,
}

/// A CLI session profile: how the engine presents a schema to a user.
///
/// # Example
/// ```
/// let profile = schemash_profile::Profile {
///     id: "lab-router".into(),
///     hostname: "r1".into(),
///     candidate_store: true,
///     ..Default::default()
/// };
/// assert_eq!(profile.max_mode_depth, 16);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Unique profile identifier.
    pub id: String,
    /// Profile schema version for forward compatibility (e.g., `"1.0.0"`).
    pub schema_version: String,
    /// Prompt prefix.
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Positional or named list keys.
    #[serde(default)]
    pub key_keywords: KeyKeywords,
    /// Leave a container as soon as one child has been given.
    #[serde(default)]
    pub pop_to_sibling: bool,
    /// The datastore keeps a candidate: offers `commit` and `discard`.
    #[serde(default)]
    pub candidate_store: bool,
    /// Maximum number of stacked modes, the root mode included.
    #[serde(default = "default_max_mode_depth")]
    pub max_mode_depth: usize,
    /// Offer nodes with `status: deprecated`.
    #[serde(default)]
    pub show_deprecated: bool,
    /// Module names or prefixes whose nodes are never offered.
    #[serde(default)]
    pub hidden_namespaces: Vec<String>,
    /// Schema paths (`a/b/c`) never offered.
    #[serde(default)]
    pub hidden_paths: Vec<String>,
}

fn default_hostname() -> String {
    DEFAULT_HOSTNAME.to_string()
}

fn default_max_mode_depth() -> usize {
    DEFAULT_MAX_MODE_DEPTH
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            id: "default".into(),
            schema_version: "1.0.0".into(),
            hostname: default_hostname(),
            key_keywords: KeyKeywords::default(),
            pop_to_sibling: false,
            candidate_store: false,
            max_mode_depth: DEFAULT_MAX_MODE_DEPTH,
            show_deprecated: false,
            hidden_namespaces: Vec::new(),
            hidden_paths: Vec::new(),
        }
    }
}

impl Profile {
    /// Whether list keys are entered positionally.
    pub fn keys_positional(&self) -> bool {
        self.key_keywords == KeyKeywords::Suppressed
    }

    /// Check field ranges; [`load_profile_from_str`] calls this after
    /// deserializing.
    pub fn validate(&self) -> Result<(), ProfileError> {
        // -- Required string field validation --
        if self.id.trim().is_empty() {
            return Err(invalid("id", "must not be empty"));
        }
        if self.schema_version.trim().is_empty() {
            return Err(invalid("schema_version", "must not be empty"));
        }

        // -- Prompt validation --
        if self.hostname.is_empty() {
            return Err(invalid("hostname", "must not be empty"));
        }
        if self.hostname.chars().any(char::is_whitespace) {
            return Err(invalid(
                "hostname",
                format!("'{}' must not contain whitespace", self.hostname),
            ));
        }

        // -- Mode depth validation --
        if !(1..=256).contains(&self.max_mode_depth) {
            return Err(invalid(
                "max_mode_depth",
                format!("{} is outside 1..=256", self.max_mode_depth),
            ));
        }

        // -- Suppression validation --
        if let Some(ns) = self.hidden_namespaces.iter().find(|n| n.trim().is_empty()) {
            return Err(invalid("hidden_namespaces", format!("'{ns}' is empty")));
        }
        if let Some(p) = self
            .hidden_paths
            .iter()
            .find(|p| p.split('/').all(str::is_empty))
        {
            return Err(invalid("hidden_paths", format!("'{p}' names no node")));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ProfileError {
    ProfileError::InvalidField {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Load and validate a [`Profile`] from a JSON (or JSONC) string.
///
/// The `id` and `schema_version` fields are required. Performs structural
/// validation after deserialization:
/// - `id`, `schema_version` and `hostname` must be non-empty
/// - `hostname` must not contain whitespace
/// - `max_mode_depth` must be in range 1–256
/// - `hidden_namespaces` / `hidden_paths` entries must name something
pub fn load_profile_from_str(s: &str) -> Result<Profile, ProfileError> {
    let cleaned = schemash_jsonc_strip::strip_jsonc(s);
    let profile: Profile = serde_json::from_str(&cleaned)?;
    profile.validate()?;
    Ok(profile)
}
