//! Schema-file input structures.
//!
//! These mirror the JSON document one-to-one and are only used while
//! building a [`Schema`](crate::Schema); the engine never sees them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::TypeDef;

/// Top-level schema document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDef {
    /// Modules in load order.
    #[serde(default)]
    pub modules: Vec<ModuleDef>,
}

/// One module: a namespace with a short prefix and its top-level nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDef {
    /// Module name.
    pub name: String,
    /// Short prefix used to disambiguate colliding names (`prefix:name`).
    pub prefix: String,
    /// Namespace URI.
    pub namespace: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Top-level data nodes and RPCs.
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
}

/// Statement kind of a schema node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKindDef {
    /// Structural grouping.
    Container,
    /// Keyed collection of entries.
    List,
    /// Single value.
    Leaf,
    /// Ordered collection of values.
    LeafList,
    /// Mutually exclusive branches.
    Choice,
    /// One branch of a choice.
    Case,
    /// Remote procedure call.
    Rpc,
}

/// Lifecycle status of a node.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Fully supported.
    #[default]
    Current,
    /// Still accepted, hidden unless the profile shows deprecated nodes.
    Deprecated,
    /// Never offered.
    Obsolete,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Current => write!(f, "current"),
            Status::Deprecated => write!(f, "deprecated"),
            Status::Obsolete => write!(f, "obsolete"),
        }
    }
}

/// One node as written in the schema file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeDef {
    /// Statement kind.
    pub kind: NodeKindDef,
    /// Node name, unique among its data siblings.
    pub name: String,
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Explicit config flag; inherited from the parent when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<bool>,
    /// Whether the node must be given (leaves, choices, rpc input).
    #[serde(default)]
    pub mandatory: bool,
    /// Presence container: meaningful on its own, without children.
    #[serde(default)]
    pub presence: bool,
    /// List key leaf names in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key: Vec<String>,
    /// Leaf type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeDef>,
    /// Child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDef>,
    /// RPC input parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input: Vec<NodeDef>,
    /// RPC output parameters (never parsed, kept for introspection).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output: Vec<NodeDef>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: Status,
    /// Default value text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Units shown in help.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Minimum number of entries for lists and leaf-lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_elements: Option<u32>,
    /// Extension statements, `{ namespace: { name: value } }`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}
