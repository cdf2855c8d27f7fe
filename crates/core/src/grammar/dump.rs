//! JSON views of parse results and trees.

use schemash_diagnostics::Diagnostic;
use schemash_schema::Schema;
use serde::Serialize;

use super::parser::{Completion, ParseLineResult};
use crate::error::ParseError;
use crate::flags::{Flag, FlagSet};
use crate::tree::{NodeId, NodeKind, Tree};

/// Serializable view of one tree node and its subtree.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    /// Node kind (`container`, `leaf`, `value`, `behavior`, ...).
    pub kind: String,
    /// Display text.
    pub name: String,
    /// Value, for leaves and values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Markers: removal boundary, deprecation.
    #[serde(skip_serializing_if = "FlagSet::is_empty")]
    pub flags: FlagSet,
    /// Children in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeView>,
}

/// Build the view of `id`'s subtree.
pub fn tree_view(schema: &Schema, tree: &Tree, id: NodeId) -> NodeView {
    let node = tree.node(id);
    let kind = match node.kind() {
        NodeKind::Schema(sid) => schema.node(sid).kind.to_string(),
        NodeKind::Value { .. } => "value".to_string(),
        NodeKind::Builtin(_) => "builtin".to_string(),
        NodeKind::Functional(_) => "command".to_string(),
        NodeKind::Behavior(_) => "behavior".to_string(),
        NodeKind::InternalValue(_) => "argument".to_string(),
        NodeKind::WildcardValue(_) => "wildcard".to_string(),
    };
    let mut flags = FlagSet::new();
    for f in [Flag::Delete, Flag::Deprecated] {
        if node.flags().is_set(f) {
            flags.set(f);
        }
    }
    NodeView {
        kind,
        name: node.display().to_string(),
        value: node.value().map(str::to_string),
        flags,
        children: tree
            .children(id)
            .iter()
            .map(|&c| tree_view(schema, tree, c))
            .collect(),
    }
}

/// Serializable summary of a [`ParseLineResult`].
#[derive(Debug, Serialize)]
pub struct ParseReport<'a> {
    /// The input line.
    pub line: &'a str,
    /// No word was rejected.
    pub success: bool,
    /// The matched words form a complete command.
    pub complete: bool,
    /// Words matched.
    pub consumed: usize,
    /// Print hook selected by the matched nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_hook: Option<&'a str>,
    /// Display text of the node that would open a mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_entry: Option<&'a str>,
    /// Mandatory inputs left unset.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    /// Completions for the next (or failing) word.
    pub completions: &'a [Completion],
    /// Parse error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a ParseError>,
    /// Diagnostics derived from the error.
    pub diagnostics: Vec<Diagnostic>,
    /// Result tree.
    pub result: NodeView,
}

/// Build the report of a parse result.
pub fn report<'a>(schema: &Schema, result: &'a ParseLineResult) -> ParseReport<'a> {
    ParseReport {
        line: &result.line,
        success: result.success,
        complete: result.complete,
        consumed: result.consumed,
        print_hook: result.print_hook.as_deref(),
        mode_entry: result
            .mode_entry
            .map(|n| result.result.node(n).display()),
        missing: result.check_for_mandatory(schema),
        completions: &result.completions,
        error: result.error.as_ref(),
        diagnostics: result.diagnostics(),
        result: tree_view(schema, &result.result, result.result.root()),
    }
}

/// Serialize a value to a pretty-printed JSON string.
pub fn to_pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).expect("report serialization cannot fail")
}
