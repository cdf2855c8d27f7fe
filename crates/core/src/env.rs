//! Read-only context shared by fill, transition and matching.

use std::collections::HashSet;

use schemash_profile::Profile;
use schemash_schema::{ENGINE_EXTENSION_NS, ModuleId, Schema, SchemaKind, SchemaNodeId, Status};

use crate::behavior::BehaviorRegistry;
use crate::command::CommandRegistry;
use crate::flags::{Flag, FlagSet};
use crate::tree::{NodeId, NodeKind, Tree};

/// Namespaces and schema nodes never offered for completion.
#[derive(Debug, Clone, Default)]
pub struct Suppressions {
    modules: HashSet<ModuleId>,
    nodes: HashSet<SchemaNodeId>,
}

impl Suppressions {
    pub(crate) fn hide_module(&mut self, module: ModuleId) {
        self.modules.insert(module);
    }

    pub(crate) fn hide_node(&mut self, node: SchemaNodeId) {
        self.nodes.insert(node);
    }

    /// Whether `id` is suppressed by namespace, by path or by the `hidden`
    /// extension.
    pub fn hides(&self, schema: &Schema, id: SchemaNodeId) -> bool {
        let node = schema.node(id);
        node.module.is_some_and(|m| self.modules.contains(&m))
            || self.nodes.contains(&id)
            || node.extension_bool(ENGINE_EXTENSION_NS, "hidden") == Some(true)
    }
}

pub(crate) struct Env<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) profile: &'a Profile,
    pub(crate) commands: &'a CommandRegistry,
    pub(crate) behaviors: &'a BehaviorRegistry,
    pub(crate) suppressions: &'a Suppressions,
    pub(crate) config_state: bool,
    pub(crate) depth: usize,
    pub(crate) anchor: SchemaNodeId,
    pub(crate) generation: u64,
}

impl Env<'_> {
    /// Completion text of a node of `kind`.
    pub(crate) fn display(&self, kind: NodeKind) -> String {
        match kind {
            NodeKind::Schema(id) => self.schema.node(id).name.clone(),
            NodeKind::Value { leaf, index } => self.schema.values(leaf)[usize::from(index)]
                .display()
                .to_string(),
            NodeKind::Builtin(b) => b.keyword().to_string(),
            NodeKind::Functional(t) => self.commands.template(t).keyword.clone(),
            NodeKind::Behavior(b) => b.keyword().to_string(),
            NodeKind::InternalValue(ty) => ty.display().to_string(),
            NodeKind::WildcardValue(_) => "*".to_string(),
        }
    }

    /// Help text of a fat-tree node.
    pub(crate) fn help(&self, tree: &Tree, id: NodeId) -> String {
        match tree.kind(id) {
            NodeKind::Schema(sid) => {
                let node = self.schema.node(sid);
                let mut help = if node.description.is_empty() {
                    node.kind.to_string()
                } else {
                    node.description.clone()
                };
                if node.status == Status::Deprecated {
                    help.push_str(" (deprecated)");
                }
                help
            }
            NodeKind::Value { leaf, index } => {
                let d = &self.schema.values(leaf)[usize::from(index)];
                let leaf = self.schema.node(leaf);
                match (d.help(), &leaf.units) {
                    ("", _) => leaf.description.clone(),
                    (h, Some(units)) => format!("{h} ({units})"),
                    (h, None) => h.to_string(),
                }
            }
            NodeKind::Builtin(b) => b.help().to_string(),
            NodeKind::Behavior(b) => b.help().to_string(),
            NodeKind::Functional(t) => self.commands.template(t).help.clone(),
            NodeKind::InternalValue(ty) => tree
                .parent(id)
                .and_then(|p| match tree.kind(p) {
                    NodeKind::Functional(t) => self.commands.template(t).value.as_ref(),
                    _ => None,
                })
                .map_or_else(|| ty.display().to_string(), |v| v.help.clone()),
            NodeKind::WildcardValue(_) => "All entries".to_string(),
        }
    }

    /// Whether a schema child is offered below a node carrying `flags`.
    pub(crate) fn offers(&self, flags: &FlagSet, id: SchemaNodeId) -> bool {
        let node = self.schema.node(id);
        if self.suppressions.hides(self.schema, id) {
            return false;
        }
        match node.status {
            Status::Obsolete => return false,
            Status::Deprecated if flags.is_clear(Flag::ShowDeprecated) => return false,
            _ => {}
        }
        if flags.is_set(Flag::GenericGet) {
            if node.kind == SchemaKind::Rpc {
                return false;
            }
        } else if flags.is_set(Flag::ConfigOnly) && !node.config {
            return false;
        }
        if flags.is_set(Flag::ModePathOnly) && !(node.is_key || self.schema.is_mode(id)) {
            return false;
        }
        true
    }

    /// Whether two siblings exclude each other.
    pub(crate) fn conflicting(&self, a: NodeKind, b: NodeKind) -> bool {
        match (a, b) {
            (NodeKind::Schema(a), NodeKind::Schema(b)) => self.schema.conflicts(a, b),
            _ => false,
        }
    }
}
