//! Hierarchical data-model schema.
//!
//! A [`Schema`] is an arena of [`SchemaNode`]s loaded from a JSON (or JSONC)
//! document of modules. Loading resolves everything the engine asks for
//! repeatedly: effective `config`, list keys, flattened data children
//! (choice, case and rpc input are transparent), choice-branch membership
//! and leaf value descriptors. After loading the schema is read-only apart
//! from the per-node extension store.

mod defs;
pub mod types;

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

pub use defs::{ModuleDef, NodeDef, NodeKindDef, SchemaDef, Status};
pub use types::{IntKind, LeafType, TypeDef, TypeError, ValueDescriptor, ValueError, ValueKind};

/// Extension namespace recognized by the engine.
pub const ENGINE_EXTENSION_NS: &str = "schemash";

// ─── Identities ─────────────────────────────────────────────────────────────

/// Index of a node in its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaNodeId(u32);

impl SchemaNodeId {
    /// The synthetic root above every module's top-level nodes.
    pub const ROOT: SchemaNodeId = SchemaNodeId(0);

    /// Arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SchemaNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a module in its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(u32);

/// A loaded module.
#[derive(Debug, Clone)]
pub struct Module {
    /// Module name.
    pub name: String,
    /// Short prefix.
    pub prefix: String,
    /// Namespace URI.
    pub namespace: String,
    /// Description, empty when absent.
    pub description: String,
}

/// Statement kind of a loaded node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Synthetic root.
    Root,
    /// Container.
    Container,
    /// List.
    List,
    /// Leaf.
    Leaf,
    /// Leaf-list.
    LeafList,
    /// Choice.
    Choice,
    /// Case.
    Case,
    /// RPC.
    Rpc,
    /// RPC input (synthetic).
    Input,
    /// RPC output (synthetic).
    Output,
}

impl SchemaKind {
    /// Whether nodes of this kind appear in data trees.
    pub fn is_data(self) -> bool {
        matches!(
            self,
            SchemaKind::Container | SchemaKind::List | SchemaKind::Leaf | SchemaKind::LeafList
        )
    }

    /// Whether nodes of this kind carry a value.
    pub fn is_leafy(self) -> bool {
        matches!(self, SchemaKind::Leaf | SchemaKind::LeafList)
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SchemaKind::Root => "root",
            SchemaKind::Container => "container",
            SchemaKind::List => "list",
            SchemaKind::Leaf => "leaf",
            SchemaKind::LeafList => "leaf-list",
            SchemaKind::Choice => "choice",
            SchemaKind::Case => "case",
            SchemaKind::Rpc => "rpc",
            SchemaKind::Input => "input",
            SchemaKind::Output => "output",
        };
        f.write_str(s)
    }
}

/// A loaded schema node.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Node name.
    pub name: String,
    /// Owning module; `None` only for the root.
    pub module: Option<ModuleId>,
    /// Statement kind.
    pub kind: SchemaKind,
    /// Statement parent (choice, case and input included).
    pub parent: Option<SchemaNodeId>,
    /// Nearest data ancestor (rpc counts as data parent of its input).
    pub data_parent: Option<SchemaNodeId>,
    /// Help text, empty when absent.
    pub description: String,
    /// Effective config flag.
    pub config: bool,
    /// Declared mandatory.
    pub mandatory: bool,
    /// Presence container.
    pub presence: bool,
    /// Lifecycle status.
    pub status: Status,
    /// Default value text.
    pub default: Option<String>,
    /// Units.
    pub units: Option<String>,
    /// Minimum number of entries.
    pub min_elements: u32,
    /// Resolved leaf type.
    pub leaf_type: Option<LeafType>,
    /// Value alternatives, empty for non-leaves and `empty` leaves.
    pub values: Vec<ValueDescriptor>,
    /// Statement children in declaration order.
    pub children: Vec<SchemaNodeId>,
    /// Data children in declaration order, choice/case/input flattened.
    pub data_children: Vec<SchemaNodeId>,
    /// List keys in key order.
    pub keys: Vec<SchemaNodeId>,
    /// Whether this leaf is a key of its list.
    pub is_key: bool,
    /// `(choice, case)` pairs between this node and its data parent. A
    /// data node directly under a choice is its own case.
    pub branches: Vec<(SchemaNodeId, SchemaNodeId)>,
    /// Mandatory choices whose branches flatten into this node.
    pub mandatory_choices: Vec<SchemaNodeId>,
    /// Whether some data descendant must be given.
    pub has_mandatory_descendant: bool,
    /// Enclosing rpc when this node is part of an rpc input.
    pub rpc: Option<SchemaNodeId>,
    /// Extension statements, `namespace → name → value`.
    pub extensions: BTreeMap<String, BTreeMap<String, Value>>,
}

impl SchemaNode {
    fn root() -> Self {
        Self {
            name: String::new(),
            module: None,
            kind: SchemaKind::Root,
            parent: None,
            data_parent: None,
            description: String::new(),
            config: true,
            mandatory: false,
            presence: false,
            status: Status::Current,
            default: None,
            units: None,
            min_elements: 0,
            leaf_type: None,
            values: Vec::new(),
            children: Vec::new(),
            data_children: Vec::new(),
            keys: Vec::new(),
            is_key: false,
            branches: Vec::new(),
            mandatory_choices: Vec::new(),
            has_mandatory_descendant: false,
            rpc: None,
            extensions: BTreeMap::new(),
        }
    }

    /// Whether this node belongs to an rpc input.
    pub fn in_rpc_input(&self) -> bool {
        self.rpc.is_some()
    }

    /// Whether this node is a list with at least one key.
    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Leaf of type `empty`: presence-only, takes no value.
    pub fn is_empty_leaf(&self) -> bool {
        self.kind == SchemaKind::Leaf
            && self.leaf_type.as_ref().is_some_and(LeafType::is_empty_type)
    }

    /// Whether the leaf's values are bit sets.
    pub fn is_bits(&self) -> bool {
        self.leaf_type.as_ref().is_some_and(LeafType::is_bits)
    }

    /// Boolean extension value, `None` when absent or not a boolean.
    pub fn extension_bool(&self, ns: &str, name: &str) -> Option<bool> {
        self.extensions.get(ns)?.get(name)?.as_bool()
    }

    /// String extension value, `None` when absent or not a string.
    pub fn extension_str(&self, ns: &str, name: &str) -> Option<&str> {
        self.extensions.get(ns)?.get(name)?.as_str()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────────────

/// Errors produced while loading a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("failed to read schema '{path}': {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The document is not valid schema JSON.
    #[error("invalid schema JSON: {0}")]
    InvalidJson(String),
    /// Two modules share a name.
    #[error("duplicate module '{0}'")]
    DuplicateModule(String),
    /// Two modules share a prefix.
    #[error("duplicate module prefix '{0}'")]
    DuplicatePrefix(String),
    /// A leaf or leaf-list without a type.
    #[error("{path}: leaf has no type")]
    MissingType {
        /// Node path.
        path: String,
    },
    /// A type on a node that cannot carry one.
    #[error("{path}: only leaves and leaf-lists may declare a type")]
    UnexpectedType {
        /// Node path.
        path: String,
    },
    /// The type definition is inconsistent.
    #[error("{path}: {source}")]
    InvalidType {
        /// Node path.
        path: String,
        /// What is wrong with the type.
        source: TypeError,
    },
    /// A list key names no child.
    #[error("{path}: key '{key}' is not a child of the list")]
    UnknownKey {
        /// List path.
        path: String,
        /// Key name.
        key: String,
    },
    /// A list key names a non-leaf child.
    #[error("{path}: key '{key}' is not a leaf")]
    KeyNotLeaf {
        /// List path.
        path: String,
        /// Key name.
        key: String,
    },
    /// A config list without keys.
    #[error("{path}: config list must declare a key")]
    MissingKey {
        /// List path.
        path: String,
    },
    /// Two data siblings share a name.
    #[error("{path}: duplicate child '{name}'")]
    DuplicateChild {
        /// Parent path.
        path: String,
        /// Duplicated name.
        name: String,
    },
    /// A statement where its kind is not allowed.
    #[error("{path}: {reason}")]
    Misplaced {
        /// Node path.
        path: String,
        /// What is wrong.
        reason: &'static str,
    },
}

// ─── Schema ─────────────────────────────────────────────────────────────────

/// A loaded, resolved schema.
#[derive(Debug, Clone)]
pub struct Schema {
    modules: Vec<Module>,
    nodes: Vec<SchemaNode>,
}

/// Position of a definition while loading.
#[derive(Clone)]
struct Ctx {
    parent: SchemaNodeId,
    data_parent: SchemaNodeId,
    module: ModuleId,
    config: bool,
    branches: Vec<(SchemaNodeId, SchemaNodeId)>,
    rpc: Option<SchemaNodeId>,
    path: String,
}

impl Schema {
    /// Build a schema from its parsed document.
    pub fn from_def(def: SchemaDef) -> Result<Self, SchemaError> {
        let mut schema = Schema {
            modules: Vec::new(),
            nodes: vec![SchemaNode::root()],
        };
        for module in def.modules {
            if schema.modules.iter().any(|m| m.name == module.name) {
                return Err(SchemaError::DuplicateModule(module.name));
            }
            if schema.modules.iter().any(|m| m.prefix == module.prefix) {
                return Err(SchemaError::DuplicatePrefix(module.prefix));
            }
            let module_id = ModuleId(schema.modules.len() as u32);
            schema.modules.push(Module {
                name: module.name,
                prefix: module.prefix,
                namespace: module.namespace,
                description: module.description.unwrap_or_default(),
            });
            let ctx = Ctx {
                parent: SchemaNodeId::ROOT,
                data_parent: SchemaNodeId::ROOT,
                module: module_id,
                config: true,
                branches: Vec::new(),
                rpc: None,
                path: String::new(),
            };
            for node in &module.nodes {
                schema.add_node(node, &ctx)?;
            }
        }
        schema.mark_mandatory_descendants(SchemaNodeId::ROOT);
        Ok(schema)
    }

    fn push(&mut self, node: SchemaNode) -> SchemaNodeId {
        let id = SchemaNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn add_node(&mut self, def: &NodeDef, ctx: &Ctx) -> Result<SchemaNodeId, SchemaError> {
        let path = format!("{}/{}", ctx.path, def.name);
        let kind = match def.kind {
            NodeKindDef::Container => SchemaKind::Container,
            NodeKindDef::List => SchemaKind::List,
            NodeKindDef::Leaf => SchemaKind::Leaf,
            NodeKindDef::LeafList => SchemaKind::LeafList,
            NodeKindDef::Choice => SchemaKind::Choice,
            NodeKindDef::Case => SchemaKind::Case,
            NodeKindDef::Rpc => SchemaKind::Rpc,
        };
        let parent_kind = self.nodes[ctx.parent.index()].kind;
        if kind == SchemaKind::Case && parent_kind != SchemaKind::Choice {
            return Err(SchemaError::Misplaced {
                path,
                reason: "case outside of a choice",
            });
        }
        if kind == SchemaKind::Rpc && ctx.parent != SchemaNodeId::ROOT {
            return Err(SchemaError::Misplaced {
                path,
                reason: "rpc must be a top-level statement",
            });
        }
        if kind.is_leafy() && !def.children.is_empty() {
            return Err(SchemaError::Misplaced {
                path,
                reason: "leaves cannot have children",
            });
        }
        if kind != SchemaKind::Rpc && (!def.input.is_empty() || !def.output.is_empty()) {
            return Err(SchemaError::Misplaced {
                path,
                reason: "only an rpc may declare input or output",
            });
        }
        if kind == SchemaKind::Rpc && !def.children.is_empty() {
            return Err(SchemaError::Misplaced {
                path,
                reason: "rpc parameters belong in input or output",
            });
        }

        let leaf_type = match (&def.ty, kind.is_leafy()) {
            (Some(ty), true) => Some(LeafType::resolve(ty).map_err(|source| {
                SchemaError::InvalidType {
                    path: path.clone(),
                    source,
                }
            })?),
            (None, true) => return Err(SchemaError::MissingType { path }),
            (Some(_), false) => return Err(SchemaError::UnexpectedType { path }),
            (None, false) => None,
        };

        let config = if ctx.rpc.is_some() {
            true
        } else if kind == SchemaKind::Rpc {
            false
        } else {
            // config true under a config false parent is not representable.
            ctx.config && def.config.unwrap_or(true)
        };

        // A data node directly under a choice is its own (shorthand) case.
        let shorthand = parent_kind == SchemaKind::Choice && kind != SchemaKind::Case;

        let id = self.push(SchemaNode {
            name: def.name.clone(),
            module: Some(ctx.module),
            kind,
            parent: Some(ctx.parent),
            data_parent: Some(ctx.data_parent),
            description: def.description.clone().unwrap_or_default(),
            config,
            mandatory: def.mandatory,
            presence: def.presence,
            status: def.status,
            default: def.default.clone(),
            units: def.units.clone(),
            min_elements: def.min_elements.unwrap_or(0),
            values: leaf_type.as_ref().map(LeafType::descriptors).unwrap_or_default(),
            leaf_type,
            children: Vec::new(),
            data_children: Vec::new(),
            keys: Vec::new(),
            is_key: false,
            branches: Vec::new(),
            mandatory_choices: Vec::new(),
            has_mandatory_descendant: false,
            rpc: ctx.rpc,
            extensions: def.extensions.clone(),
        });
        self.nodes[ctx.parent.index()].children.push(id);

        let mut branches = ctx.branches.clone();
        if shorthand {
            branches.push((ctx.parent, id));
        }

        if kind.is_data() || kind == SchemaKind::Rpc {
            self.nodes[id.index()].branches = branches.clone();
            let siblings = &self.nodes[ctx.data_parent.index()].data_children;
            if siblings.iter().any(|s| {
                let other = &self.nodes[s.index()];
                other.name == def.name && other.module == Some(ctx.module)
            }) {
                return Err(SchemaError::DuplicateChild {
                    path: ctx.path.clone(),
                    name: def.name.clone(),
                });
            }
            self.nodes[ctx.data_parent.index()].data_children.push(id);
        }
        if kind == SchemaKind::Choice && def.mandatory {
            self.nodes[ctx.data_parent.index()]
                .mandatory_choices
                .push(id);
        }

        match kind {
            SchemaKind::Choice | SchemaKind::Case => {
                let mut inner = ctx.clone();
                inner.parent = id;
                inner.config = config;
                inner.path = path.clone();
                inner.branches = branches;
                if kind == SchemaKind::Case {
                    inner.branches.push((ctx.parent, id));
                }
                for child in &def.children {
                    self.add_node(child, &inner)?;
                }
            }
            SchemaKind::Rpc => {
                let input = self.add_synthetic(SchemaKind::Input, id, ctx, true);
                let mut inner = ctx.clone();
                inner.parent = input;
                inner.data_parent = id;
                inner.config = true;
                inner.rpc = Some(id);
                inner.path = path.clone();
                for child in &def.input {
                    self.add_node(child, &inner)?;
                }
                let output = self.add_synthetic(SchemaKind::Output, id, ctx, false);
                let mut inner = ctx.clone();
                inner.parent = output;
                inner.data_parent = output;
                inner.config = false;
                inner.path = format!("{path}/output");
                for child in &def.output {
                    self.add_node(child, &inner)?;
                }
            }
            SchemaKind::Container | SchemaKind::List => {
                let mut inner = ctx.clone();
                inner.parent = id;
                inner.data_parent = id;
                inner.config = config;
                inner.branches = Vec::new();
                inner.path = path.clone();
                for child in &def.children {
                    self.add_node(child, &inner)?;
                }
                if kind == SchemaKind::List {
                    self.resolve_keys(id, def, &path)?;
                }
            }
            _ => {}
        }
        Ok(id)
    }

    fn add_synthetic(
        &mut self,
        kind: SchemaKind,
        rpc: SchemaNodeId,
        ctx: &Ctx,
        config: bool,
    ) -> SchemaNodeId {
        let mut node = SchemaNode::root();
        node.name = kind.to_string();
        node.module = Some(ctx.module);
        node.kind = kind;
        node.parent = Some(rpc);
        node.data_parent = Some(rpc);
        node.config = config;
        let id = self.push(node);
        self.nodes[rpc.index()].children.push(id);
        id
    }

    fn resolve_keys(
        &mut self,
        list: SchemaNodeId,
        def: &NodeDef,
        path: &str,
    ) -> Result<(), SchemaError> {
        if def.key.is_empty() && self.nodes[list.index()].config {
            return Err(SchemaError::MissingKey {
                path: path.to_string(),
            });
        }
        let mut keys = Vec::with_capacity(def.key.len());
        for key in &def.key {
            let found = self.nodes[list.index()]
                .data_children
                .iter()
                .copied()
                .find(|c| self.nodes[c.index()].name == *key)
                .ok_or_else(|| SchemaError::UnknownKey {
                    path: path.to_string(),
                    key: key.clone(),
                })?;
            if self.nodes[found.index()].kind != SchemaKind::Leaf {
                return Err(SchemaError::KeyNotLeaf {
                    path: path.to_string(),
                    key: key.clone(),
                });
            }
            self.nodes[found.index()].is_key = true;
            keys.push(found);
        }
        self.nodes[list.index()].keys = keys;
        Ok(())
    }

    fn mark_mandatory_descendants(&mut self, id: SchemaNodeId) -> bool {
        let children = self.nodes[id.index()].data_children.clone();
        let mut any = !self.nodes[id.index()].mandatory_choices.is_empty();
        for child in children {
            let below = self.mark_mandatory_descendants(child);
            let node = &self.nodes[child.index()];
            any |= (node.mandatory && node.kind.is_leafy())
                || node.min_elements > 0
                || (node.kind == SchemaKind::Container && !node.presence && below);
        }
        self.nodes[id.index()].has_mandatory_descendant = any;
        any
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    /// The synthetic root.
    pub fn root(&self) -> SchemaNodeId {
        SchemaNodeId::ROOT
    }

    /// Node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this schema.
    pub fn node(&self, id: SchemaNodeId) -> &SchemaNode {
        &self.nodes[id.index()]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the schema has no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// All modules in load order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Module by id.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0 as usize]
    }

    /// Module owning `id`, `None` for the root.
    pub fn module_of(&self, id: SchemaNodeId) -> Option<&Module> {
        self.node(id).module.map(|m| self.module(m))
    }

    /// Module id by name or prefix.
    pub fn find_module(&self, name_or_prefix: &str) -> Option<ModuleId> {
        self.modules
            .iter()
            .position(|m| m.name == name_or_prefix || m.prefix == name_or_prefix)
            .map(|i| ModuleId(i as u32))
    }

    /// Data children of `id` (choice, case and rpc input flattened).
    pub fn data_children(&self, id: SchemaNodeId) -> &[SchemaNodeId] {
        &self.node(id).data_children
    }

    /// List keys of `id` in key order.
    pub fn keys(&self, id: SchemaNodeId) -> &[SchemaNodeId] {
        &self.node(id).keys
    }

    /// Value alternatives of a leaf or leaf-list.
    pub fn values(&self, id: SchemaNodeId) -> &[ValueDescriptor] {
        &self.node(id).values
    }

    /// Whether `a` and `b` sit in different cases of one choice.
    pub fn conflicts(&self, a: SchemaNodeId, b: SchemaNodeId) -> bool {
        if a == b {
            return false;
        }
        let (na, nb) = (self.node(a), self.node(b));
        if na.data_parent != nb.data_parent {
            return false;
        }
        na.branches.iter().any(|(choice, case)| {
            nb.branches
                .iter()
                .any(|(other_choice, other_case)| choice == other_choice && case != other_case)
        })
    }

    /// `prefix:name` of a node.
    pub fn qualified_name(&self, id: SchemaNodeId) -> String {
        let node = self.node(id);
        match self.module_of(id) {
            Some(m) => format!("{}:{}", m.prefix, node.name),
            None => node.name.clone(),
        }
    }

    /// Data path of a node, `/a/b/c`. Choice, case and input are skipped.
    pub fn path(&self, id: SchemaNodeId) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == SchemaNodeId::ROOT {
                break;
            }
            parts.push(self.node(c).name.as_str());
            cur = self.node(c).data_parent;
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    /// Data child of `parent` named `name` or `prefix:name`.
    pub fn find_child(&self, parent: SchemaNodeId, name: &str) -> Option<SchemaNodeId> {
        let (prefix, bare) = match name.split_once(':') {
            Some((p, n)) => (Some(p), n),
            None => (None, name),
        };
        self.data_children(parent).iter().copied().find(|&c| {
            let node = self.node(c);
            node.name == bare
                && prefix.is_none_or(|p| self.module_of(c).is_some_and(|m| m.prefix == p))
        })
    }

    /// Resolve `a/b/c` (optionally prefix-qualified, leading `/` allowed)
    /// from the root.
    pub fn find_path(&self, path: &str) -> Option<SchemaNodeId> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(SchemaNodeId::ROOT, |cur, seg| self.find_child(cur, seg))
    }

    /// Whether the node opens a mode when entered on its own.
    ///
    /// Config containers and lists do unless the `schemash:mode` extension
    /// says otherwise; everything else only when the extension says so.
    pub fn is_mode(&self, id: SchemaNodeId) -> bool {
        let node = self.node(id);
        if let Some(explicit) = node.extension_bool(ENGINE_EXTENSION_NS, "mode") {
            return explicit;
        }
        matches!(node.kind, SchemaKind::Container | SchemaKind::List)
            && node.config
            && !node.in_rpc_input()
    }

    /// Extension value on a node.
    pub fn extension(&self, id: SchemaNodeId, ns: &str, name: &str) -> Option<&Value> {
        self.node(id).extensions.get(ns)?.get(name)
    }

    /// Attach an extension value, returning the previous one.
    pub fn set_extension(
        &mut self,
        id: SchemaNodeId,
        ns: &str,
        name: &str,
        value: Value,
    ) -> Option<Value> {
        self.nodes[id.index()]
            .extensions
            .entry(ns.to_string())
            .or_default()
            .insert(name.to_string(), value)
    }

    /// Remove an extension value.
    pub fn clear_extension(&mut self, id: SchemaNodeId, ns: &str, name: &str) -> Option<Value> {
        let per_ns = self.nodes[id.index()].extensions.get_mut(ns)?;
        let old = per_ns.remove(name);
        if per_ns.is_empty() {
            self.nodes[id.index()].extensions.remove(ns);
        }
        old
    }

    /// Iterate over every node id, root first.
    pub fn ids(&self) -> impl Iterator<Item = SchemaNodeId> + '_ {
        (0..self.nodes.len()).map(|i| SchemaNodeId(i as u32))
    }
}

// ─── Loading ────────────────────────────────────────────────────────────────

/// Load a schema from JSON or JSONC text.
pub fn load_schema_from_str(text: &str) -> Result<Schema, SchemaError> {
    let cleaned = schemash_jsonc_strip::strip_jsonc(text);
    let def: SchemaDef =
        serde_json::from_str(&cleaned).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
    Schema::from_def(def)
}

/// Load a schema file.
pub fn load_schema_from_path(path: impl AsRef<Path>) -> Result<Schema, SchemaError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_schema_from_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        // comments and trailing commas are fine
        "modules": [{
            "name": "ifaces", "prefix": "if", "namespace": "urn:if",
            "nodes": [
                { "kind": "list", "name": "interface", "key": ["name"], "children": [
                    { "kind": "leaf", "name": "name", "type": { "base": "string" } },
                    { "kind": "choice", "name": "addr", "children": [
                        { "kind": "case", "name": "static", "children": [
                            { "kind": "leaf", "name": "ip", "type": { "base": "string" } },
                            { "kind": "leaf", "name": "mask", "type": { "base": "uint8" } },
                        ]},
                        { "kind": "leaf", "name": "dhcp", "type": { "base": "empty" } },
                    ]},
                    { "kind": "container", "name": "stats", "config": false, "children": [
                        { "kind": "leaf", "name": "rx", "type": { "base": "uint64" } },
                    ]},
                ]},
                { "kind": "rpc", "name": "reset", "input": [
                    { "kind": "leaf", "name": "target", "mandatory": true, "type": { "base": "string" } },
                ]},
            ]
        }]
    }"#;

    #[test]
    fn flattens_choice_into_data_children() {
        let s = load_schema_from_str(SMALL).unwrap();
        let iface = s.find_path("interface").unwrap();
        let names: Vec<_> = s
            .data_children(iface)
            .iter()
            .map(|c| s.node(*c).name.as_str())
            .collect();
        assert_eq!(names, vec!["name", "ip", "mask", "dhcp", "stats"]);
        assert_eq!(s.keys(iface).len(), 1);
        assert!(s.node(s.find_path("interface/name").unwrap()).is_key);
    }

    #[test]
    fn conflicts_follow_choice_branches() {
        let s = load_schema_from_str(SMALL).unwrap();
        let ip = s.find_path("interface/ip").unwrap();
        let mask = s.find_path("interface/mask").unwrap();
        let dhcp = s.find_path("interface/dhcp").unwrap();
        let name = s.find_path("interface/name").unwrap();
        assert!(s.conflicts(ip, dhcp));
        assert!(s.conflicts(dhcp, mask));
        assert!(!s.conflicts(ip, mask));
        assert!(!s.conflicts(ip, name));
        assert!(!s.conflicts(ip, ip));
    }

    #[test]
    fn config_is_inherited_and_rpc_input_is_config() {
        let s = load_schema_from_str(SMALL).unwrap();
        assert!(!s.node(s.find_path("interface/stats/rx").unwrap()).config);
        let target = s.find_path("reset/target").unwrap();
        assert!(s.node(target).config);
        assert!(s.node(target).in_rpc_input());
        assert!(!s.node(s.find_path("reset").unwrap()).config);
        assert!(s.node(s.find_path("reset").unwrap()).has_mandatory_descendant);
    }

    #[test]
    fn prefixed_lookup_and_paths() {
        let s = load_schema_from_str(SMALL).unwrap();
        let ip = s.find_path("/if:interface/if:ip").unwrap();
        assert_eq!(s.path(ip), "/interface/ip");
        assert_eq!(s.qualified_name(ip), "if:ip");
        assert!(s.find_path("other:interface").is_none());
    }

    #[test]
    fn mode_defaults_and_extension_override() {
        let mut s = load_schema_from_str(SMALL).unwrap();
        let iface = s.find_path("interface").unwrap();
        let stats = s.find_path("interface/stats").unwrap();
        assert!(s.is_mode(iface));
        assert!(!s.is_mode(stats));
        s.set_extension(iface, ENGINE_EXTENSION_NS, "mode", Value::Bool(false));
        assert!(!s.is_mode(iface));
        assert_eq!(
            s.clear_extension(iface, ENGINE_EXTENSION_NS, "mode"),
            Some(Value::Bool(false))
        );
        assert!(s.is_mode(iface));
    }

    #[test]
    fn rejects_keyless_config_list() {
        let err = load_schema_from_str(
            r#"{"modules":[{"name":"m","prefix":"m","namespace":"urn:m","nodes":[
                {"kind":"list","name":"l","children":[{"kind":"leaf","name":"x","type":{"base":"string"}}]}
            ]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::MissingKey { .. }));
    }

    #[test]
    fn rejects_unknown_key_and_missing_type() {
        let err = load_schema_from_str(
            r#"{"modules":[{"name":"m","prefix":"m","namespace":"urn:m","nodes":[
                {"kind":"list","name":"l","key":["id"],"children":[{"kind":"leaf","name":"x","type":{"base":"string"}}]}
            ]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownKey { ref key, .. } if key == "id"));

        let err = load_schema_from_str(
            r#"{"modules":[{"name":"m","prefix":"m","namespace":"urn:m","nodes":[
                {"kind":"leaf","name":"x"}
            ]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::MissingType { ref path } if path == "/x"));
    }

    #[test]
    fn rejects_duplicate_prefix() {
        let err = load_schema_from_str(
            r#"{"modules":[
                {"name":"a","prefix":"p","namespace":"urn:a"},
                {"name":"b","prefix":"p","namespace":"urn:b"}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicatePrefix(ref p) if p == "p"));
    }

    #[test]
    fn same_name_in_two_modules_is_allowed() {
        let s = load_schema_from_str(
            r#"{"modules":[
                {"name":"a","prefix":"a","namespace":"urn:a","nodes":[{"kind":"container","name":"sys"}]},
                {"name":"b","prefix":"b","namespace":"urn:b","nodes":[{"kind":"container","name":"sys"}]}
            ]}"#,
        )
        .unwrap();
        let a = s.find_path("a:sys").unwrap();
        let b = s.find_path("b:sys").unwrap();
        assert_ne!(a, b);
        assert_eq!(s.data_children(s.root()).len(), 2);
    }

    #[test]
    fn invalid_json_reports_error() {
        assert!(matches!(
            load_schema_from_str("{ not json"),
            Err(SchemaError::InvalidJson(_))
        ));
    }
}
