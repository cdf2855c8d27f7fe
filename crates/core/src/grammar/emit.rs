//! XML emitter: renders a result or document tree as a data-model document.
//!
//! Behavioral nodes are transparent, leaf-list values become repeated
//! elements and removal boundaries carry `operation="delete"`. Wildcard
//! values (from `show`) render as empty selection elements.

use std::borrow::Cow;

use schemash_schema::{ModuleId, Schema, SchemaKind, SchemaNodeId};

use crate::tree::{NodeId, NodeKind, Tree};

// ── Configuration ───────────────────────────────────────────────────────

/// Configuration for the XML emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitConfig {
    /// Spaces per nesting level; `0` emits everything on one line.
    pub indent: usize,
    /// Emit `xmlns` where the module changes.
    pub namespaces: bool,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            namespaces: true,
        }
    }
}

// ── Public API ──────────────────────────────────────────────────────────

/// Emit the data nodes of `tree` as XML.
pub fn emit_xml(schema: &Schema, tree: &Tree, config: &EmitConfig) -> String {
    let mut w = Writer {
        schema,
        tree,
        config,
        out: String::new(),
    };
    w.children(tree.root(), 0, None);
    w.out
}

/// Escape text for element content and attribute values.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

// ── Writer ──────────────────────────────────────────────────────────────

struct Writer<'a> {
    schema: &'a Schema,
    tree: &'a Tree,
    config: &'a EmitConfig,
    out: String,
}

impl Writer<'_> {
    fn children(&mut self, id: NodeId, depth: usize, module: Option<ModuleId>) {
        for &c in self.tree.children(id) {
            self.node(c, depth, module);
        }
    }

    fn node(&mut self, id: NodeId, depth: usize, parent_module: Option<ModuleId>) {
        match self.tree.kind(id) {
            NodeKind::Schema(sid) => {
                let node = self.schema.node(sid);
                match node.kind {
                    SchemaKind::Root | SchemaKind::Choice | SchemaKind::Case | SchemaKind::Input => {
                        self.children(id, depth, parent_module);
                    }
                    SchemaKind::Leaf => {
                        let text = self.tree.node(id).value().filter(|v| *v != "*");
                        self.element(id, sid, depth, parent_module, text);
                    }
                    SchemaKind::LeafList => {
                        let values: Vec<&str> = self
                            .tree
                            .children(id)
                            .iter()
                            .filter_map(|&c| self.tree.node(c).value())
                            .filter(|v| *v != "*")
                            .collect();
                        if values.is_empty() {
                            self.element(id, sid, depth, parent_module, None);
                        }
                        for v in values {
                            self.element(id, sid, depth, parent_module, Some(v));
                        }
                    }
                    _ => {
                        let module = node.module.or(parent_module);
                        if self.tree.children(id).is_empty() {
                            self.line(depth, &format!("<{}{}/>", node.name, self.attrs(id, sid, parent_module)));
                            return;
                        }
                        self.line(depth, &format!("<{}{}>", node.name, self.attrs(id, sid, parent_module)));
                        self.children(id, depth + 1, module);
                        self.line(depth, &format!("</{}>", node.name));
                    }
                }
            }
            NodeKind::Behavior(_) => self.children(id, depth, parent_module),
            // Values render inside their leaf; commands are not data.
            _ => {}
        }
    }

    fn element(
        &mut self,
        id: NodeId,
        sid: SchemaNodeId,
        depth: usize,
        parent_module: Option<ModuleId>,
        text: Option<&str>,
    ) {
        let name = &self.schema.node(sid).name;
        let attrs = self.attrs(id, sid, parent_module);
        let line = match text {
            Some(t) => format!("<{name}{attrs}>{}</{name}>", escape(t)),
            None => format!("<{name}{attrs}/>"),
        };
        self.line(depth, &line);
    }

    fn attrs(&self, id: NodeId, sid: SchemaNodeId, parent_module: Option<ModuleId>) -> String {
        let mut attrs = String::new();
        let module = self.schema.node(sid).module;
        if self.config.namespaces && module.is_some() && module != parent_module {
            if let Some(m) = self.schema.module_of(sid) {
                attrs.push_str(&format!(" xmlns=\"{}\"", escape(&m.namespace)));
            }
        }
        if self.tree.is_delete(id) {
            attrs.push_str(" operation=\"delete\"");
        }
        attrs
    }

    fn line(&mut self, depth: usize, text: &str) {
        if self.config.indent > 0 {
            self.out.push_str(&" ".repeat(depth * self.config.indent));
        }
        self.out.push_str(text);
        if self.config.indent > 0 {
            self.out.push('\n');
        }
    }
}
