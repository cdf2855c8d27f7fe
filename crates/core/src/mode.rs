//! Mode stack.
//!
//! Each [`ModeState`] owns the path from the schema root down to its anchor
//! (list keys included), so a later parse can start from a clone of the
//! anchor and the serializer can rebuild absolute paths.

use schemash_schema::{ENGINE_EXTENSION_NS, Schema, SchemaKind, SchemaNodeId};
use tracing::debug;

use crate::error::ModeError;
use crate::grammar::parser::ParseLineResult;
use crate::tree::{Detached, NodeId, NodeKind, Tree};

/// Opaque handle to the external document node of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocHandle(pub u64);

/// One entry of the mode stack.
#[derive(Debug, Clone)]
pub struct ModeState {
    path: Tree,
    anchor: NodeId,
    doc: Option<DocHandle>,
}

impl ModeState {
    /// The root mode.
    pub fn root() -> Self {
        let path = Tree::new(Detached::new(NodeKind::Schema(SchemaNodeId::ROOT), ""));
        let anchor = path.root();
        Self {
            path,
            anchor,
            doc: None,
        }
    }

    /// Path from the schema root to the anchor.
    pub fn path(&self) -> &Tree {
        &self.path
    }

    /// Anchor node in [`path`](Self::path).
    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    /// Schema node of the anchor.
    pub fn anchor_schema(&self) -> SchemaNodeId {
        self.path
            .kind(self.anchor)
            .schema_id()
            .unwrap_or(SchemaNodeId::ROOT)
    }

    /// External document node.
    pub fn doc(&self) -> Option<DocHandle> {
        self.doc
    }

    /// Attach the external document node.
    pub fn set_doc(&mut self, doc: DocHandle) {
        self.doc = Some(doc);
    }

    /// Prompt fragment of the anchor.
    pub fn prompt(&self) -> Option<&str> {
        self.path.node(self.anchor).prompt()
    }
}

/// Bounded stack of modes; the root mode is always present.
#[derive(Debug, Clone)]
pub struct ModeStack {
    states: Vec<ModeState>,
    max_depth: usize,
    generation: u64,
}

impl ModeStack {
    /// A stack holding only the root mode.
    pub fn new(max_depth: usize) -> Self {
        Self {
            states: vec![ModeState::root()],
            max_depth: max_depth.max(1),
            generation: 0,
        }
    }

    /// Number of modes, the root included.
    pub fn depth(&self) -> usize {
        self.states.len()
    }

    /// Configured maximum depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Current mode.
    pub fn top(&self) -> &ModeState {
        // The root mode is never popped.
        &self.states[self.states.len() - 1]
    }

    /// Mutable current mode.
    pub fn top_mut(&mut self) -> &mut ModeState {
        let last = self.states.len() - 1;
        &mut self.states[last]
    }

    /// All modes, root first.
    pub fn states(&self) -> &[ModeState] {
        &self.states
    }

    /// Bumped on every push and pop; behavioral projections older than
    /// this are rebuilt.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Push an explicit path and anchor.
    pub fn push_tree(&mut self, path: Tree, anchor: NodeId) -> Result<(), ModeError> {
        self.push(ModeState {
            path,
            anchor,
            doc: None,
        })
    }

    /// Push a prepared state.
    pub fn push(&mut self, state: ModeState) -> Result<(), ModeError> {
        if self.states.len() >= self.max_depth {
            return Err(ModeError::DepthExceeded {
                max: self.max_depth,
            });
        }
        self.states.push(state);
        self.generation += 1;
        debug!(depth = self.states.len(), "mode pushed");
        Ok(())
    }

    /// Push the mode a parse result enters.
    ///
    /// The matched path down to the entry node is appended below the current
    /// anchor; behavioral nodes are skipped and list keys come along.
    pub fn push_result(&mut self, schema: &Schema, result: &ParseLineResult) -> Result<(), ModeError> {
        let entry = result.mode_entry.ok_or(ModeError::NoModeEntry)?;
        if self.states.len() >= self.max_depth {
            return Err(ModeError::DepthExceeded {
                max: self.max_depth,
            });
        }
        let src = &result.result;
        let top = self.top();
        let mut path = top.path.clone();
        let mut at = top.anchor;
        for &n in src.path_to(entry).iter().skip(1) {
            let NodeKind::Schema(sid) = src.kind(n) else {
                continue;
            };
            let copied = path.adopt(at, src.detach_clone(n));
            let node = schema.node(sid);
            let prompt = node
                .extension_str(ENGINE_EXTENSION_NS, "prompt")
                .unwrap_or(&node.name);
            path.set_prompt(copied, prompt);
            if node.kind == SchemaKind::List {
                for &key in src.children(n) {
                    path.graft(copied, src, key);
                }
            }
            at = copied;
        }
        let anchor = path
            .find_clone(top.anchor, src, src.root(), entry)
            .ok_or(ModeError::NoModeEntry)?;
        debug_assert_eq!(anchor, at);
        self.push_tree(path, anchor)
    }

    /// Pop until `depth` modes remain.
    pub fn pop_to_depth(&mut self, depth: usize) -> Result<(), ModeError> {
        if depth == 0 || depth > self.states.len() {
            return Err(ModeError::InvalidDepth {
                depth,
                current: self.states.len(),
            });
        }
        if depth < self.states.len() {
            self.states.truncate(depth);
            self.generation += 1;
            debug!(depth, "modes popped");
        }
        Ok(())
    }
}
