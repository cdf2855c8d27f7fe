//! Parse trees.
//!
//! A [`Tree`] is an arena of [`Node`]s. Each node owns its children (by
//! position in the arena), keeps a non-owning parent link, a separately
//! maintained *visible* subset used for completion, a [`FlagSet`] and an
//! optional value. Nodes are never copied between trees: they are cloned
//! into a [`Detached`] node and adopted by exactly one parent.
//!
//! Nodes in different trees correspond when their [`CloneKey`]s are equal.
//! [`Tree::find_clone`] follows that correspondence along a path.

pub(crate) mod fill;
pub(crate) mod transition;

pub use transition::Cursor;

use std::collections::{BTreeSet, HashMap};

use schemash_schema::SchemaNodeId;
use serde::Serialize;

use crate::behavior::{BehaviorKind, Builtin};
use crate::command::{PrimitiveType, TemplateId};
use crate::flags::{Flag, FlagSet};

/// Index of a node in its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The six node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Mirrors a schema node (root, container, list, leaf, leaf-list, rpc).
    Schema(SchemaNodeId),
    /// One value alternative of a leaf or leaf-list.
    Value {
        /// Owning leaf.
        leaf: SchemaNodeId,
        /// Index into the leaf's value descriptors.
        index: u16,
    },
    /// `exit` / `end`.
    Builtin(Builtin),
    /// A registered command keyword.
    Functional(TemplateId),
    /// `show`, `no`, `config`, `commit`, `discard`.
    Behavior(BehaviorKind),
    /// The value slot of a command keyword.
    InternalValue(PrimitiveType),
    /// Any value of a list key, in generic retrieval.
    WildcardValue(SchemaNodeId),
}

impl NodeKind {
    /// Schema node behind this node, if any.
    pub fn schema_id(&self) -> Option<SchemaNodeId> {
        match *self {
            NodeKind::Schema(id) | NodeKind::WildcardValue(id) => Some(id),
            NodeKind::Value { leaf, .. } => Some(leaf),
            _ => None,
        }
    }

    /// Whether the node stands for a typed or literal value.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            NodeKind::Value { .. } | NodeKind::InternalValue(_) | NodeKind::WildcardValue(_)
        )
    }

    /// Comparison record of this kind.
    pub fn clone_key(self) -> CloneKey {
        CloneKey(self)
    }

    /// Whether the node is a top-level command rather than data.
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            NodeKind::Builtin(_) | NodeKind::Behavior(_) | NodeKind::Functional(_)
        )
    }
}

/// Identity record compared to recognize clones across trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CloneKey(NodeKind);

/// A cloned node not yet adopted by any tree.
#[derive(Debug, Clone)]
pub struct Detached {
    kind: NodeKind,
    display: String,
    flags: FlagSet,
    value: Option<String>,
    prompt: Option<String>,
}

impl Detached {
    /// A fresh node.
    pub fn new(kind: NodeKind, display: impl Into<String>) -> Self {
        Self {
            kind,
            display: display.into(),
            flags: FlagSet::new(),
            value: None,
            prompt: None,
        }
    }

    /// Replace the flags.
    pub fn with_flags(mut self, flags: FlagSet) -> Self {
        self.flags = flags;
        self
    }

    /// Set the value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Flags, for adjustment before adoption.
    pub fn flags_mut(&mut self) -> &mut FlagSet {
        &mut self.flags
    }
}

/// One parse node.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    display: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    child_index: HashMap<CloneKey, NodeId>,
    visible: BTreeSet<(String, NodeId)>,
    flags: FlagSet,
    value: Option<String>,
    prompt: Option<String>,
    app_data: Vec<Option<SchemaNodeId>>,
    generation: Option<u64>,
}

impl Node {
    fn from_detached(d: Detached, parent: Option<NodeId>) -> Self {
        Self {
            kind: d.kind,
            display: d.display,
            parent,
            children: Vec::new(),
            child_index: HashMap::new(),
            visible: BTreeSet::new(),
            flags: d.flags,
            value: d.value,
            prompt: d.prompt,
            app_data: Vec::new(),
            generation: None,
        }
    }

    /// Variant.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Completion text.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Parent, `None` for the tree root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Owned children in discovery order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Flags.
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Parsed value.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Prompt fragment override.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Schema node carrying the nearest app-data value for `slot`.
    pub fn app_data(&self, slot: usize) -> Option<SchemaNodeId> {
        self.app_data.get(slot).copied().flatten()
    }

    /// Comparison record for clone recognition.
    pub fn clone_key(&self) -> CloneKey {
        CloneKey(self.kind)
    }
}

/// An arena of nodes with a single root.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// A tree whose root is `root`.
    pub fn new(root: Detached) -> Self {
        Self {
            nodes: vec![Node::from_detached(root, None)],
            root: NodeId(0),
        }
    }

    /// Root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever added.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to another tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Variant of a node.
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Flags of a node.
    pub fn flags(&self, id: NodeId) -> &FlagSet {
        &self.node(id).flags
    }

    /// Mutable flags of a node.
    pub fn flags_mut(&mut self, id: NodeId) -> &mut FlagSet {
        &mut self.node_mut(id).flags
    }

    /// Set a node's value.
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        self.node_mut(id).value = Some(value.into());
    }

    /// Set a node's prompt fragment.
    pub fn set_prompt(&mut self, id: NodeId, prompt: impl Into<String>) {
        self.node_mut(id).prompt = Some(prompt.into());
    }

    pub(crate) fn app_data_cache(&self, id: NodeId) -> &[Option<SchemaNodeId>] {
        &self.node(id).app_data
    }

    pub(crate) fn set_app_data(&mut self, id: NodeId, cache: Vec<Option<SchemaNodeId>>) {
        self.node_mut(id).app_data = cache;
    }

    pub(crate) fn generation(&self, id: NodeId) -> Option<u64> {
        self.node(id).generation
    }

    pub(crate) fn set_generation(&mut self, id: NodeId, generation: u64) {
        self.node_mut(id).generation = Some(generation);
    }

    /// Clone a node (not its children) into a detached node.
    pub fn detach_clone(&self, id: NodeId) -> Detached {
        let n = self.node(id);
        Detached {
            kind: n.kind,
            display: n.display.clone(),
            flags: n.flags,
            value: n.value.clone(),
            prompt: n.prompt.clone(),
        }
    }

    /// Adopt a cloned node below `parent`, merging the parent's inherited
    /// flags into it.
    pub fn adopt(&mut self, parent: NodeId, mut detached: Detached) -> NodeId {
        let parent_flags = self.node(parent).flags;
        detached.flags.clone_and_inherit(&parent_flags);
        self.attach(parent, detached)
    }

    /// Create a fresh child whose flags are derived from the parent's.
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind, display: impl Into<String>) -> NodeId {
        let flags = self.node(parent).flags.copy_for_child();
        self.attach(parent, Detached::new(kind, display).with_flags(flags))
    }

    fn attach(&mut self, parent: NodeId, detached: Detached) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let key = CloneKey(detached.kind);
        self.nodes.push(Node::from_detached(detached, Some(parent)));
        let p = self.node_mut(parent);
        p.children.push(id);
        p.child_index.insert(key, id);
        id
    }

    /// Forget a node's children and visible set. The orphans stay in the
    /// arena but are unreachable.
    pub(crate) fn clear_children(&mut self, id: NodeId) {
        let n = self.node_mut(id);
        n.children.clear();
        n.child_index.clear();
        n.visible.clear();
    }

    /// Latest child whose clone key is `key`.
    ///
    /// Repeated instances share a key (two entries of an rpc-input list,
    /// two values of a leaf-list); only the last one added is found.
    pub fn find_child(&self, parent: NodeId, key: CloneKey) -> Option<NodeId> {
        self.node(parent).child_index.get(&key).copied()
    }

    // ── Visible subset ──────────────────────────────────────────────────

    /// Offer `child` for completion.
    pub fn show(&mut self, parent: NodeId, child: NodeId) {
        debug_assert_eq!(self.parent(child), Some(parent));
        let key = (self.node(child).display.clone(), child);
        self.node_mut(parent).visible.insert(key);
    }

    /// Stop offering `child`. Returns whether it was visible.
    pub fn hide(&mut self, parent: NodeId, child: NodeId) -> bool {
        let key = (self.node(child).display.clone(), child);
        self.node_mut(parent).visible.remove(&key)
    }

    /// Stop offering every child.
    pub fn hide_all(&mut self, parent: NodeId) {
        self.node_mut(parent).visible.clear();
    }

    /// Offered children ordered by display text, then identity.
    pub fn visible(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(parent).visible.iter().map(|(_, id)| *id)
    }

    /// Whether nothing is offered below `parent`.
    pub fn visible_is_empty(&self, parent: NodeId) -> bool {
        self.node(parent).visible.is_empty()
    }

    /// Whether `child` is offered.
    pub fn is_visible(&self, parent: NodeId, child: NodeId) -> bool {
        let key = (self.node(child).display.clone(), child);
        self.node(parent).visible.contains(&key)
    }

    // ── Correspondence ─────────────────────────────────────────────────

    /// Whether `id` here and `other_id` in `other` are clones of each
    /// other. A node is never a clone of itself.
    pub fn is_clone(&self, id: NodeId, other: &Tree, other_id: NodeId) -> bool {
        if std::ptr::eq(self, other) && id == other_id {
            return false;
        }
        self.node(id).clone_key() == other.node(other_id).clone_key()
    }

    /// Given that `self_root` corresponds to `other_root`, find the node
    /// here corresponding to `other_node` (a descendant of `other_root`).
    ///
    /// Behavioral nodes on the other side are transparent: their children
    /// are projections of the anchor's children. Each step resolves through
    /// [`Tree::find_child`], so where several instances share a clone key
    /// the last instance is returned.
    pub fn find_clone(
        &self,
        self_root: NodeId,
        other: &Tree,
        other_root: NodeId,
        other_node: NodeId,
    ) -> Option<NodeId> {
        if self.node(self_root).clone_key() != other.node(other_root).clone_key() {
            return None;
        }
        let mut path = Vec::new();
        let mut cur = other_node;
        while cur != other_root {
            if !matches!(other.kind(cur), NodeKind::Behavior(_)) {
                path.push(other.node(cur).clone_key());
            }
            cur = other.parent(cur)?;
        }
        path.iter()
            .rev()
            .try_fold(self_root, |at, key| self.find_child(at, *key))
    }

    /// `id` and its ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |n| self.parent(*n))
    }

    /// Root-to-`id` path, both ends included.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path: Vec<_> = self.ancestors(id).collect();
        path.reverse();
        path
    }

    /// Depth-first copy of `other_node`'s subtree below `parent`.
    pub fn graft(&mut self, parent: NodeId, other: &Tree, other_node: NodeId) -> NodeId {
        let id = self.adopt(parent, other.detach_clone(other_node));
        for &child in other.children(other_node) {
            self.graft(id, other, child);
        }
        id
    }

    /// Whether a node is marked as the boundary of a removal.
    pub fn is_delete(&self, id: NodeId) -> bool {
        self.flags(id).is_set(Flag::Delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_node(id: SchemaNodeId) -> Detached {
        Detached::new(NodeKind::Schema(id), "n")
    }

    #[test]
    fn clone_is_mutual_and_never_reflexive() {
        let tree = Tree::new(schema_node(SchemaNodeId::ROOT));
        let other = Tree::new(tree.detach_clone(tree.root()));
        assert!(tree.is_clone(tree.root(), &other, other.root()));
        assert!(other.is_clone(other.root(), &tree, tree.root()));
        assert!(!tree.is_clone(tree.root(), &tree, tree.root()));
    }

    #[test]
    fn adopt_applies_parent_inheritance() {
        let mut root_flags = FlagSet::new();
        root_flags.set_inherit(Flag::ConfigOnly);
        let mut tree = Tree::new(schema_node(SchemaNodeId::ROOT).with_flags(root_flags));
        let mut d = Detached::new(NodeKind::Builtin(Builtin::Exit), "exit");
        d.flags_mut().set(Flag::Visited);
        let id = tree.adopt(tree.root(), d);
        assert!(tree.flags(id).is_set(Flag::ConfigOnly));
        assert!(tree.flags(id).is_clear(Flag::Visited));
        assert_eq!(tree.parent(id), Some(tree.root()));
    }

    #[test]
    fn visible_is_ordered_by_display() {
        let mut tree = Tree::new(schema_node(SchemaNodeId::ROOT));
        let r = tree.root();
        let b = tree.add_child(r, NodeKind::Behavior(BehaviorKind::Show), "show");
        let a = tree.add_child(r, NodeKind::Builtin(Builtin::End), "end");
        tree.show(r, b);
        tree.show(r, a);
        assert_eq!(tree.visible(r).collect::<Vec<_>>(), vec![a, b]);
        assert!(tree.hide(r, a));
        assert!(!tree.hide(r, a));
        assert!(!tree.is_visible(r, a));
        tree.hide_all(r);
        assert!(tree.visible_is_empty(r));
        assert_eq!(tree.children(r).len(), 2);
    }

    #[test]
    fn find_clone_walks_corresponding_path() {
        let mut fat = Tree::new(schema_node(SchemaNodeId::ROOT));
        let r = fat.root();
        let show = fat.add_child(r, NodeKind::Behavior(BehaviorKind::Show), "show");
        let exit = fat.add_child(show, NodeKind::Builtin(Builtin::Exit), "exit");

        let mut other = Tree::new(fat.detach_clone(r));
        let o_exit = other.adopt(other.root(), fat.detach_clone(exit));

        // `show` is transparent, so `exit` below it maps to `exit` below the root.
        assert_eq!(other.find_clone(other.root(), &fat, r, exit), Some(o_exit));
        assert_eq!(other.find_clone(other.root(), &fat, r, r), Some(other.root()));
        let end = fat.add_child(r, NodeKind::Builtin(Builtin::End), "end");
        assert_eq!(other.find_clone(other.root(), &fat, r, end), None);
    }

    #[test]
    fn repeated_instances_resolve_to_the_last() {
        let mut fat = Tree::new(schema_node(SchemaNodeId::ROOT));
        let r = fat.root();
        let first = fat.add_child(r, NodeKind::Builtin(Builtin::Exit), "exit");
        let second = fat.add_child(r, NodeKind::Builtin(Builtin::Exit), "exit");
        let key = fat.node(first).clone_key();
        assert_eq!(fat.find_child(r, key), Some(second));

        let mut other = Tree::new(fat.detach_clone(r));
        let o_first = other.adopt(other.root(), fat.detach_clone(first));
        let o_second = other.adopt(other.root(), fat.detach_clone(second));
        assert_ne!(o_first, o_second);
        assert_eq!(other.find_clone(other.root(), &fat, r, first), Some(o_second));
    }

    #[test]
    fn graft_copies_subtree_with_values() {
        let mut src = Tree::new(schema_node(SchemaNodeId::ROOT));
        let r = src.root();
        let f = src.add_child(r, NodeKind::InternalValue(PrimitiveType::String), "<string>");
        src.set_value(f, "hello");
        let mut dst = Tree::new(src.detach_clone(r));
        let copied = dst.graft(dst.root(), &src, f);
        assert_eq!(dst.node(copied).value(), Some("hello"));
        assert!(dst.is_clone(copied, &src, f));
    }
}
