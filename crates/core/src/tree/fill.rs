//! Lazy population of children and visible subsets.
//!
//! A fat-tree node is filled on its first visit. Behavioral nodes are the
//! exception: their children re-project the mode anchor and are rebuilt
//! whenever the node's generation lags the mode stack's.

use schemash_schema::{SchemaKind, SchemaNodeId};
use tracing::trace;

use super::{NodeId, NodeKind, Tree};
use crate::behavior::BehaviorKind;
use crate::env::Env;
use crate::flags::Flag;

/// Populate `id` if it has not been populated yet.
pub(crate) fn fill(env: &Env<'_>, tree: &mut Tree, id: NodeId) {
    let kind = tree.kind(id);
    if let NodeKind::Behavior(b) = kind {
        if tree.flags(id).is_set(Flag::ChildrenFilled)
            && tree.generation(id) == Some(env.generation)
        {
            return;
        }
        tree.clear_children(id);
        fill_behavior(env, tree, id, b);
        tree.set_generation(id, env.generation);
        mark_filled(tree, id);
        return;
    }
    if tree.flags(id).is_set(Flag::ChildrenFilled) {
        return;
    }
    match kind {
        NodeKind::Schema(sid) if tree.flags(id).is_set(Flag::ParseTop) => {
            fill_top(env, tree, id, sid);
        }
        NodeKind::Schema(sid) => match env.schema.node(sid).kind {
            SchemaKind::Leaf | SchemaKind::LeafList => fill_values(env, tree, id, sid),
            SchemaKind::List => refresh_list(env, tree, id, sid),
            _ => fill_schema_children(env, tree, id, sid, false),
        },
        NodeKind::Functional(t) => {
            let template = env.commands.template(t);
            for &child in &template.children {
                add_offered(env, tree, id, NodeKind::Functional(child));
            }
            if let Some(v) = &template.value {
                add_offered(env, tree, id, NodeKind::InternalValue(v.ty));
            }
        }
        _ => {}
    }
    mark_filled(tree, id);
    trace!(node = tree.node(id).display(), children = tree.children(id).len(), "filled");
}

fn mark_filled(tree: &mut Tree, id: NodeId) {
    let flags = tree.flags_mut(id);
    flags.set(Flag::ChildrenFilled);
    flags.set(Flag::VisibleFilled);
}

/// Create a child of `parent` and offer it.
fn add_offered(env: &Env<'_>, tree: &mut Tree, parent: NodeId, kind: NodeKind) -> NodeId {
    let id = tree.add_child(parent, kind, env.display(kind));
    match kind {
        NodeKind::Schema(sid) => {
            let node = env.schema.node(sid);
            let flags = tree.flags_mut(id);
            if node.status == schemash_schema::Status::Deprecated {
                flags.set(Flag::Deprecated);
            }
            if node.is_key && flags.is_clear(Flag::ShowKeyKeywords) {
                flags.set(Flag::KeywordSuppressed);
            }
            if node.kind == SchemaKind::Container && node.presence && env.schema.is_mode(sid) {
                flags.set(Flag::ForceVisible);
            }
            if node.kind == SchemaKind::Rpc {
                flags.set_inherit(Flag::RpcInput);
            }
        }
        NodeKind::Behavior(b) => tree.flags_mut(id).merge(&b.overlay()),
        _ => {}
    }
    tree.show(parent, id);
    id
}

/// The top of a parse: the mode anchor's children plus injected commands.
fn fill_top(env: &Env<'_>, tree: &mut Tree, id: NodeId, sid: SchemaNodeId) {
    let flags = *tree.flags(id);
    match env.schema.node(sid).kind {
        SchemaKind::List => {
            fill_schema_children(env, tree, id, sid, true);
            tree.flags_mut(id).set(Flag::KeysDone);
        }
        SchemaKind::Leaf | SchemaKind::LeafList => fill_values(env, tree, id, sid),
        _ => {
            let operational_root = sid == SchemaNodeId::ROOT && !env.config_state;
            for &child in env.schema.data_children(sid) {
                if operational_root && env.schema.node(child).kind != SchemaKind::Rpc {
                    continue;
                }
                if env.offers(&flags, child) {
                    add_offered(env, tree, id, NodeKind::Schema(child));
                }
            }
        }
    }
    if flags.is_set(Flag::ModePathOnly) {
        return;
    }
    if env.depth == 1 && !env.config_state {
        for t in env.commands.top_level() {
            add_offered(env, tree, id, NodeKind::Functional(t));
        }
    }
    for kind in env.behaviors.injected(env.config_state, env.depth) {
        add_offered(env, tree, id, kind);
    }
}

fn fill_schema_children(
    env: &Env<'_>,
    tree: &mut Tree,
    id: NodeId,
    sid: SchemaNodeId,
    skip_keys: bool,
) {
    let flags = *tree.flags(id);
    for &child in env.schema.data_children(sid) {
        if skip_keys && env.schema.node(child).is_key {
            continue;
        }
        if env.offers(&flags, child) {
            add_offered(env, tree, id, NodeKind::Schema(child));
        }
    }
}

/// Value alternatives of a leaf or leaf-list.
///
/// Under a generic get the value is optional: it is offered, but the
/// sentence is complete without it.
fn fill_values(env: &Env<'_>, tree: &mut Tree, id: NodeId, sid: SchemaNodeId) {
    let flags = *tree.flags(id);
    let node = env.schema.node(sid);
    let generic = flags.is_set(Flag::GenericGet);
    if !node.is_key && flags.is_set(Flag::HideValues) {
        return;
    }
    for index in 0..node.values.len() {
        let index = u16::try_from(index).unwrap_or(u16::MAX);
        add_offered(env, tree, id, NodeKind::Value { leaf: sid, index });
    }
    if node.is_key && generic {
        add_offered(env, tree, id, NodeKind::WildcardValue(sid));
    }
}

/// Advance a list through its key phase.
///
/// Positional keys are offered one at a time in key order; named keys all
/// at once. When every key has been visited the non-key children follow.
pub(crate) fn refresh_list(env: &Env<'_>, tree: &mut Tree, id: NodeId, sid: SchemaNodeId) {
    let flags = *tree.flags(id);
    if flags.is_set(Flag::KeysDone) {
        return;
    }
    let keys = env.schema.keys(sid);
    let existing: Vec<Option<NodeId>> = keys
        .iter()
        .map(|&k| tree.find_child(id, NodeKind::Schema(k).clone_key()))
        .collect();
    let done = existing
        .iter()
        .all(|n| n.is_some_and(|n| tree.flags(n).is_set(Flag::Visited)));
    if done {
        let f = tree.flags_mut(id);
        f.clear(Flag::KeysPending);
        f.set(Flag::KeysDone);
        fill_schema_children(env, tree, id, sid, true);
        trace!(list = %env.schema.path(sid), "keys done");
        return;
    }
    tree.flags_mut(id).set(Flag::KeysPending);
    let positional = flags.is_clear(Flag::ShowKeyKeywords);
    for (&key, node) in keys.iter().zip(&existing) {
        match node {
            None => {
                add_offered(env, tree, id, NodeKind::Schema(key));
                if positional {
                    return;
                }
            }
            Some(n) if positional && tree.flags(*n).is_clear(Flag::Visited) => return,
            Some(_) => {}
        }
    }
}

/// Re-project the mode anchor below a behavioral node.
fn fill_behavior(env: &Env<'_>, tree: &mut Tree, id: NodeId, kind: BehaviorKind) {
    if !kind.projects() {
        return;
    }
    let anchor = match kind {
        BehaviorKind::Config => SchemaNodeId::ROOT,
        _ => env.anchor,
    };
    match env.schema.node(anchor).kind {
        SchemaKind::List => fill_schema_children(env, tree, id, anchor, true),
        SchemaKind::Leaf | SchemaKind::LeafList => {}
        _ => fill_schema_children(env, tree, id, anchor, false),
    }
}
