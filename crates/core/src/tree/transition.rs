//! Where the next word is matched.
//!
//! [`next`] moves a [`Cursor`] after a node was matched: it fills the node
//! on first visit, then either stays (the next word is matched below it)
//! or pops to the parent, hiding what may not be typed again.

use schemash_schema::SchemaKind;
use tracing::trace;

use super::fill::{fill, refresh_list};
use super::{NodeId, NodeKind, Tree};
use crate::env::Env;
use crate::flags::Flag;

/// Parse position in the fat tree and its counterpart in the result tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Position in the fat tree.
    pub fat: NodeId,
    /// Position in the result tree.
    pub res: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Stay,
    Pop(Leave),
}

/// What the parent does with the node being left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leave {
    Keep,
    HideSelf,
    HideAll,
    /// Offer a fresh instance of an rpc-input list.
    Replace,
}

/// Compute the position for the following word.
pub(crate) fn next(env: &Env<'_>, fat: &mut Tree, res: &Tree, cur: &mut Cursor) {
    let id = cur.fat;
    let first = fat.flags(id).is_clear(Flag::Visited);
    if first {
        fat.flags_mut(id).set(Flag::Visited);
        fill(env, fat, id);
    }
    let step = if first {
        first_visit(env, fat, id)
    } else {
        repeat_visit(env, fat, id)
    };
    trace!(node = fat.node(id).display(), first, ?step, "next");
    let Step::Pop(leave) = step else {
        return;
    };
    let Some(parent) = fat.parent(id) else {
        return;
    };
    cur.fat = parent;
    cur.res = res.parent(cur.res).unwrap_or(cur.res);
    match leave {
        Leave::Keep => next(env, fat, res, cur),
        Leave::HideSelf => next_hide(env, fat, res, cur, id),
        Leave::HideAll => next_hide_all(env, fat, res, cur),
        Leave::Replace => {
            replace(env, fat, parent, id);
            next(env, fat, res, cur);
        }
    }
}

/// Hide `child` of the cursor node, then continue with [`next`].
pub(crate) fn next_hide(env: &Env<'_>, fat: &mut Tree, res: &Tree, cur: &mut Cursor, child: NodeId) {
    hide(env, fat, cur.fat, child);
    next(env, fat, res, cur);
}

/// Hide every child of the cursor node, then continue with [`next`].
pub(crate) fn next_hide_all(env: &Env<'_>, fat: &mut Tree, res: &Tree, cur: &mut Cursor) {
    fat.hide_all(cur.fat);
    next(env, fat, res, cur);
}

/// Stop offering `child` and every visible sibling it excludes.
///
/// Leaving a top-level command ends the sentence, so nothing stays offered
/// at the top.
pub(crate) fn hide(env: &Env<'_>, fat: &mut Tree, parent: NodeId, child: NodeId) {
    fat.hide(parent, child);
    let kind = fat.kind(child);
    if kind.is_command() && fat.flags(parent).is_set(Flag::ParseTop) {
        fat.hide_all(parent);
        return;
    }
    let excluded: Vec<NodeId> = fat
        .visible(parent)
        .filter(|&v| env.conflicting(kind, fat.kind(v)))
        .collect();
    for v in excluded {
        fat.hide(parent, v);
    }
}

fn replace(env: &Env<'_>, fat: &mut Tree, parent: NodeId, old: NodeId) {
    hide(env, fat, parent, old);
    let kind = fat.kind(old);
    let display = fat.node(old).display().to_string();
    let fresh = fat.add_child(parent, kind, display);
    fat.flags_mut(fresh).set_inherit(Flag::RpcInput);
    fat.show(parent, fresh);
}

fn first_visit(env: &Env<'_>, fat: &Tree, id: NodeId) -> Step {
    let flags = fat.flags(id);
    if flags.is_set(Flag::ParseTop) {
        return Step::Stay;
    }
    let empty = fat.visible_is_empty(id);
    match fat.kind(id) {
        NodeKind::Schema(sid) => {
            let node = env.schema.node(sid);
            let emptiable = node.kind.is_leafy()
                || (node.kind == SchemaKind::Container && node.presence);
            if emptiable && empty && flags.is_clear(Flag::ForceVisible) {
                Step::Pop(Leave::HideSelf)
            } else {
                Step::Stay
            }
        }
        NodeKind::Builtin(_) => Step::Pop(Leave::HideSelf),
        NodeKind::Behavior(_) | NodeKind::Functional(_) if empty => Step::Pop(Leave::HideSelf),
        NodeKind::Behavior(_) | NodeKind::Functional(_) => Step::Stay,
        kind => value_step(env, kind),
    }
}

fn repeat_visit(env: &Env<'_>, fat: &mut Tree, id: NodeId) -> Step {
    let flags = *fat.flags(id);
    if flags.is_set(Flag::ParseTop) {
        return Step::Stay;
    }
    match fat.kind(id) {
        NodeKind::Schema(sid) => {
            let node = env.schema.node(sid);
            match node.kind {
                SchemaKind::Leaf | SchemaKind::LeafList => {
                    if fat.visible_is_empty(id) {
                        Step::Pop(Leave::HideSelf)
                    } else {
                        Step::Stay
                    }
                }
                SchemaKind::List => {
                    refresh_list(env, fat, id, sid);
                    if flags.is_set(Flag::RpcInput) && fat.visible_is_empty(id) {
                        return Step::Pop(Leave::Replace);
                    }
                    container_step(fat, id, node.is_key)
                }
                _ => container_step(fat, id, node.is_key),
            }
        }
        NodeKind::Builtin(_) | NodeKind::Behavior(_) => Step::Pop(Leave::HideSelf),
        NodeKind::Functional(_) if fat.visible_is_empty(id) => Step::Pop(Leave::HideSelf),
        NodeKind::Functional(_) => Step::Stay,
        kind => value_step(env, kind),
    }
}

fn container_step(fat: &Tree, id: NodeId, is_key: bool) -> Step {
    let leave_when_done = is_key || fat.flags(id).is_set(Flag::PopToSibling);
    if fat.visible_is_empty(id) && leave_when_done {
        Step::Pop(Leave::HideSelf)
    } else {
        Step::Stay
    }
}

fn value_step(env: &Env<'_>, kind: NodeKind) -> Step {
    match kind {
        NodeKind::Value { leaf, .. } => {
            let node = env.schema.node(leaf);
            if node.kind == SchemaKind::LeafList {
                Step::Pop(Leave::Keep)
            } else if node.is_bits() {
                Step::Pop(Leave::HideSelf)
            } else {
                Step::Pop(Leave::HideAll)
            }
        }
        NodeKind::WildcardValue(_) => Step::Pop(Leave::HideAll),
        _ => Step::Pop(Leave::HideSelf),
    }
}
