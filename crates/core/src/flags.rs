//! Per-node control flags with three inheritance planes.
//!
//! Every parse node carries a [`FlagSet`]. The `set` plane is the node's
//! current value. The `inherit` plane is copied into every descendant
//! created below the node, and the `inherit_once` plane only into its
//! immediate children. A bit in either inherit plane always implies the
//! same bit in `set`.

use serde::Serialize;

/// Named control flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Flag {
    /// Node mirrors the schema root.
    Root,
    /// Node is the top of the current parse (the mode anchor clone).
    ParseTop,
    /// Node has been descended into during this parse.
    Visited,
    /// Children have been populated.
    ChildrenFilled,
    /// Visible subset has been populated from the children.
    VisibleFilled,
    /// List is offering its keys.
    KeysPending,
    /// All list keys were consumed; non-keys are offered.
    KeysDone,
    /// Key leaf entered positionally: its values are offered in its place.
    KeywordSuppressed,
    /// Lists offer key names as keywords and all keys at once.
    ShowKeyKeywords,
    /// Never treat the command as a mode entry.
    HideModes,
    /// Do not offer values of non-key leaves.
    HideValues,
    /// Offer only `config true` nodes.
    ConfigOnly,
    /// Offer only nodes that can lie on a mode path.
    ModePathOnly,
    /// Offer nodes with deprecated status.
    ShowDeprecated,
    /// Node itself is deprecated.
    Deprecated,
    /// Generic retrieval: state data, key wildcards, valueless leaves.
    GenericGet,
    /// The print hook recorded on this node may not be overridden below it.
    PrintHookSticky,
    /// App-data propagation is enabled for this tree.
    AppDataLookup,
    /// Leave a container once nothing is left to offer in it.
    PopToSibling,
    /// Inside an rpc input: lists may be entered repeatedly.
    RpcInput,
    /// Keep the node even if it offers nothing.
    ForceVisible,
    /// Node is the boundary of a removal.
    Delete,
    /// Reached through `config`: entering a mode also enters configuration.
    ConfigContext,
}

impl Flag {
    /// Every flag, in declaration order.
    pub const ALL: [Flag; 23] = [
        Flag::Root,
        Flag::ParseTop,
        Flag::Visited,
        Flag::ChildrenFilled,
        Flag::VisibleFilled,
        Flag::KeysPending,
        Flag::KeysDone,
        Flag::KeywordSuppressed,
        Flag::ShowKeyKeywords,
        Flag::HideModes,
        Flag::HideValues,
        Flag::ConfigOnly,
        Flag::ModePathOnly,
        Flag::ShowDeprecated,
        Flag::Deprecated,
        Flag::GenericGet,
        Flag::PrintHookSticky,
        Flag::AppDataLookup,
        Flag::PopToSibling,
        Flag::RpcInput,
        Flag::ForceVisible,
        Flag::Delete,
        Flag::ConfigContext,
    ];

    const fn bit(self) -> u32 {
        1 << (self as u8)
    }
}

/// Flags describing parse progress in one tree; dropped when a node is
/// cloned into another tree.
const TRANSIENT: u32 = Flag::Visited.bit()
    | Flag::ChildrenFilled.bit()
    | Flag::VisibleFilled.bit()
    | Flag::KeysPending.bit()
    | Flag::KeysDone.bit();

/// Three bit-planes of [`Flag`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlagSet {
    set: u32,
    inherit: u32,
    inherit_once: u32,
}

impl FlagSet {
    /// Empty set.
    pub const fn new() -> Self {
        Self {
            set: 0,
            inherit: 0,
            inherit_once: 0,
        }
    }

    /// Whether no flag is set on any plane.
    pub fn is_empty(&self) -> bool {
        self.set == 0 && self.inherit == 0 && self.inherit_once == 0
    }

    /// Current value of `flag`.
    pub fn is_set(&self, flag: Flag) -> bool {
        self.set & flag.bit() != 0
    }

    /// Negation of [`is_set`](Self::is_set).
    pub fn is_clear(&self, flag: Flag) -> bool {
        !self.is_set(flag)
    }

    /// Set the current value.
    pub fn set(&mut self, flag: Flag) {
        self.set |= flag.bit();
    }

    /// Clear the flag. Propagation stops too, so no inherit bit survives
    /// without its current bit.
    pub fn clear(&mut self, flag: Flag) {
        self.set &= !flag.bit();
        self.inherit &= !flag.bit();
        self.inherit_once &= !flag.bit();
    }

    /// Set the flag and propagate it to every descendant.
    pub fn set_inherit(&mut self, flag: Flag) {
        self.set |= flag.bit();
        self.inherit |= flag.bit();
    }

    /// Clear the flag and stop propagating it.
    pub fn clear_inherit(&mut self, flag: Flag) {
        self.set &= !flag.bit();
        self.inherit &= !flag.bit();
    }

    /// Set the flag and propagate it to immediate children only.
    pub fn set_inherit_once(&mut self, flag: Flag) {
        self.set |= flag.bit();
        self.inherit_once |= flag.bit();
    }

    /// Clear the flag and stop propagating it to children.
    pub fn clear_inherit_once(&mut self, flag: Flag) {
        self.set &= !flag.bit();
        self.inherit_once &= !flag.bit();
    }

    /// Whether `flag` propagates to every descendant.
    pub fn is_inherited(&self, flag: Flag) -> bool {
        self.inherit & flag.bit() != 0
    }

    /// Whether `flag` propagates to immediate children.
    pub fn is_inherited_once(&self, flag: Flag) -> bool {
        self.inherit_once & flag.bit() != 0
    }

    /// Flags of a child created below a node carrying `self`.
    pub fn copy_for_child(&self) -> FlagSet {
        FlagSet {
            set: self.inherit | self.inherit_once,
            inherit: self.inherit,
            inherit_once: 0,
        }
    }

    /// Re-parent a clone: take the new parent's inherited bits and drop
    /// parse-progress flags that only meant something in the source tree.
    pub fn clone_and_inherit(&mut self, parent: &FlagSet) {
        self.set |= parent.inherit | parent.inherit_once;
        self.inherit |= parent.inherit;
        self.set &= !TRANSIENT;
        self.inherit &= !TRANSIENT;
        self.inherit_once &= !TRANSIENT;
    }

    /// Plane-wise union with `other`.
    pub fn merge(&mut self, other: &FlagSet) {
        self.set |= other.set;
        self.inherit |= other.inherit;
        self.inherit_once |= other.inherit_once;
    }

    /// Flags currently set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Flag> + '_ {
        Flag::ALL.into_iter().filter(|f| self.is_set(*f))
    }
}

impl Serialize for FlagSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inherit_implies_set() {
        let mut f = FlagSet::new();
        f.set_inherit(Flag::ConfigOnly);
        f.set_inherit_once(Flag::HideModes);
        assert!(f.is_set(Flag::ConfigOnly));
        assert!(f.is_set(Flag::HideModes));
        f.clear(Flag::ConfigOnly);
        assert!(!f.is_inherited(Flag::ConfigOnly));
        f.clear_inherit_once(Flag::HideModes);
        assert!(f.is_clear(Flag::HideModes));
    }

    #[test]
    fn inherit_reaches_all_descendants() {
        let mut top = FlagSet::new();
        top.set_inherit(Flag::GenericGet);
        let child = top.copy_for_child();
        let grandchild = child.copy_for_child();
        let great = grandchild.copy_for_child();
        assert!(child.is_set(Flag::GenericGet));
        assert!(grandchild.is_set(Flag::GenericGet));
        assert!(great.is_set(Flag::GenericGet));
    }

    #[test]
    fn inherit_once_reaches_children_only() {
        let mut top = FlagSet::new();
        top.set_inherit_once(Flag::ForceVisible);
        let child = top.copy_for_child();
        assert!(child.is_set(Flag::ForceVisible));
        assert!(child.copy_for_child().is_clear(Flag::ForceVisible));
    }

    #[test]
    fn plain_set_is_not_propagated() {
        let mut top = FlagSet::new();
        top.set(Flag::ParseTop);
        assert!(top.copy_for_child().is_clear(Flag::ParseTop));
    }

    #[test]
    fn clone_and_inherit_drops_parse_progress() {
        let mut clone = FlagSet::new();
        clone.set(Flag::Visited);
        clone.set(Flag::KeysDone);
        clone.set_inherit(Flag::ChildrenFilled);
        clone.set(Flag::Delete);

        let mut parent = FlagSet::new();
        parent.set_inherit(Flag::HideValues);
        parent.set_inherit_once(Flag::ForceVisible);
        parent.set(Flag::Visited);

        clone.clone_and_inherit(&parent);
        assert!(clone.is_clear(Flag::Visited));
        assert!(clone.is_clear(Flag::KeysDone));
        assert!(clone.is_clear(Flag::ChildrenFilled));
        assert!(!clone.is_inherited(Flag::ChildrenFilled));
        assert!(clone.is_set(Flag::Delete));
        assert!(clone.is_set(Flag::HideValues));
        assert!(clone.is_inherited(Flag::HideValues));
        assert!(clone.is_set(Flag::ForceVisible));
        assert!(!clone.is_inherited_once(Flag::ForceVisible));
    }

    #[test]
    fn merge_unions_every_plane() {
        let mut a = FlagSet::new();
        a.set(Flag::ParseTop);
        let mut b = FlagSet::new();
        b.set_inherit(Flag::HideModes);
        b.set_inherit_once(Flag::ForceVisible);
        a.merge(&b);
        assert!(a.is_set(Flag::ParseTop));
        assert!(a.is_inherited(Flag::HideModes));
        assert!(a.is_inherited_once(Flag::ForceVisible));
    }

    #[test]
    fn every_flag_has_a_distinct_bit() {
        let mut seen = 0u32;
        for f in Flag::ALL {
            assert_eq!(seen & f.bit(), 0, "{f:?} overlaps");
            seen |= f.bit();
        }
    }

    #[test]
    fn serializes_as_flag_names() {
        let mut f = FlagSet::new();
        f.set(Flag::Delete);
        f.set(Flag::Root);
        assert_eq!(serde_json::to_string(&f).unwrap(), r#"["root","delete"]"#);
    }
}
