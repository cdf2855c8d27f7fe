//! Built-in and behavioral top-level nodes.
//!
//! `exit` / `end` leave modes. `show`, `no`, `config`, `commit` and
//! `discard` are behavioral: instead of owning descendants they re-project
//! the current mode anchor's schema children, with a flag overlay that
//! changes how that projection is filtered.

use serde::Serialize;

use crate::flags::{Flag, FlagSet};
use crate::tree::NodeKind;

/// Mode-leaving keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Builtin {
    /// Leave the current mode (or configuration at the root).
    Exit,
    /// Return to the root mode and leave configuration.
    End,
}

impl Builtin {
    /// Keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Builtin::Exit => "exit",
            Builtin::End => "end",
        }
    }

    /// Help text.
    pub fn help(self) -> &'static str {
        match self {
            Builtin::Exit => "Leave the current mode",
            Builtin::End => "Return to the top level and leave configuration",
        }
    }
}

/// Behavioral keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorKind {
    /// Display data below the current mode.
    Show,
    /// Remove configuration.
    No,
    /// Enter configuration.
    Config,
    /// Commit the candidate.
    Commit,
    /// Discard the candidate.
    Discard,
}

impl BehaviorKind {
    /// Keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            BehaviorKind::Show => "show",
            BehaviorKind::No => "no",
            BehaviorKind::Config => "config",
            BehaviorKind::Commit => "commit",
            BehaviorKind::Discard => "discard",
        }
    }

    /// Help text.
    pub fn help(self) -> &'static str {
        match self {
            BehaviorKind::Show => "Show data",
            BehaviorKind::No => "Remove configuration",
            BehaviorKind::Config => "Enter configuration mode",
            BehaviorKind::Commit => "Commit pending changes",
            BehaviorKind::Discard => "Discard pending changes",
        }
    }

    /// Flags pushed down into the projection.
    pub fn overlay(self) -> FlagSet {
        let mut f = FlagSet::new();
        match self {
            BehaviorKind::Show => {
                f.set_inherit(Flag::GenericGet);
                f.set_inherit(Flag::HideModes);
            }
            BehaviorKind::No => {
                f.set_inherit(Flag::HideModes);
                f.set_inherit(Flag::HideValues);
                f.set_inherit(Flag::ConfigOnly);
            }
            BehaviorKind::Config => {
                f.set_inherit(Flag::ConfigOnly);
                f.set_inherit(Flag::ConfigContext);
            }
            BehaviorKind::Commit | BehaviorKind::Discard => {}
        }
        f
    }

    /// Whether the node offers a projection of the mode anchor.
    pub fn projects(self) -> bool {
        matches!(
            self,
            BehaviorKind::Show | BehaviorKind::No | BehaviorKind::Config
        )
    }

    /// Print hook recorded when the keyword is matched.
    pub fn print_hook(self) -> Option<&'static str> {
        match self {
            BehaviorKind::Show => Some("show"),
            _ => None,
        }
    }

    /// Whether matched data is removed rather than set.
    pub fn removes(self) -> bool {
        matches!(self, BehaviorKind::No)
    }

    /// Whether the keyword alone is a complete command.
    pub fn complete_alone(self) -> bool {
        !matches!(self, BehaviorKind::No)
    }
}

/// Decides which built-in and behavioral nodes a mode top offers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BehaviorRegistry {
    candidate_store: bool,
}

impl BehaviorRegistry {
    /// Registry for a datastore with or without a candidate.
    pub fn new(candidate_store: bool) -> Self {
        Self { candidate_store }
    }

    /// Whether `commit` / `discard` are offered in configuration.
    pub fn candidate_store(&self) -> bool {
        self.candidate_store
    }

    /// Nodes injected at the top of a mode, in offer order.
    pub fn injected(&self, config_state: bool, depth: usize) -> Vec<NodeKind> {
        let mut out = Vec::with_capacity(6);
        if depth > 1 || config_state {
            out.push(NodeKind::Builtin(Builtin::Exit));
            out.push(NodeKind::Builtin(Builtin::End));
        }
        if config_state {
            out.push(NodeKind::Behavior(BehaviorKind::No));
            if self.candidate_store {
                out.push(NodeKind::Behavior(BehaviorKind::Commit));
                out.push(NodeKind::Behavior(BehaviorKind::Discard));
            }
        } else {
            out.push(NodeKind::Behavior(BehaviorKind::Config));
        }
        out.push(NodeKind::Behavior(BehaviorKind::Show));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(kinds: &[NodeKind]) -> Vec<&'static str> {
        kinds
            .iter()
            .map(|k| match k {
                NodeKind::Builtin(b) => b.keyword(),
                NodeKind::Behavior(b) => b.keyword(),
                _ => "?",
            })
            .collect()
    }

    #[test]
    fn operational_root_offers_config_and_show() {
        let reg = BehaviorRegistry::new(true);
        assert_eq!(keywords(&reg.injected(false, 1)), vec!["config", "show"]);
    }

    #[test]
    fn configuration_offers_no_and_candidate_commands() {
        let reg = BehaviorRegistry::new(true);
        assert_eq!(
            keywords(&reg.injected(true, 1)),
            vec!["exit", "end", "no", "commit", "discard", "show"]
        );
        let running = BehaviorRegistry::new(false);
        assert_eq!(
            keywords(&running.injected(true, 3)),
            vec!["exit", "end", "no", "show"]
        );
    }

    #[test]
    fn nested_operational_mode_offers_exit() {
        let reg = BehaviorRegistry::default();
        assert_eq!(
            keywords(&reg.injected(false, 2)),
            vec!["exit", "end", "config", "show"]
        );
    }

    #[test]
    fn overlays() {
        let show = BehaviorKind::Show.overlay();
        assert!(show.is_inherited(Flag::GenericGet));
        assert!(show.is_inherited(Flag::HideModes));
        assert!(show.is_clear(Flag::ConfigOnly));
        let no = BehaviorKind::No.overlay();
        assert!(no.is_inherited(Flag::HideValues));
        assert!(no.is_inherited(Flag::ConfigOnly));
        assert!(no.is_clear(Flag::Delete));
        assert_eq!(BehaviorKind::Commit.overlay(), FlagSet::new());
    }
}
