//! schemash core library.
//!
//! A schema-driven, mode-aware incremental command-line parser. An
//! [`Engine`] turns a loaded [`Schema`](schemash_schema::Schema) into a
//! navigable command language: partial lines are completed with
//! [`Engine::complete`], full lines are matched with [`Engine::parse`] and
//! acted upon with [`Engine::execute_line`]. Results render as XML with
//! [`emit_xml`] or as JSON with [`to_pretty_json`].

#![warn(missing_docs)]

/// App-data slots attached to schema nodes through extensions.
pub mod appdata;
/// Built-in and behavioral top-level nodes.
pub mod behavior;
/// Registered (non-schema) commands.
pub mod command;
/// Session: registries, mode stack and configuration state.
pub mod engine;
mod env;
/// Parse, registration, mode and execution errors.
pub mod error;
/// Per-node flag sets with inheritance planes.
pub mod flags;
/// Tokenizer, word matcher and emitters.
pub mod grammar;
/// Mode stack.
pub mod mode;
/// Arena trees: the fat tree of offered nodes and the result tree.
pub mod tree;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Session
pub use engine::{Engine, Execution, Outcome, SessionHooks};
pub use env::Suppressions;
pub use mode::{DocHandle, ModeStack, ModeState};

// Registries
pub use appdata::{AppDataCallback, AppDataHit, AppDataRegistry, AppDataSlot, Verdict};
pub use behavior::{BehaviorKind, BehaviorRegistry, Builtin};
pub use command::{CommandRegistry, CommandSpec, Invocation, PrimitiveType, TemplateId};

// Parser
pub use grammar::lexer::{Word, Words, tokenize};
pub use grammar::parser::{Completion, ParseLineResult, ParseOptions};

// Trees
pub use flags::{Flag, FlagSet};
pub use tree::{Cursor, Node, NodeId, NodeKind, Tree};

// Errors
pub use error::{EngineError, ErrorKind, ExecError, ModeError, ParseError};

// Emitters
pub use grammar::dump::{NodeView, ParseReport, report, to_pretty_json, tree_view};
pub use grammar::emit::{EmitConfig, emit_xml};

// Diagnostics (re-exported from the diagnostics crate)
pub use schemash_diagnostics::{Diagnostic, Severity, Span, codes};
