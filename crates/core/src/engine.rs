//! The engine: one interactive session over a schema.
//!
//! An [`Engine`] owns the registries, the mode stack and the configuration
//! state. Lines are parsed against the current mode with [`Engine::parse`]
//! and acted upon with [`Engine::execute_line`]; argument vectors go through
//! [`Engine::execute`].

use std::fmt;
use std::mem;
use std::sync::Arc;

use schemash_profile::Profile;
use schemash_schema::Schema;
use tracing::{debug, info};

use crate::appdata::{AppDataCallback, AppDataRegistry, AppDataSlot};
use crate::behavior::{BehaviorKind, BehaviorRegistry, Builtin};
use crate::command::{CommandRegistry, CommandSpec, Invocation, TemplateId};
use crate::env::{Env, Suppressions};
use crate::error::{EngineError, ErrorKind, ExecError, ParseError};
use crate::grammar::parser::{Completion, ParseLineResult, ParseOptions, parse_line, parse_words};
use crate::mode::ModeStack;
use crate::tree::{NodeId, NodeKind, Tree};

/// Veto points for configuration-state changes.
///
/// Each hook gets a scratch engine sharing the schema and registries, with a
/// fresh mode stack, so it can parse or run confirmation lines without
/// disturbing the session.
pub trait SessionHooks {
    /// Called before entering configuration.
    fn allow_config_enter(&mut self, scratch: &mut Engine) -> bool {
        let _ = scratch;
        true
    }

    /// Called before leaving configuration.
    fn allow_config_exit(&mut self, scratch: &mut Engine) -> bool {
        let _ = scratch;
        true
    }
}

struct AllowAll;

impl SessionHooks for AllowAll {}

/// What executing one line did.
#[derive(Debug)]
pub enum Outcome {
    /// The line had no words.
    Empty,
    /// A mode was pushed; the new depth.
    ModeEntered {
        /// Depth after the push.
        depth: usize,
    },
    /// One mode was popped; the new depth.
    ModeExited {
        /// Depth after the pop.
        depth: usize,
    },
    /// Configuration was entered.
    ConfigEntered,
    /// Configuration was left and every mode popped.
    ConfigExited,
    /// A session hook refused the state change.
    Vetoed,
    /// `commit` was requested.
    Commit,
    /// `discard` was requested.
    Discard,
    /// A registered command ran.
    Invoked(Invocation),
    /// A data command (set, remove, show, operation) for the embedder to
    /// carry out.
    Command(Box<ParseLineResult>),
}

/// Result of [`Engine::execute`].
#[derive(Debug)]
pub struct Execution {
    /// Arguments consumed by successful commands.
    pub consumed: usize,
    /// Outcomes in order.
    pub outcomes: Vec<Outcome>,
    /// Why execution stopped early.
    pub error: Option<ExecError>,
}

impl Execution {
    /// Whether every argument was consumed.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// An interactive session.
pub struct Engine {
    schema: Arc<Schema>,
    profile: Profile,
    commands: CommandRegistry,
    appdata: AppDataRegistry,
    behaviors: BehaviorRegistry,
    suppressions: Suppressions,
    modes: ModeStack,
    config_state: bool,
    hooks: Box<dyn SessionHooks>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("profile", &self.profile.id)
            .field("commands", &self.commands.len())
            .field("appdata", &self.appdata)
            .field("depth", &self.modes.depth())
            .field("config_state", &self.config_state)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// New session at the root mode, outside configuration.
    ///
    /// The profile's hidden namespaces and paths are applied here; an entry
    /// naming nothing is an error.
    pub fn new(schema: Arc<Schema>, profile: Profile) -> Result<Self, EngineError> {
        let mut engine = Self {
            behaviors: BehaviorRegistry::new(profile.candidate_store),
            modes: ModeStack::new(profile.max_mode_depth),
            schema,
            profile,
            commands: CommandRegistry::default(),
            appdata: AppDataRegistry::default(),
            suppressions: Suppressions::default(),
            config_state: false,
            hooks: Box::new(AllowAll),
        };
        for ns in engine.profile.hidden_namespaces.clone() {
            engine.suppress_namespace(&ns)?;
        }
        for path in engine.profile.hidden_paths.clone() {
            engine.suppress_path(&path)?;
        }
        Ok(engine)
    }

    /// Engine sharing schema, profile and registries, at the root mode.
    pub fn scratch(&self) -> Engine {
        Self {
            schema: Arc::clone(&self.schema),
            profile: self.profile.clone(),
            commands: self.commands.clone(),
            appdata: self.appdata.clone(),
            behaviors: self.behaviors,
            suppressions: self.suppressions.clone(),
            modes: ModeStack::new(self.profile.max_mode_depth),
            config_state: self.config_state,
            hooks: Box::new(AllowAll),
        }
    }

    /// Install session hooks.
    pub fn set_hooks(&mut self, hooks: Box<dyn SessionHooks>) {
        self.hooks = hooks;
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// The schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The profile.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The mode stack.
    pub fn modes(&self) -> &ModeStack {
        &self.modes
    }

    /// Whether the session is in configuration.
    pub fn config_state(&self) -> bool {
        self.config_state
    }

    /// Registered commands.
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Registered app-data slots.
    pub fn appdata(&self) -> &AppDataRegistry {
        &self.appdata
    }

    /// Active suppressions.
    pub fn suppressions(&self) -> &Suppressions {
        &self.suppressions
    }

    // ── Registration ─────────────────────────────────────────────────────

    /// Register a top-level command; offered at the operational root.
    pub fn register_command(&mut self, spec: CommandSpec) -> Result<TemplateId, EngineError> {
        self.commands.register(spec)
    }

    /// Register an app-data slot.
    pub fn register_app_data(
        &mut self,
        namespace: &str,
        name: &str,
        callback: Option<AppDataCallback>,
    ) -> Result<AppDataSlot, EngineError> {
        self.appdata.register(namespace, name, callback)
    }

    /// Stop offering every node of a module (by name or prefix).
    pub fn suppress_namespace(&mut self, namespace: &str) -> Result<(), EngineError> {
        let module = self
            .schema
            .find_module(namespace)
            .ok_or_else(|| EngineError::UnknownNamespace(namespace.to_string()))?;
        self.suppressions.hide_module(module);
        debug!(namespace, "namespace suppressed");
        Ok(())
    }

    /// Stop offering a schema path or a top-level command.
    pub fn suppress_path(&mut self, path: &str) -> Result<(), EngineError> {
        if let Some(node) = self.schema.find_path(path) {
            self.suppressions.hide_node(node);
        } else if let Some(t) = self.commands.find_top(path.trim_matches('/')) {
            self.commands.suppress(t);
        } else {
            return Err(EngineError::UnknownPath(path.to_string()));
        }
        debug!(path, "path suppressed");
        Ok(())
    }

    // ── Parsing ──────────────────────────────────────────────────────────

    fn env(&self) -> Env<'_> {
        Env {
            schema: &self.schema,
            profile: &self.profile,
            commands: &self.commands,
            behaviors: &self.behaviors,
            suppressions: &self.suppressions,
            config_state: self.config_state,
            depth: self.modes.depth(),
            anchor: self.modes.top().anchor_schema(),
            generation: self.modes.generation(),
        }
    }

    /// Parse a line against the current mode.
    pub fn parse(&self, line: &str, options: ParseOptions) -> ParseLineResult {
        let env = self.env();
        let top = self.modes.top();
        parse_line(&env, &self.appdata, top.path(), top.anchor(), line, options)
    }

    /// Parse pre-split words against the current mode.
    pub fn parse_argv(&self, words: &[String], options: ParseOptions) -> ParseLineResult {
        let env = self.env();
        let top = self.modes.top();
        parse_words(&env, &self.appdata, top.path(), top.anchor(), words, options)
    }

    /// Completions for the last (possibly partial) word of `line`.
    pub fn complete(&self, line: &str) -> Vec<Completion> {
        self.parse(line, ParseOptions::default()).completions
    }

    // ── Execution ────────────────────────────────────────────────────────

    /// Parse and act on one line.
    pub fn execute_line(&mut self, line: &str) -> Result<Outcome, ExecError> {
        let result = self.parse(line, ParseOptions::execute());
        self.execute_result(result)
    }

    /// Act on a parse result of the current mode.
    pub fn execute_result(&mut self, mut result: ParseLineResult) -> Result<Outcome, ExecError> {
        if let Some(e) = result.error.take() {
            return Err(e.into());
        }
        if result.is_empty() {
            return Ok(Outcome::Empty);
        }
        let alone = result.chain().len() == 1;
        match result.top_kind() {
            Some(NodeKind::Builtin(Builtin::Exit)) => return self.exit(),
            Some(NodeKind::Builtin(Builtin::End)) => return self.end(),
            Some(NodeKind::Behavior(BehaviorKind::Commit)) => return Ok(Outcome::Commit),
            Some(NodeKind::Behavior(BehaviorKind::Discard)) => return Ok(Outcome::Discard),
            Some(NodeKind::Behavior(BehaviorKind::Config)) if alone => return self.enter_config(),
            _ => {}
        }

        if result.mode_entry.is_some() {
            if result.behavior() == Some(BehaviorKind::Config)
                && !self.config_state
                && matches!(self.enter_config()?, Outcome::Vetoed)
            {
                return Ok(Outcome::Vetoed);
            }
            self.modes.push_result(&self.schema, &result)?;
            let depth = self.modes.depth();
            info!(depth, prompt = %self.prompt(), "mode entered");
            return Ok(Outcome::ModeEntered { depth });
        }

        if !result.complete {
            let end = result.line.len();
            return Err(ParseError::new(ErrorKind::Incomplete, "incomplete command")
                .at(schemash_diagnostics::Span::empty(end))
                .with_candidates(result.completions.iter().map(|c| c.label().to_string()).collect())
                .into());
        }
        let missing = result.check_for_mandatory(&self.schema);
        if !missing.is_empty() {
            return Err(ParseError::new(
                ErrorKind::MissingMandatory,
                format!("missing mandatory input: {}", missing.join(", ")),
            )
            .with_missing(missing)
            .into());
        }

        if let Some(t) = result.command {
            let inv = result.invocation(&self.commands);
            if let Some(cb) = self.commands.template(t).callback() {
                cb(&inv).map_err(|message| ExecError::CommandFailed {
                    command: inv.keywords.join(" "),
                    message,
                })?;
                debug!(command = %inv.keywords.join(" "), "command invoked");
                return Ok(Outcome::Invoked(inv));
            }
        }
        Ok(Outcome::Command(Box::new(result)))
    }

    /// Execute an argument vector as a sequence of commands.
    ///
    /// At each position the longest run of arguments forming a complete
    /// command (or entering a mode) is executed; execution stops at the
    /// first argument no command can start from.
    pub fn execute(&mut self, argv: &[String]) -> Execution {
        let mut outcomes = Vec::new();
        let mut start = 0;
        while start < argv.len() {
            let options = ParseOptions {
                strip_leading_dash: true,
                ..ParseOptions::execute()
            };
            let best = (start + 1..=argv.len()).rev().find_map(|end| {
                let r = self.parse_argv(&argv[start..end], options);
                (r.success && (r.complete || r.mode_entry.is_some())).then_some((end, r))
            });
            let Some((end, result)) = best else {
                let r = self.parse_argv(&argv[start..], options);
                let error = r.error.unwrap_or_else(|| {
                    ParseError::new(ErrorKind::Incomplete, "incomplete command")
                });
                return Execution {
                    consumed: start,
                    outcomes,
                    error: Some(error.into()),
                };
            };
            match self.execute_result(result) {
                Ok(o) => outcomes.push(o),
                Err(e) => {
                    return Execution {
                        consumed: start,
                        outcomes,
                        error: Some(e),
                    };
                }
            }
            start = end;
        }
        Execution {
            consumed: start,
            outcomes,
            error: None,
        }
    }

    // ── Mode and configuration changes ───────────────────────────────────

    fn exit(&mut self) -> Result<Outcome, ExecError> {
        let depth = self.modes.depth();
        if depth > 1 {
            self.modes.pop_to_depth(depth - 1)?;
            return Ok(Outcome::ModeExited { depth: depth - 1 });
        }
        if self.config_state {
            return Ok(self.leave_config());
        }
        Ok(Outcome::Empty)
    }

    fn end(&mut self) -> Result<Outcome, ExecError> {
        if self.config_state {
            return Ok(self.leave_config());
        }
        self.modes.pop_to_depth(1)?;
        Ok(Outcome::ModeExited { depth: 1 })
    }

    fn enter_config(&mut self) -> Result<Outcome, ExecError> {
        if self.config_state {
            return Ok(Outcome::Empty);
        }
        if !self.ask(true) {
            return Ok(Outcome::Vetoed);
        }
        self.config_state = true;
        self.modes.pop_to_depth(1)?;
        info!("configuration entered");
        Ok(Outcome::ConfigEntered)
    }

    fn leave_config(&mut self) -> Outcome {
        if !self.ask(false) {
            return Outcome::Vetoed;
        }
        self.config_state = false;
        self.modes = ModeStack::new(self.profile.max_mode_depth);
        info!("configuration left");
        Outcome::ConfigExited
    }

    fn ask(&mut self, enter: bool) -> bool {
        let mut hooks = mem::replace(&mut self.hooks, Box::new(AllowAll));
        let mut scratch = self.scratch();
        let allowed = if enter {
            hooks.allow_config_enter(&mut scratch)
        } else {
            hooks.allow_config_exit(&mut scratch)
        };
        self.hooks = hooks;
        if !allowed {
            debug!(enter, "configuration change vetoed");
        }
        allowed
    }

    // ── Presentation ─────────────────────────────────────────────────────

    /// Prompt for the current state: `host>`, `host(config)#` or
    /// `host(config-<mode>)#`.
    pub fn prompt(&self) -> String {
        let host = &self.profile.hostname;
        let top = self.modes.top();
        if self.modes.depth() > 1 {
            let fragment = top
                .prompt()
                .unwrap_or_else(|| self.schema.node(top.anchor_schema()).name.as_str());
            format!("{host}(config-{fragment})#")
        } else if self.config_state {
            format!("{host}(config)#")
        } else {
            format!("{host}>")
        }
    }

    /// Data document of a parse result: the matched nodes placed under a
    /// copy of the current mode path, rooted at the schema root. Behavioral
    /// nodes are dropped; their children take their place.
    pub fn document(&self, result: &ParseLineResult) -> Tree {
        let top = self.modes.top();
        let mut doc = top.path().clone();
        let src = &result.result;
        graft_data(&mut doc, top.anchor(), src, src.root());
        doc
    }
}

fn graft_data(doc: &mut Tree, parent: NodeId, src: &Tree, from: NodeId) {
    for &c in src.children(from) {
        if matches!(src.kind(c), NodeKind::Behavior(_)) {
            graft_data(doc, parent, src, c);
        } else {
            doc.graft(parent, src, c);
        }
    }
}
