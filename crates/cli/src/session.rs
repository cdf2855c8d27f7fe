//! Session construction and per-line execution shared by `run` and `shell`.

use std::cell::Cell;
use std::fs;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use schemash_core::{EmitConfig, Engine, Outcome, SessionHooks, emit_xml};
use schemash_diagnostics::{Diagnostic, codes};
use schemash_profile::{Profile, load_profile_from_str};
use schemash_schema::load_schema_from_path;

/// Refuses to leave configuration while the candidate holds changes that
/// were neither committed nor discarded.
struct CandidateGuard {
    dirty: Rc<Cell<bool>>,
}

impl SessionHooks for CandidateGuard {
    fn allow_config_exit(&mut self, _scratch: &mut Engine) -> bool {
        !self.dirty.get()
    }
}

/// An engine plus the CLI's view of the candidate datastore.
pub(crate) struct Session {
    engine: Engine,
    dirty: Rc<Cell<bool>>,
}

impl Session {
    /// Load the schema and optional profile and build the session.
    pub(crate) fn open(schema_path: &str, profile_path: Option<&str>) -> Result<Self> {
        let schema = load_schema_from_path(schema_path)
            .with_context(|| format!("failed to load schema '{schema_path}'"))?;
        let profile = match profile_path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read profile '{path}'"))?;
                load_profile_from_str(&text)
                    .with_context(|| format!("failed to parse profile '{path}'"))?
            }
            None => Profile::default(),
        };
        tracing::debug!(
            schema = schema_path,
            nodes = schema.len(),
            profile = %profile.id,
            "session opened"
        );
        let candidate_store = profile.candidate_store;
        let mut engine =
            Engine::new(Arc::new(schema), profile).context("failed to apply profile")?;

        let dirty = Rc::new(Cell::new(false));
        if candidate_store {
            engine.set_hooks(Box::new(CandidateGuard {
                dirty: Rc::clone(&dirty),
            }));
        }
        Ok(Self { engine, dirty })
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Put the engine into configuration state before the first line.
    pub(crate) fn enter_config(&mut self) -> Result<()> {
        let outcome = self.engine.execute_line("config")?;
        anyhow::ensure!(
            self.engine.config_state(),
            "configuration state was not entered ({outcome:?})"
        );
        Ok(())
    }

    /// Execute one line and describe what happened.
    pub(crate) fn execute(&mut self, line: &str) -> LineReport {
        let engine = &mut self.engine;
        let mut report = LineReport {
            line: line.to_string(),
            prompt: engine.prompt(),
            outcome: "empty",
            depth: 0,
            behavior: None,
            print_hook: None,
            invoked: None,
            xml: None,
            diagnostics: Vec::new(),
        };

        match engine.execute_line(line) {
            Ok(Outcome::Empty) => {}
            Ok(Outcome::ModeEntered { .. }) => report.outcome = "mode-entered",
            Ok(Outcome::ModeExited { .. }) => report.outcome = "mode-exited",
            Ok(Outcome::ConfigEntered) => report.outcome = "config-entered",
            Ok(Outcome::ConfigExited) => report.outcome = "config-exited",
            Ok(Outcome::Vetoed) => {
                report.outcome = "vetoed";
                report.diagnostics.push(Diagnostic::from_code(
                    codes::MODE_CHANGE_VETOED,
                    "uncommitted changes; commit or discard them first",
                    None,
                ));
            }
            Ok(Outcome::Commit) => {
                report.outcome = "commit";
                self.dirty.set(false);
            }
            Ok(Outcome::Discard) => {
                report.outcome = "discard";
                self.dirty.set(false);
            }
            Ok(Outcome::Invoked(inv)) => {
                report.outcome = "invoked";
                let mut words = inv.keywords;
                words.extend(inv.values);
                report.invoked = Some(words.join(" "));
            }
            Ok(Outcome::Command(result)) => {
                report.outcome = "command";
                let behavior = result.behavior();
                report.behavior = behavior.map(|b| b.keyword());
                report.print_hook = result.print_hook.clone();
                if engine.config_state() && behavior.is_none_or(|b| b.removes()) {
                    self.dirty.set(true);
                }
                let doc = engine.document(&result);
                report.xml = Some(emit_xml(engine.schema(), &doc, &EmitConfig::default()));
            }
            Err(err) => {
                tracing::debug!(line, error = %err, "line rejected");
                report.outcome = "error";
                report.diagnostics.push(err.to_diagnostic());
            }
        }
        report.depth = engine.modes().depth();
        report
    }
}

/// Whether a script line carries no command.
pub(crate) fn is_comment(line: &str) -> bool {
    let t = line.trim_start();
    t.is_empty() || t.starts_with('#') || t.starts_with('!')
}

/// What one executed line did, in serializable form.
#[derive(Debug, Serialize)]
pub(crate) struct LineReport {
    /// The line as typed.
    pub(crate) line: String,
    /// Prompt the line was typed at.
    pub(crate) prompt: String,
    /// Outcome name (`mode-entered`, `command`, `error`, ...).
    pub(crate) outcome: &'static str,
    /// Mode depth after the line.
    pub(crate) depth: usize,
    /// Behavior keyword the command started with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) behavior: Option<&'static str>,
    /// Print hook chosen for the command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) print_hook: Option<String>,
    /// Registered command keywords and values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) invoked: Option<String>,
    /// Document for a data command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) xml: Option<String>,
    /// Diagnostics the line produced.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl LineReport {
    pub(crate) fn is_error(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// One-line human summary, `None` when the prompt change says it all.
    pub(crate) fn summary(&self) -> Option<String> {
        match self.outcome {
            "commit" => Some("% commit requested".into()),
            "discard" => Some("% discard requested".into()),
            "invoked" => self.invoked.as_ref().map(|i| format!("% ran {i}")),
            _ => None,
        }
    }
}
