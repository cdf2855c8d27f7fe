//! `schemash shell`: a line editor with tab completion on a terminal,
//! plain stdin lines otherwise.

use std::cell::RefCell;
use std::io::{self, BufRead, IsTerminal, Write};
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};

use schemash_core::{Completion, Engine};
use schemash_diagnostics::Diagnostic;

use crate::render::{Format, print_completions, print_summary};
use crate::session::Session;
use crate::{exit_on_errors, print_line_report};

/// Run an interactive session until end of input or `exit` at the root.
pub(crate) fn run(schema: &str, profile: Option<&str>, format: Format) -> Result<()> {
    let mut shell = Shell {
        session: Rc::new(RefCell::new(Session::open(schema, profile)?)),
        format,
        diagnostics: Vec::new(),
    };

    if format == Format::Pretty && io::stdin().is_terminal() {
        run_editor(&mut shell)?;
    } else {
        run_lines(&mut shell)?;
    }

    if format == Format::Pretty {
        println!();
        print_summary(&shell.diagnostics);
    }
    exit_on_errors(&shell.diagnostics);
    Ok(())
}

enum Control {
    Continue,
    Exit,
}

struct Shell {
    session: Rc<RefCell<Session>>,
    format: Format,
    diagnostics: Vec<Diagnostic>,
}

impl Shell {
    fn prompt(&self) -> String {
        format!("{} ", self.session.borrow().engine().prompt())
    }

    /// Execute one line, or list completions when it ends with `?`.
    fn handle(&mut self, line: &str) -> Result<Control> {
        if let Some(partial) = line.strip_suffix('?') {
            let completions = self.session.borrow().engine().complete(partial);
            match self.format {
                Format::Json => {
                    let out = serde_json::json!({
                        "line": partial,
                        "completions": completions,
                    });
                    println!("{}", serde_json::to_string(&out)?);
                }
                Format::Pretty => print_completions(&completions),
            }
            return Ok(Control::Continue);
        }

        let mut session = self.session.borrow_mut();
        let engine = session.engine();
        // `exit` at the operational root leaves the shell.
        if line.trim() == "exit" && !engine.config_state() && engine.modes().depth() == 1 {
            return Ok(Control::Exit);
        }

        let rep = session.execute(line);
        match self.format {
            Format::Json => println!("{}", serde_json::to_string(&rep)?),
            Format::Pretty => print_line_report(&rep, "line"),
        }
        self.diagnostics.extend(rep.diagnostics);
        Ok(Control::Continue)
    }
}

fn run_editor(shell: &mut Shell) -> Result<()> {
    let helper = ShellHelper {
        session: Rc::clone(&shell.session),
    };
    let mut rl: Editor<ShellHelper, DefaultHistory> =
        Editor::new().map_err(|e| anyhow!("failed to init line editor: {e}"))?;
    rl.set_helper(Some(helper));

    loop {
        let line = match rl.readline(&shell.prompt()) {
            Ok(l) => l,
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => continue,
            Err(e) => return Err(anyhow!("readline error: {e}")),
        };
        if line.trim().is_empty() {
            continue;
        }
        rl.add_history_entry(line.as_str())
            .map_err(|e| anyhow!("failed to record history: {e}"))?;
        if let Control::Exit = shell.handle(&line)? {
            break;
        }
    }
    Ok(())
}

fn run_lines(shell: &mut Shell) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if shell.format == Format::Pretty {
            print!("{}", shell.prompt());
            io::stdout().flush().context("failed to write prompt")?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read stdin")?;
        // Piped input is not echoed, so help starts on a fresh line.
        if shell.format == Format::Pretty && line.ends_with('?') {
            println!();
        }
        if let Control::Exit = shell.handle(&line)? {
            break;
        }
    }
    Ok(())
}

// ── Tab completion ──────────────────────────────────────────────────────

struct ShellHelper {
    session: Rc<RefCell<Session>>,
}

impl Helper for ShellHelper {}

impl Highlighter for ShellHelper {}

impl Hinter for ShellHelper {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Validator for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let session = self.session.borrow();
        Ok(tab_candidates(session.engine(), &line[..pos]))
    }
}

/// Start of the word under the cursor and the words that may replace it.
///
/// Typed placeholders such as `<uint32>` are listed by `?` but never
/// inserted.
fn tab_candidates(engine: &Engine, before: &str) -> (usize, Vec<Pair>) {
    let start = before
        .rfind(|c: char| c.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    let pairs = engine
        .complete(before)
        .iter()
        .filter(|c| !is_placeholder(c))
        .map(|c| Pair {
            display: c.label().to_string(),
            replacement: format!("{} ", c.label()),
        })
        .collect();
    (start, pairs)
}

fn is_placeholder(c: &Completion) -> bool {
    c.is_value && c.display.starts_with('<') && c.display.ends_with('>')
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../core/tests/fixtures/test-schema.json"
    );

    fn replacements(pairs: &[Pair]) -> Vec<&str> {
        pairs.iter().map(|p| p.replacement.as_str()).collect()
    }

    #[test]
    fn tab_completes_the_word_under_the_cursor() {
        let session = Session::open(SCHEMA, None).unwrap();
        let (start, pairs) = tab_candidates(session.engine(), "conf");
        assert_eq!(start, 0);
        assert_eq!(replacements(&pairs), vec!["config "]);

        let (start, pairs) = tab_candidates(session.engine(), "config netw");
        assert_eq!(start, 7);
        assert_eq!(replacements(&pairs), vec!["network "]);
        assert_eq!(pairs[0].display, "network");
    }

    #[test]
    fn tab_skips_typed_placeholders_but_keeps_literals() {
        let mut session = Session::open(SCHEMA, None).unwrap();
        session.enter_config().unwrap();
        let (start, pairs) = tab_candidates(session.engine(), "network ");
        assert_eq!(start, 8);
        assert!(pairs.is_empty());

        let (_, pairs) = tab_candidates(session.engine(), "t:system speed ");
        assert_eq!(replacements(&pairs), vec!["fast ", "slow "]);
    }
}
