mod render;
mod session;
mod shell;

use std::fs;
use std::io;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use schemash_core::{EmitConfig, ParseOptions, emit_xml, report, to_pretty_json};
use schemash_diagnostics::{self as diag, Diagnostic, Severity};

use crate::render::{Format, print_completions, print_summary, render_diagnostics};
use crate::session::{LineReport, Session, is_comment};

/// Environment variable holding the log filter (`SCHEMASH_LOG=debug`).
const LOG_ENV: &str = "SCHEMASH_LOG";

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "schemash",
    version,
    about = "Schema-driven command shell: parse, complete and run mode-aware commands against a data-model schema"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    // ── Single lines ────────────────────────────────────────────────
    /// Parse one command line and print the result tree.
    Parse {
        /// Schema JSON file.
        schema: String,
        /// Command line (quote it).
        line: String,
        /// Session profile JSON.
        #[arg(long)]
        profile: Option<String>,
        /// Parse in configuration state.
        #[arg(long)]
        config: bool,
    },

    /// List the completions for a partial command line.
    Complete {
        /// Schema JSON file.
        schema: String,
        /// Partial command line; a trailing space asks for the next word.
        line: String,
        /// Session profile JSON.
        #[arg(long)]
        profile: Option<String>,
        /// Complete in configuration state.
        #[arg(long)]
        config: bool,
    },

    // ── Sessions ────────────────────────────────────────────────────
    /// Execute a script of command lines; modes persist between lines.
    Run {
        /// Schema JSON file.
        schema: String,
        /// Script file, one command per line (`#` and `!` start comments).
        script: String,
        /// Session profile JSON.
        #[arg(long)]
        profile: Option<String>,
        /// Continue after a rejected line.
        #[arg(long)]
        keep_going: bool,
    },

    /// Interactive session with tab completion. End a line with `?` for help.
    Shell {
        /// Schema JSON file.
        schema: String,
        /// Session profile JSON.
        #[arg(long)]
        profile: Option<String>,
    },

    // ── Reference ───────────────────────────────────────────────────
    /// Explain a diagnostic ID (e.g. SCH1002).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Err(err) = dispatch(cli.cmd, format) {
        match format {
            Format::Json => {
                let out = serde_json::json!({
                    "success": false,
                    "error": "command_failed",
                    "message": format!("{err:#}"),
                });
                println!("{}", to_pretty_json(&out));
            }
            Format::Pretty => eprintln!("error: {err:#}"),
        }
        process::exit(1);
    }
}

fn dispatch(cmd: Cmd, format: Format) -> Result<()> {
    match cmd {
        Cmd::Parse {
            schema,
            line,
            profile,
            config,
        } => cmd_parse(&schema, &line, profile.as_deref(), config, format),
        Cmd::Complete {
            schema,
            line,
            profile,
            config,
        } => cmd_complete(&schema, &line, profile.as_deref(), config, format),
        Cmd::Run {
            schema,
            script,
            profile,
            keep_going,
        } => cmd_run(&schema, &script, profile.as_deref(), keep_going, format),
        Cmd::Shell { schema, profile } => shell::run(&schema, profile.as_deref(), format),
        Cmd::Explain { id } => cmd_explain(&id, format),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_parse(
    schema: &str,
    line: &str,
    profile: Option<&str>,
    config: bool,
    format: Format,
) -> Result<()> {
    let mut session = Session::open(schema, profile)?;
    if config {
        session.enter_config()?;
    }
    let engine = session.engine();
    let result = engine.parse(line, ParseOptions::execute());
    let diagnostics = result.diagnostics();

    match format {
        Format::Json => println!("{}", to_pretty_json(&report(engine.schema(), &result))),
        Format::Pretty => {
            if result.success && result.complete {
                let doc = engine.document(&result);
                print!("{}", emit_xml(engine.schema(), &doc, &EmitConfig::default()));
                if let Some(entry) = result.mode_entry {
                    println!("% enters mode '{}'", result.result.node(entry).display());
                }
            } else if result.success {
                println!("% incomplete command, expecting one of:");
                print_completions(&result.completions);
            }
            render_diagnostics(line, "line", &diagnostics, format);
            print_summary(&diagnostics);
        }
    }

    exit_on_errors(&diagnostics);
    Ok(())
}

fn cmd_complete(
    schema: &str,
    line: &str,
    profile: Option<&str>,
    config: bool,
    format: Format,
) -> Result<()> {
    let mut session = Session::open(schema, profile)?;
    if config {
        session.enter_config()?;
    }
    let engine = session.engine();
    let completions = engine.complete(line);

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "line": line,
                "completions": completions,
            });
            println!("{}", to_pretty_json(&out));
        }
        Format::Pretty => print_completions(&completions),
    }
    Ok(())
}

fn cmd_run(
    schema: &str,
    script: &str,
    profile: Option<&str>,
    keep_going: bool,
    format: Format,
) -> Result<()> {
    let text =
        fs::read_to_string(script).with_context(|| format!("failed to read script '{script}'"))?;
    let mut session = Session::open(schema, profile)?;

    let mut reports: Vec<LineReport> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if is_comment(line) {
            continue;
        }
        let rep = session.execute(line);
        if format == Format::Pretty {
            println!("{} {}", rep.prompt, line);
            print_line_report(&rep, &format!("{script}:{}", index + 1));
        }
        let failed = rep.is_error();
        diagnostics.extend(rep.diagnostics.iter().cloned());
        reports.push(rep);
        if failed && !keep_going {
            break;
        }
    }

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "success": !diagnostics.iter().any(Diagnostic::is_error),
                "prompt": session.engine().prompt(),
                "lines": reports,
            });
            println!("{}", to_pretty_json(&out));
        }
        Format::Pretty => print_summary(&diagnostics),
    }

    exit_on_errors(&diagnostics);
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "explanation": diag::explain(id),
            });
            println!("{}", to_pretty_json(&out));
        }
        Format::Pretty => {
            use ariadne::Fmt;
            match diag::explain(id) {
                Some(text) => println!("{}: {}", id.fg(ariadne::Color::Cyan), text),
                None => println!("{id}: (no explanation available)"),
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Print what a line did: its document or summary on stdout, diagnostics
/// on stderr.
fn print_line_report(rep: &LineReport, origin: &str) {
    if let Some(xml) = &rep.xml {
        if let Some(hook) = &rep.print_hook {
            println!("% {hook}");
        }
        print!("{xml}");
    }
    if let Some(summary) = rep.summary() {
        println!("{summary}");
    }
    render_diagnostics(&rep.line, origin, &rep.diagnostics, Format::Pretty);
}

/// Exit with code 1 if any diagnostic is an error.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}
