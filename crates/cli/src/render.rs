//! Terminal rendering: diagnostics through ariadne, completion lists and
//! outcome summaries.
//!
//! Diagnostics carry byte spans into a single command line, so every
//! report is built against that line with an origin such as `line` or
//! `script.cli:3`. Pretty output goes to stderr; the data a command
//! produces stays on stdout.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use schemash_core::Completion;
use schemash_diagnostics::{Diagnostic, Severity};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for command results and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, else pretty for a terminal and JSON for a pipe.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: &Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warn => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: &Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// ── Diagnostics ─────────────────────────────────────────────────────────

/// Render diagnostics for one command line to stderr.
///
/// Diagnostics with a span underline the offending word; the rest are
/// printed as a single `error[ID]: message` line.
pub(crate) fn render_diagnostics_pretty(line: &str, origin: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let config = Config::default().with_compact(false);
    let mut cache = (origin, Source::from(line));

    for diag in diagnostics {
        let Some(span) = &diag.span else {
            eprintln!("{}[{}]: {}", diag.severity, diag.id, diag.message);
            if let Some(note) = context_note(diag) {
                eprintln!("  = note: {note}");
            }
            if let Some(explanation) = diag.explain() {
                eprintln!("  = help: {explanation}");
            }
            continue;
        };

        // Zero-width spans point at the end of the line; widen them so the
        // marker is visible.
        let start = span.start.min(line.len());
        let end = span.end.min(line.len()).max(start);
        let range = if start == end { start..end + 1 } else { start..end };

        let label = match diag.context.as_ref().and_then(|c| c.get("word")) {
            Some(word) => format!("'{word}'"),
            None => diag.message.clone(),
        };

        let mut builder = Report::build(report_kind(&diag.severity), (origin, range.clone()))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config)
            .with_label(
                Label::new((origin, range))
                    .with_message(label)
                    .with_color(severity_color(&diag.severity)),
            );
        if let Some(note) = context_note(diag) {
            builder = builder.with_note(note);
        }
        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }
        builder.finish().eprint(&mut cache).ok();
    }
}

/// Render diagnostics as a JSON array to stdout.
pub(crate) fn render_diagnostics_json(diagnostics: &[Diagnostic]) {
    let json =
        serde_json::to_string_pretty(diagnostics).expect("Diagnostic serialization cannot fail");
    println!("{json}");
}

/// Render diagnostics in the given format.
pub(crate) fn render_diagnostics(
    line: &str,
    origin: &str,
    diagnostics: &[Diagnostic],
    format: Format,
) {
    match format {
        Format::Pretty => render_diagnostics_pretty(line, origin, diagnostics),
        Format::Json => render_diagnostics_json(diagnostics),
    }
}

// ── Completions ─────────────────────────────────────────────────────────

/// Print completions as an aligned two-column help list to stdout.
pub(crate) fn print_completions(completions: &[Completion]) {
    if completions.is_empty() {
        println!("% no completions");
        return;
    }
    let width = completions
        .iter()
        .map(|c| c.label().len())
        .max()
        .unwrap_or(0);
    for c in completions {
        if c.help.is_empty() {
            println!("  {}", c.label());
        } else {
            println!("  {:<width$}  {}", c.label(), c.help);
        }
    }
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print a coloured error/warning/info count line to stderr.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    let (mut errors, mut warnings, mut infos) = (0usize, 0usize, 0usize);
    for d in diagnostics {
        match d.severity {
            Severity::Error => errors += 1,
            Severity::Info => infos += 1,
            _ => warnings += 1,
        }
    }
    if errors + warnings + infos == 0 {
        return;
    }

    let mut parts = Vec::new();
    if errors > 0 {
        let s = if errors == 1 { "" } else { "s" };
        parts.push(format!("{}", format!("{errors} error{s}").fg(Color::Red)));
    }
    if warnings > 0 {
        let s = if warnings == 1 { "" } else { "s" };
        parts.push(format!(
            "{}",
            format!("{warnings} warning{s}").fg(Color::Yellow)
        ));
    }
    if infos > 0 {
        parts.push(format!("{}", format!("{infos} info").fg(Color::Blue)));
    }
    eprintln!("{}", parts.join(", "));
}
