//! Diagnostics for the schemash command-line engine.
//!
//! Provides [`Diagnostic`], [`Severity`] and [`Span`], used to report parse
//! failures and session events with a byte span into the offending command
//! line. Diagnostic codes are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants generated from the catalogue.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// The command was rejected.
    Error,
    /// The command ran but something looks off.
    Warn,
    /// Informational note.
    Info,
}

/// Byte span in a command line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Number of bytes covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is zero-width.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A diagnostic produced by the engine or the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"SCH1002"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Byte span in the command line this diagnostic relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable context (`word`, `candidates`, `missing`, ...).
    ///
    /// `BTreeMap` keeps serialized key order deterministic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// Create a diagnostic using the catalogue's default severity for `id`.
    ///
    /// Unknown ids fall back to [`Severity::Error`].
    pub fn from_code(id: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        let severity = default_severity(id).unwrap_or(Severity::Error);
        Self::new(id, severity, message, span)
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warn, message, span)
    }

    /// Shorthand for an `Info` diagnostic.
    pub fn info(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Info, message, span)
    }

    /// Attach machine-readable context (builder pattern).
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the catalogue severity for a diagnostic code, if known.
pub fn default_severity(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CODES: &[&str] = &[
        codes::PARSE_INVALID_INPUT,
        codes::PARSE_NO_COMPLETIONS,
        codes::PARSE_AMBIGUOUS,
        codes::PARSE_INCOMPLETE,
        codes::PARSE_MISSING_MANDATORY,
        codes::PARSE_EXTENSION_REJECTED,
        codes::MODE_DEPTH_EXCEEDED,
        codes::MODE_CHANGE_VETOED,
        codes::COMMAND_FAILED,
    ];

    #[test]
    fn span_new_valid() {
        let s = Span::new(3, 7);
        assert_eq!(s.len(), 4);
        assert!(!s.is_empty());
    }

    #[test]
    fn span_empty() {
        let s = Span::empty(5);
        assert_eq!((s.start, s.end), (5, 5));
        assert!(s.is_empty());
    }

    #[test]
    #[should_panic(expected = "Span end")]
    fn span_new_inverted_panics() {
        let _ = Span::new(4, 2);
    }

    #[test]
    fn severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warn.to_string(), "warn");
        assert_eq!(Severity::Info.to_string(), "info");
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error(codes::PARSE_AMBIGUOUS, "ambiguous command", None);
        assert_eq!(d.to_string(), "error[SCH1003]: ambiguous command");
    }

    #[test]
    fn all_codes_have_explanations_and_severities() {
        for code in ALL_CODES {
            assert!(explain(code).is_some(), "{code} has no explanation");
            assert!(default_severity(code).is_some(), "{code} has no severity");
        }
        assert!(explain("SCH9999").is_none());
    }

    #[test]
    fn from_code_uses_catalogue_severity() {
        let vetoed = Diagnostic::from_code(codes::MODE_CHANGE_VETOED, "declined", None);
        assert_eq!(vetoed.severity, Severity::Info);
        let failed = Diagnostic::from_code(codes::PARSE_INCOMPLETE, "incomplete", None);
        assert!(failed.is_error());
    }

    #[test]
    fn diagnostic_serde_omits_empty_fields() {
        let d = Diagnostic::error(codes::PARSE_NO_COMPLETIONS, "no match", None);
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("span"));
        assert!(!json.contains("context"));
    }

    #[test]
    fn diagnostic_context_is_ordered() {
        let ctx = BTreeMap::from([
            ("word".to_string(), "net".to_string()),
            ("candidates".to_string(), "network, netmask".to_string()),
        ]);
        let d = Diagnostic::error(codes::PARSE_AMBIGUOUS, "ambiguous", Some(Span::new(0, 3)))
            .with_context(ctx);
        let json = serde_json::to_string(&d).unwrap();
        let candidates = json.find("candidates").unwrap();
        let word = json.find("\"word\"").unwrap();
        assert!(candidates < word);
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
