//! Error types.
//!
//! User-input failures of one parse are [`ParseError`] values carried by
//! the parse result, never Rust errors of the engine itself. Registration
//! and mode-stack misuse are [`EngineError`] / [`ModeError`].

use std::collections::BTreeMap;

use schemash_diagnostics::{Diagnostic, Span, codes};
use serde::Serialize;
use thiserror::Error;

/// Outcome class of a failed parse attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The line could not be tokenized, or an extension stopped the parse.
    InvalidInput,
    /// A word matched nothing.
    NoCompletions,
    /// A word matched several candidates.
    Ambiguous,
    /// Every word matched but the command is not complete.
    Incomplete,
    /// An operation left mandatory input unset.
    MissingMandatory,
}

impl ErrorKind {
    fn default_code(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => codes::PARSE_INVALID_INPUT,
            ErrorKind::NoCompletions => codes::PARSE_NO_COMPLETIONS,
            ErrorKind::Ambiguous => codes::PARSE_AMBIGUOUS,
            ErrorKind::Incomplete => codes::PARSE_INCOMPLETE,
            ErrorKind::MissingMandatory => codes::PARSE_MISSING_MANDATORY,
        }
    }
}

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ParseError {
    /// Outcome class.
    pub kind: ErrorKind,
    /// Diagnostic code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Byte span in the line.
    pub span: Option<Span>,
    /// Index of the offending word.
    pub word_index: Option<usize>,
    /// Offending word as typed.
    pub word: Option<String>,
    /// Candidates that made the word ambiguous.
    pub candidates: Vec<String>,
    /// Mandatory names left unset.
    pub missing: Vec<String>,
}

impl ParseError {
    /// An error of `kind` with the kind's default code.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.default_code(),
            message: message.into(),
            span: None,
            word_index: None,
            word: None,
            candidates: Vec::new(),
            missing: Vec::new(),
        }
    }

    /// Override the diagnostic code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = code;
        self
    }

    /// Locate the error at a word.
    pub fn at_word(mut self, index: usize, word: impl Into<String>, span: Span) -> Self {
        self.word_index = Some(index);
        self.word = Some(word.into());
        self.span = Some(span);
        self
    }

    /// Locate the error at a byte span.
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach ambiguous candidates.
    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Attach missing mandatory names.
    pub fn with_missing(mut self, missing: Vec<String>) -> Self {
        self.missing = missing;
        self
    }

    /// Diagnostic form.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut ctx = BTreeMap::new();
        if let Some(word) = &self.word {
            ctx.insert("word".to_string(), word.clone());
        }
        if let Some(i) = self.word_index {
            ctx.insert("word_index".to_string(), i.to_string());
        }
        if !self.candidates.is_empty() {
            ctx.insert("candidates".to_string(), self.candidates.join(","));
        }
        if !self.missing.is_empty() {
            ctx.insert("missing".to_string(), self.missing.join(","));
        }
        let diag = Diagnostic::from_code(self.code, self.message.clone(), self.span);
        if ctx.is_empty() {
            diag
        } else {
            diag.with_context(ctx)
        }
    }
}

/// Registration and configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A top-level command keyword is already registered.
    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),

    /// A command keyword is empty or contains whitespace.
    #[error("invalid command keyword '{0}'")]
    InvalidKeyword(String),

    /// No module has this name or prefix.
    #[error("unknown namespace '{0}'")]
    UnknownNamespace(String),

    /// The path names neither a schema node nor a command.
    #[error("unknown path '{0}'")]
    UnknownPath(String),

    /// A duplicate app-data registration supplied a different callback.
    #[error("app data {namespace}:{name} is already registered with another callback")]
    AppDataCallbackMismatch {
        /// Extension namespace.
        namespace: String,
        /// Extension name.
        name: String,
    },
}

/// Mode-stack errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    /// Push beyond the configured maximum.
    #[error("mode depth limit of {max} reached")]
    DepthExceeded {
        /// Configured maximum.
        max: usize,
    },

    /// The parse result does not request a mode.
    #[error("the command does not enter a mode")]
    NoModeEntry,

    /// Pop target outside `1..=depth`.
    #[error("invalid mode depth {depth} (current depth {current})")]
    InvalidDepth {
        /// Requested depth.
        depth: usize,
        /// Current depth.
        current: usize,
    },
}

impl ModeError {
    /// Diagnostic form.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ModeError::DepthExceeded { .. } => {
                Diagnostic::from_code(codes::MODE_DEPTH_EXCEEDED, self.to_string(), None)
            }
            _ => Diagnostic::error(codes::COMMAND_FAILED, self.to_string(), None),
        }
    }
}

/// Why a line could not be executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// The line was rejected by the parser.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A registered command reported failure.
    #[error("{command}: {message}")]
    CommandFailed {
        /// Command keyword.
        command: String,
        /// Callback message.
        message: String,
    },

    /// Mode change failed.
    #[error(transparent)]
    Mode(#[from] ModeError),
}

impl ExecError {
    /// Diagnostic form.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ExecError::Parse(e) => e.to_diagnostic(),
            ExecError::CommandFailed { command, .. } => {
                let ctx = BTreeMap::from([("command".to_string(), command.clone())]);
                Diagnostic::from_code(codes::COMMAND_FAILED, self.to_string(), None)
                    .with_context(ctx)
            }
            ExecError::Mode(e) => e.to_diagnostic(),
        }
    }
}
