//! Splitting a command line into words with their byte spans.

use schemash_diagnostics::Span;
use serde::Serialize;

use crate::error::{ErrorKind, ParseError};

/// One word of a command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    /// Text with quotes removed and escapes resolved.
    pub text: String,
    /// Byte span of the word in the line, quotes included.
    pub span: Span,
    /// Whether any part of the word was quoted.
    pub quoted: bool,
}

impl Word {
    /// A word that did not come from a line, e.g. an argv element.
    pub fn bare(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
            quoted: false,
        }
    }
}

/// A tokenized line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Words {
    /// Words in order.
    pub words: Vec<Word>,
    /// Whether the line ends in whitespace, i.e. the last word is finished.
    pub trailing_space: bool,
}

/// Split a command line into words.
///
/// Words are separated by ASCII whitespace. `"..."` and `'...'` group
/// whitespace into a word; inside double quotes a backslash escapes the
/// next character. Quoted and unquoted parts may be adjacent (`a"b c"`).
/// An unterminated quote or an empty quoted word is an error.
pub fn tokenize(line: &str) -> Result<Words, ParseError> {
    let b = line.as_bytes();
    let mut out = Words::default();
    let mut i = 0usize;
    while i < b.len() {
        if b[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        let mut text = String::new();
        let mut quoted = false;
        // Byte offsets of `line` are only sliced at ASCII positions, so
        // every slice below lands on a char boundary.
        while i < b.len() && !b[i].is_ascii_whitespace() {
            match b[i] {
                q @ (b'"' | b'\'') => {
                    quoted = true;
                    let open = i;
                    i += 1;
                    let mut run = i;
                    loop {
                        if i >= b.len() {
                            return Err(ParseError::new(
                                ErrorKind::InvalidInput,
                                "unterminated quote",
                            )
                            .at(Span::new(open, b.len())));
                        }
                        if b[i] == q {
                            text.push_str(&line[run..i]);
                            i += 1;
                            break;
                        }
                        if q == b'"' && b[i] == b'\\' && i + 1 < b.len() {
                            text.push_str(&line[run..i]);
                            let ch_len = line[i + 1..].chars().next().map_or(1, char::len_utf8);
                            text.push_str(&line[i + 1..i + 1 + ch_len]);
                            i += 1 + ch_len;
                            run = i;
                            continue;
                        }
                        i += 1;
                    }
                }
                _ => {
                    let run = i;
                    while i < b.len()
                        && !b[i].is_ascii_whitespace()
                        && b[i] != b'"'
                        && b[i] != b'\''
                    {
                        i += 1;
                    }
                    text.push_str(&line[run..i]);
                }
            }
        }
        if quoted && text.is_empty() {
            return Err(ParseError::new(ErrorKind::InvalidInput, "empty quoted word")
                .at(Span::new(start, i)));
        }
        out.words.push(Word {
            text,
            span: Span::new(start, i),
            quoted,
        });
    }
    out.trailing_space = b.last().is_some_and(u8::is_ascii_whitespace);
    Ok(out)
}
