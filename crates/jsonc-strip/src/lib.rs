//! Relaxed-JSON preprocessing shared by the schema, profile and diagnostics
//! loaders.
//!
//! Hand-written schema files tend to carry comments and trailing commas.
//! [`strip_jsonc`] turns such input into strict JSON that `serde_json`
//! accepts, without touching anything inside string literals.

/// Lexical state while scanning the input.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    Str,
    LineComment,
    BlockComment,
}

/// Strip `//` and `/* */` comments and trailing commas from JSONC input.
///
/// Comments are replaced by nothing (block comments keep their newlines so
/// line numbers in later `serde_json` errors still line up). A comma whose
/// next significant character is `}` or `]` is dropped.
#[must_use]
pub fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut state = Scan::Code;
    // Byte offset in `out` of a comma that may turn out to be trailing.
    let mut pending_comma: Option<usize> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Scan::Str => {
                out.push(c);
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    }
                    '"' => state = Scan::Code,
                    _ => {}
                }
            }
            Scan::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = Scan::Code;
                }
            }
            Scan::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = Scan::Code;
                } else if c == '\n' {
                    out.push('\n');
                }
            }
            Scan::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = Scan::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = Scan::BlockComment;
                }
                '}' | ']' => {
                    if let Some(at) = pending_comma.take() {
                        out.replace_range(at..at + 1, " ");
                    }
                    out.push(c);
                }
                ',' => {
                    pending_comma = Some(out.len());
                    out.push(c);
                }
                '"' => {
                    pending_comma = None;
                    state = Scan::Str;
                    out.push(c);
                }
                c if c.is_whitespace() => out.push(c),
                _ => {
                    pending_comma = None;
                    out.push(c);
                }
            },
        }
    }
    out
}
