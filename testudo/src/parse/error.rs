//! Custom errors for parsing Turtle and its derivative formats.

use nom::error::{ErrorKind, ParseError};
use nom::{Err as NErr, IResult};
use std::fmt;

/// An error with the position where it occurred and the set of terminals
/// that were expected there.
///
/// The position is kept as the remaining input, a suffix of the parsed
/// document. Absolute line and column are computed lazily when a
/// [`Diagnostic`] is built.
#[derive(Debug)]
pub struct PosError<'a> {
    /// Remaining input at the point of failure.
    pub input: &'a str,
    /// Names of the alternatives that could have matched here.
    pub expected: Vec<&'static str>,
    /// Fallback for failures raised inside plain `nom` combinators.
    pub kind: Option<ErrorKind>,
}

impl<'a> PosError<'a> {
    /// A new error expecting a single terminal.
    pub fn expected(input: &'a str, what: &'static str) -> Self {
        PosError {
            input,
            expected: vec![what],
            kind: None,
        }
    }

    /// A new error expecting any of the given terminals.
    pub fn expected_any(input: &'a str, what: &[&'static str]) -> Self {
        PosError {
            input,
            expected: what.to_vec(),
            kind: None,
        }
    }

    /// Shortcut for a recoverable `nom` error.
    pub fn err(input: &'a str, what: &'static str) -> NErr<Self> {
        NErr::Error(Self::expected(input, what))
    }

    /// Shortcut for an unrecoverable `nom` failure.
    ///
    /// Used where backtracking must not continue, e.g. a numeric escape
    /// decoding to a forbidden character.
    pub fn failure(input: &'a str, what: &'static str) -> NErr<Self> {
        NErr::Failure(Self::expected(input, what))
    }
}

impl<'a> ParseError<&'a str> for PosError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        PosError {
            input,
            expected: Vec::new(),
            kind: Some(kind),
        }
    }

    fn append(_: &'a str, _: ErrorKind, other: Self) -> Self {
        other
    }

    fn or(mut self, mut other: Self) -> Self {
        // keep the error that advanced furthest; merge expected sets when
        // both failed at the same position
        if other.input.len() < self.input.len() {
            other
        } else if self.input.len() < other.input.len() {
            self
        } else {
            for what in other.expected.drain(..) {
                if !self.expected.contains(&what) {
                    self.expected.push(what);
                }
            }
            self
        }
    }
}

/// Parser result using own error type.
pub type PResult<'a, O> = IResult<&'a str, O, PosError<'a>>;

/// A position in the parsed document. `line` and `column` are zero-based,
/// the column counts code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    /// Zero-based line number.
    pub line: u64,
    /// Zero-based column number in code points.
    pub column: u64,
    /// Byte offset into the document.
    pub offset: usize,
}

/// Computes the position of `rest` within `doc`.
///
/// `rest` must be a suffix of `doc`, which holds for every remaining-input
/// slice the parser produces.
pub fn locate(doc: &str, rest: &str) -> TextPosition {
    let offset = doc.len().saturating_sub(rest.len());
    let consumed = &doc[..offset.min(doc.len())];
    let line = consumed.matches('\n').count() as u64;
    let line_start = consumed.rfind('\n').map_or(0, |p| p + 1);
    let column = consumed[line_start..].chars().count() as u64;
    TextPosition {
        line,
        column,
        offset,
    }
}

/// Extracts the source line containing `pos`.
fn context_line(doc: &str, pos: TextPosition) -> &str {
    let offset = pos.offset.min(doc.len());
    let start = doc[..offset].rfind('\n').map_or(0, |p| p + 1);
    let end = doc[start..]
        .find(|c| c == '\n' || c == '\r')
        .map_or(doc.len(), |p| start + p);
    &doc[start..end]
}

/// A formatted parse error, detached from the document's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Name of the parsed input, usually the file name.
    pub label: String,
    /// Where recognition failed.
    pub position: TextPosition,
    /// The expected set at that position.
    pub expected: Vec<&'static str>,
    /// The source line containing the failure.
    pub context: String,
}

impl Diagnostic {
    /// Builds a diagnostic from a parser error and the document it occurred
    /// in.
    pub fn new(doc: &str, label: &str, err: NErr<PosError<'_>>) -> Self {
        match err {
            NErr::Error(pe) | NErr::Failure(pe) => {
                let position = locate(doc, pe.input);
                let mut expected = pe.expected;
                if expected.is_empty() {
                    expected.push(match pe.kind {
                        Some(ErrorKind::Eof) => "end of input",
                        _ => "a grammar alternative",
                    });
                }
                Diagnostic {
                    label: label.to_owned(),
                    position,
                    expected,
                    context: context_line(doc, position).to_owned(),
                }
            }
            NErr::Incomplete(_) => {
                let position = locate(doc, "");
                Diagnostic {
                    label: label.to_owned(),
                    position,
                    expected: vec!["more input"],
                    context: context_line(doc, position).to_owned(),
                }
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: parse error at line {} column {}: expected ",
            self.label,
            self.position.line + 1,
            self.position.column + 1
        )?;
        for (idx, what) in self.expected.iter().enumerate() {
            if idx > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", what)?;
        }
        writeln!(f)?;
        writeln!(f, "    {}", self.context)?;
        write!(f, "    {}^", " ".repeat(self.position.column as usize))
    }
}

impl std::error::Error for Diagnostic {}

/// A recoverable oddity in the input, reported through the side channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Name of the parsed input.
    pub label: String,
    /// Where the oddity was found.
    pub position: TextPosition,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: warning at line {} column {}: {}",
            self.label,
            self.position.line + 1,
            self.position.column + 1,
            self.message
        )
    }
}
