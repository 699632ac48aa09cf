//! Parse error types.

use std::fmt;
use texref_core::Span;
use thiserror::Error;

/// A parse error with location information.
///
/// Parse errors never stop tree construction: the parser records them and
/// keeps producing nodes for the rest of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The span where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Get a numeric code for the error kind.
    #[must_use]
    pub const fn kind_code(&self) -> u32 {
        match &self.kind {
            ParseErrorKind::UnclosedGroup(_) => 1,
            ParseErrorKind::UnmatchedClose(_) => 2,
            ParseErrorKind::MissingEntryBody(_) => 3,
            ParseErrorKind::MissingEntryKey(_) => 4,
            ParseErrorKind::UnclosedEntry(_) => 5,
        }
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Get a short label for the error.
    #[must_use]
    pub const fn label(&self) -> &str {
        match &self.kind {
            ParseErrorKind::UnclosedGroup(_) => "opened here",
            ParseErrorKind::UnmatchedClose(_) => "nothing to close",
            ParseErrorKind::MissingEntryBody(_) => "expected '{' or '('",
            ParseErrorKind::MissingEntryKey(_) => "expected citation key",
            ParseErrorKind::UnclosedEntry(_) => "entry starts here",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.span)
    }
}

impl std::error::Error for ParseError {}

/// Kinds of parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A `{` or `[` without its closing counterpart.
    #[error("unclosed group: missing counterpart for '{0}'")]
    UnclosedGroup(char),
    /// A `}` with no open group.
    #[error("unmatched '{0}'")]
    UnmatchedClose(char),
    /// `@type` not followed by a body.
    #[error("entry '@{0}' has no body")]
    MissingEntryBody(String),
    /// An entry body that does not start with a key.
    #[error("entry '@{0}' has no citation key")]
    MissingEntryKey(String),
    /// An entry body that never closes.
    #[error("entry '@{0}' is not closed")]
    UnclosedEntry(String),
}
