//! Parsed document trees.
//!
//! A [`Document`] is the flat, document-ordered list of nodes an external
//! parser recognized in one file, together with the file text needed to
//! turn offsets into line numbers. Nodes come in two shapes: LaTeX command
//! invocations and BibTeX entries. Both can define a key, which is exposed
//! through the [`KeySource`] capability.

use crate::span::{Span, Spanned};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The language a document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// A LaTeX source file (`.tex`, `.sty`, `.cls`, ...).
    Latex,
    /// A BibTeX database (`.bib`).
    Bibtex,
}

impl DocumentKind {
    /// Guess the document kind from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("bib") => Self::Bibtex,
            _ => Self::Latex,
        }
    }
}

/// A LaTeX command invocation such as `\label{sec:intro}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandNode {
    /// Command name including the leading backslash (`\label`).
    pub name: String,
    /// Required `{...}` parameters in order. Values are the raw text between
    /// the braces; spans cover that text (not the braces).
    pub required: Vec<Spanned<String>>,
    /// Optional `[...]` parameters in order, same layout as `required`.
    pub optional: Vec<Spanned<String>>,
    /// The whole invocation, from the backslash to the last closing delimiter.
    pub span: Span,
}

impl CommandNode {
    /// Create a command node with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            required: Vec::new(),
            optional: Vec::new(),
            span,
        }
    }

    /// Add a required parameter.
    #[must_use]
    pub fn with_required(mut self, value: impl Into<String>, span: Span) -> Self {
        self.required.push(Spanned::new(value.into(), span));
        self
    }

    /// Add an optional parameter.
    #[must_use]
    pub fn with_optional(mut self, value: impl Into<String>, span: Span) -> Self {
        self.optional.push(Spanned::new(value.into(), span));
        self
    }

    /// Get a required parameter by its 1-based position.
    ///
    /// Position `0` and positions past the last parameter yield `None`.
    #[must_use]
    pub fn required_parameter(&self, position: usize) -> Option<&Spanned<String>> {
        position
            .checked_sub(1)
            .and_then(|index| self.required.get(index))
    }
}

/// A BibTeX entry such as `@article{smith2020, ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibEntryNode {
    /// Entry type without the `@`, as written (`article`, `Book`, ...).
    pub entry_type: String,
    /// The identifier token as written, including its opening delimiter and
    /// the delimiter that follows the key (`{smith2020,`).
    pub identifier: Spanned<String>,
    /// The whole entry.
    pub span: Span,
}

/// A node of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// A LaTeX command invocation.
    Command(CommandNode),
    /// A BibTeX entry.
    BibEntry(BibEntryNode),
}

impl Node {
    /// The full source span of the node.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Command(cmd) => cmd.span,
            Self::BibEntry(entry) => entry.span,
        }
    }

    /// The offset used for line-number derivation.
    #[must_use]
    pub const fn text_offset(&self) -> usize {
        match self {
            Self::Command(cmd) => cmd.span.start,
            Self::BibEntry(entry) => entry.identifier.span.start,
        }
    }

    /// Borrow the node as a command, if it is one.
    #[must_use]
    pub const fn as_command(&self) -> Option<&CommandNode> {
        match self {
            Self::Command(cmd) => Some(cmd),
            Self::BibEntry(_) => None,
        }
    }

    /// Borrow the node as a BibTeX entry, if it is one.
    #[must_use]
    pub const fn as_bib_entry(&self) -> Option<&BibEntryNode> {
        match self {
            Self::Command(_) => None,
            Self::BibEntry(entry) => Some(entry),
        }
    }
}

/// Something that can define a label key.
pub trait KeySource {
    /// The key this node defines, trimmed, or `None` if it is missing or empty.
    ///
    /// `position` is the 1-based required parameter that holds the key; it is
    /// only meaningful for command nodes.
    fn extract_key(&self, position: usize) -> Option<&str>;
}

impl KeySource for CommandNode {
    fn extract_key(&self, position: usize) -> Option<&str> {
        let key = self.required_parameter(position)?.value.trim();
        (!key.is_empty()).then_some(key)
    }
}

impl KeySource for BibEntryNode {
    fn extract_key(&self, _position: usize) -> Option<&str> {
        let text = self.identifier.value.as_str();
        let mut chars = text.chars();
        chars.next()?;
        // An entry cut short by the end of file has no closing delimiter.
        let body = chars.as_str();
        let key = body
            .strip_suffix(|c| matches!(c, ',' | '}' | ')'))
            .unwrap_or(body)
            .trim();
        (!key.is_empty()).then_some(key)
    }
}

impl KeySource for Node {
    fn extract_key(&self, position: usize) -> Option<&str> {
        match self {
            Self::Command(cmd) => cmd.extract_key(position),
            Self::BibEntry(entry) => entry.extract_key(position),
        }
    }
}

/// One parsed file.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    kind: DocumentKind,
    source: String,
    /// Line start offsets (byte positions where each line starts).
    line_starts: Vec<usize>,
    nodes: Vec<Node>,
}

impl Document {
    /// Create a document from its path, text, and parsed nodes.
    ///
    /// Nodes are expected in document order.
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>, nodes: Vec<Node>) -> Self {
        let path = path.into();
        let source = source.into();
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            kind: DocumentKind::from_path(&path),
            path,
            source,
            line_starts,
            nodes,
        }
    }

    /// The path the document was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The bare file name, used in provenance labels.
    #[must_use]
    pub fn name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }

    /// The document language.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// The full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All nodes in document order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Get a node by index.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Command nodes with their indices, in document order.
    pub fn commands(&self) -> impl Iterator<Item = (usize, &CommandNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.as_command().map(|cmd| (i, cmd)))
    }

    /// Get the source text for a span, if it is in bounds.
    #[must_use]
    pub fn span_text(&self, span: Span) -> Option<&str> {
        span.text(&self.source)
    }

    /// Get the line and column (1-based) for a byte offset.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self
            .line_starts
            .iter()
            .rposition(|&start| start <= offset)
            .unwrap_or(0);

        let col = offset - self.line_starts[line];

        (line + 1, col + 1)
    }

    /// Get the byte offset of a 1-based line and column.
    ///
    /// Returns `None` if the line does not exist or the column runs past its end.
    #[must_use]
    pub fn offset_of(&self, line: usize, col: usize) -> Option<usize> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map_or(self.source.len(), |next| next - 1);
        let offset = start + col.checked_sub(1)?;
        (offset <= end).then_some(offset)
    }

    /// Get the 1-based line number of a byte offset.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_col(offset).0
    }

    /// Get the total number of lines.
    #[must_use]
    pub fn num_lines(&self) -> usize {
        self.line_starts.len()
    }
}
