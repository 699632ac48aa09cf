//! Label and reference occurrences.
//!
//! Occurrences are read-only projections over a [`Project`](crate::Project):
//! they are recomputed on every call and only point back into the tree
//! through [`NodeRef`] handles.

use crate::project::NodeRef;
use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a command does with label keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandRole {
    /// Introduces a key (`\label`, `\bibitem`).
    LabelDefining,
    /// Looks up a label key (`\ref`, `\eqref`).
    LabelReferencing,
    /// Looks up a bibliography key (`\cite`, `\citep`).
    BibliographyReferencing,
    /// Anything else, including commands nobody configured.
    None,
}

impl CommandRole {
    /// Whether the role looks keys up.
    #[must_use]
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::LabelReferencing | Self::BibliographyReferencing)
    }
}

impl fmt::Display for CommandRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LabelDefining => "label-defining",
            Self::LabelReferencing => "label-referencing",
            Self::BibliographyReferencing => "bibliography-referencing",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Where a label key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelKind {
    /// A LaTeX label command such as `\label`.
    Label,
    /// A bibliography item command such as `\bibitem`.
    BibItem,
    /// A BibTeX database entry.
    BibEntry,
}

impl LabelKind {
    /// Whether `\cite`-like commands can refer to this kind.
    #[must_use]
    pub const fn is_bibliographic(self) -> bool {
        matches!(self, Self::BibItem | Self::BibEntry)
    }
}

/// One label-defining site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelOccurrence {
    /// The defined key. Never empty.
    pub key: String,
    /// What kind of node defined it.
    pub kind: LabelKind,
    /// The defining node.
    pub source: NodeRef,
    /// File name of the containing document.
    pub file_name: String,
    /// 1-based line of the defining node.
    pub line: usize,
    /// For commands configured to label the previous command: the nearest
    /// command before this one in the same document.
    pub labeled: Option<NodeRef>,
}

impl LabelOccurrence {
    /// `file:line`, as shown next to completion candidates.
    #[must_use]
    pub fn provenance(&self) -> String {
        format!("{}:{}", self.file_name, self.line)
    }
}

/// One key looked up by a reference command.
///
/// `\cite{a,b}` produces two occurrences that share the same `source` node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceOccurrence {
    /// Name of the referencing command (`\cite`).
    pub command: String,
    /// The full text of the command invocation.
    pub raw_text: String,
    /// The key, as a range into `raw_text`.
    pub match_range: Span,
    /// `LabelReferencing` or `BibliographyReferencing`.
    pub role: CommandRole,
    /// The referencing command node.
    pub source: NodeRef,
}

impl ReferenceOccurrence {
    /// The key this occurrence looks up.
    ///
    /// An out-of-bounds `match_range` yields an empty key, which matches nothing.
    #[must_use]
    pub fn key(&self) -> &str {
        self.raw_text
            .get(self.match_range.into_range())
            .unwrap_or_default()
    }
}
