//! Reference resolution.
//!
//! [`multi_resolve`] returns every label in scope whose key equals the
//! reference key. [`resolve`] only answers when that set has exactly one
//! element; a missing label and an ambiguous one are both "unresolved".

use crate::cancel::{CancellationToken, Cancelled};
use crate::classify::CommandTable;
use crate::collect::find_labels;
use serde::Serialize;
use texref_core::{LabelOccurrence, Project, ReferenceOccurrence, Scope};
use tracing::debug;

/// Outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "labels", rename_all = "snake_case")]
pub enum Resolution {
    /// No label defines the key.
    Unresolved,
    /// Exactly one label defines the key.
    Unique(LabelOccurrence),
    /// Several labels define the key, in collection order.
    Ambiguous(Vec<LabelOccurrence>),
}

impl Resolution {
    /// Classify the result of [`multi_resolve`].
    pub fn from_matches(mut matches: Vec<LabelOccurrence>) -> Self {
        match matches.len() {
            0 => Self::Unresolved,
            1 => Self::Unique(matches.remove(0)),
            _ => Self::Ambiguous(matches),
        }
    }

    /// The unique target, if there is one.
    pub const fn unique(&self) -> Option<&LabelOccurrence> {
        match self {
            Self::Unique(label) => Some(label),
            Self::Unresolved | Self::Ambiguous(_) => None,
        }
    }

    /// Every matching label.
    pub fn labels(&self) -> &[LabelOccurrence] {
        match self {
            Self::Unresolved => &[],
            Self::Unique(label) => std::slice::from_ref(label),
            Self::Ambiguous(labels) => labels,
        }
    }
}

/// Every label in `scope` whose key equals the reference key.
pub fn multi_resolve(
    project: &Project,
    scope: Scope,
    table: &CommandTable,
    reference: &ReferenceOccurrence,
    token: &CancellationToken,
) -> Result<Vec<LabelOccurrence>, Cancelled> {
    let key = reference.key();
    if key.is_empty() {
        return Ok(Vec::new());
    }

    let matches = find_labels(project, scope, table, key, token)?;
    debug!(key, matches = matches.len(), "resolved reference");
    Ok(matches)
}

/// The label a reference points to, if exactly one matches.
pub fn resolve(
    project: &Project,
    scope: Scope,
    table: &CommandTable,
    reference: &ReferenceOccurrence,
    token: &CancellationToken,
) -> Result<Option<LabelOccurrence>, Cancelled> {
    let resolution = Resolution::from_matches(multi_resolve(project, scope, table, reference, token)?);
    Ok(match resolution {
        Resolution::Unique(label) => Some(label),
        Resolution::Unresolved | Resolution::Ambiguous(_) => None,
    })
}
