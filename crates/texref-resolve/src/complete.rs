//! Completion candidates for reference commands.
//!
//! `\cite`-like commands are offered BibTeX entries and `\bibitem` keys;
//! `\ref`-like commands are offered LaTeX labels only. Anything else gets
//! nothing. Candidates keep collection order and carry `file:line`
//! provenance.

use crate::cancel::{CancellationToken, Cancelled};
use crate::classify::CommandTable;
use crate::collect::collect_labels;
use crate::reference::{reference_at, reference_command_at};
use serde::Serialize;
use texref_core::{
    CommandRole, FileId, LabelKind, LabelOccurrence, Project, ReferenceOccurrence, Scope,
};
use tracing::debug;

/// A key offered for completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionCandidate {
    /// The key to insert.
    pub key: String,
    /// `file:line` of the defining node.
    pub provenance: String,
    /// What defined the key.
    pub kind: LabelKind,
}

impl From<&LabelOccurrence> for CompletionCandidate {
    fn from(label: &LabelOccurrence) -> Self {
        Self {
            key: label.key.clone(),
            provenance: label.provenance(),
            kind: label.kind,
        }
    }
}

/// Candidates for a command with the given role.
pub fn complete_role(
    project: &Project,
    scope: Scope,
    table: &CommandTable,
    role: CommandRole,
    token: &CancellationToken,
) -> Result<Vec<CompletionCandidate>, Cancelled> {
    let wanted = |kind: LabelKind| match role {
        CommandRole::BibliographyReferencing => kind.is_bibliographic(),
        CommandRole::LabelReferencing => kind == LabelKind::Label,
        CommandRole::LabelDefining | CommandRole::None => false,
    };
    if !role.is_reference() {
        return Ok(Vec::new());
    }

    let candidates: Vec<CompletionCandidate> = collect_labels(project, scope, table, token)?
        .iter()
        .filter(|label| wanted(label.kind))
        .map(CompletionCandidate::from)
        .collect();

    debug!(%role, count = candidates.len(), "completion candidates");
    Ok(candidates)
}

/// Candidates for the key of an existing reference.
pub fn complete(
    project: &Project,
    scope: Scope,
    table: &CommandTable,
    reference: &ReferenceOccurrence,
    token: &CancellationToken,
) -> Result<Vec<CompletionCandidate>, Cancelled> {
    complete_role(project, scope, table, reference.role, token)
}

/// Candidates for the command being typed, by name (`\cite` or `cite`).
pub fn complete_command(
    project: &Project,
    scope: Scope,
    table: &CommandTable,
    command_name: &str,
    token: &CancellationToken,
) -> Result<Vec<CompletionCandidate>, Cancelled> {
    complete_role(project, scope, table, table.classify(command_name), token)
}

/// Candidates for the cursor at byte `offset` of `file`.
///
/// The cursor may sit on a partly typed key or in a key argument with no key
/// under it yet (`\cite{}`, `\cite{a, }`); both complete from the command's
/// role. Anywhere else there are no candidates.
pub fn complete_at(
    project: &Project,
    scope: Scope,
    table: &CommandTable,
    file: FileId,
    offset: usize,
    token: &CancellationToken,
) -> Result<Vec<CompletionCandidate>, Cancelled> {
    let Some(document) = project.get(file) else {
        return Ok(Vec::new());
    };
    if let Some(reference) = reference_at(file, document, table, offset) {
        return complete(project, scope, table, &reference, token);
    }
    match reference_command_at(document, table, offset) {
        Some((_, cmd)) => complete_role(project, scope, table, table.classify(&cmd.name), token),
        None => Ok(Vec::new()),
    }
}
