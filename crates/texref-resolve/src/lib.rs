//! Label collection, reference resolution and completion for LaTeX projects.
//!
//! The engine works on an already parsed [`texref_core::Project`]:
//!
//! - [`classify`] - command name to [`CommandRole`](texref_core::CommandRole), with a
//!   process-wide table swapped atomically
//! - [`collect_labels`] - label-defining occurrences in a [`Scope`]
//! - [`references_in`] - reference occurrences of a document, one per key
//! - [`multi_resolve`] / [`resolve`] - the labels a reference points to
//! - [`complete`] - keys a reference could use, with `file:line` provenance
//!
//! Every traversal takes a [`CancellationToken`] and checks it between files.
//!
//! # Example
//!
//! ```
//! use texref_core::{FileId, Project};
//! use texref_resolve::Resolver;
//!
//! let mut project = Project::new();
//! let main = project.add_document(
//!     texref_parser::parse("main.tex", "\\label{eq:1}\nBy \\eqref{eq:1}.").document,
//! );
//!
//! let resolver = Resolver::new(&project);
//! let reference = &resolver.references_in(main)[0];
//! let label = resolver.resolve(reference)?.expect("one definition");
//! assert_eq!(label.provenance(), "main.tex:1");
//! # Ok::<(), texref_resolve::Cancelled>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
pub mod classify;
mod collect;
mod complete;
mod reference;
mod resolve;
mod settings;

pub use cancel::{CancellationToken, Cancelled, Revision};
pub use classify::{Classifier, CommandTable, LabelingCommand};
pub use collect::{collect_labels, find_labels};
pub use complete::{
    complete, complete_at, complete_command, complete_role, CompletionCandidate,
};
pub use reference::{key_ranges, reference_at, reference_command_at, references_in};
pub use resolve::{multi_resolve, resolve, Resolution};
pub use settings::{ConfigError, Settings};

use std::sync::Arc;
use texref_core::{FileId, LabelOccurrence, Project, ReferenceOccurrence, Scope};

/// One project, one command table snapshot, one scope and one token.
///
/// A convenience over the free functions for callers that make several
/// queries against the same state.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    project: &'a Project,
    table: Arc<CommandTable>,
    scope: Scope,
    token: CancellationToken,
}

impl<'a> Resolver<'a> {
    /// Resolve against the whole project with the global command table.
    pub fn new(project: &'a Project) -> Self {
        Self {
            project,
            table: classify::global().snapshot(),
            scope: Scope::Project,
            token: CancellationToken::never(),
        }
    }

    /// Use a specific command table.
    #[must_use]
    pub fn with_table(mut self, table: Arc<CommandTable>) -> Self {
        self.table = table;
        self
    }

    /// Restrict lookups to `scope`.
    #[must_use]
    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Stop early once `token` is cancelled.
    #[must_use]
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// The scope lookups use.
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// The command table in use.
    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Every label in scope.
    pub fn collect_labels(&self) -> Result<Vec<LabelOccurrence>, Cancelled> {
        collect_labels(self.project, self.scope, &self.table, &self.token)
    }

    /// The labels in scope defining `key`.
    pub fn find_labels(&self, key: &str) -> Result<Vec<LabelOccurrence>, Cancelled> {
        find_labels(self.project, self.scope, &self.table, key, &self.token)
    }

    /// Reference occurrences of one document. Unknown files have none.
    pub fn references_in(&self, file: FileId) -> Vec<ReferenceOccurrence> {
        self.project
            .get(file)
            .map(|document| references_in(file, document, &self.table))
            .unwrap_or_default()
    }

    /// The reference under byte `offset` of a document.
    pub fn reference_at(&self, file: FileId, offset: usize) -> Option<ReferenceOccurrence> {
        reference_at(file, self.project.get(file)?, &self.table, offset)
    }

    /// Every label matching a reference.
    pub fn multi_resolve(
        &self,
        reference: &ReferenceOccurrence,
    ) -> Result<Vec<LabelOccurrence>, Cancelled> {
        multi_resolve(self.project, self.scope, &self.table, reference, &self.token)
    }

    /// The single label matching a reference, if unambiguous.
    pub fn resolve(
        &self,
        reference: &ReferenceOccurrence,
    ) -> Result<Option<LabelOccurrence>, Cancelled> {
        resolve(self.project, self.scope, &self.table, reference, &self.token)
    }

    /// Completion candidates for a reference.
    pub fn complete(
        &self,
        reference: &ReferenceOccurrence,
    ) -> Result<Vec<CompletionCandidate>, Cancelled> {
        complete(self.project, self.scope, &self.table, reference, &self.token)
    }

    /// Completion candidates for the cursor at byte `offset` of a document.
    pub fn complete_at(
        &self,
        file: FileId,
        offset: usize,
    ) -> Result<Vec<CompletionCandidate>, Cancelled> {
        complete_at(self.project, self.scope, &self.table, file, offset, &self.token)
    }

    /// Completion candidates for a command name.
    pub fn complete_command(
        &self,
        command_name: &str,
    ) -> Result<Vec<CompletionCandidate>, Cancelled> {
        complete_command(self.project, self.scope, &self.table, command_name, &self.token)
    }
}
