//! Core types for texref
//!
//! This crate provides the data model shared by the rest of the workspace:
//!
//! - [`Span`] / [`Spanned`] - Byte ranges into source text
//! - [`Document`] / [`Node`] - A parsed file as a flat, document-ordered list of
//!   LaTeX command invocations and BibTeX entries
//! - [`KeySource`] - The "can define a key" capability shared by both node kinds
//! - [`Project`] / [`Scope`] - The file set a call searches, with include edges
//! - [`LabelOccurrence`] / [`ReferenceOccurrence`] - Projections produced by
//!   the resolution engine
//!
//! # Example
//!
//! ```
//! use texref_core::{CommandNode, Document, KeySource, Node, Project, Scope, Span};
//!
//! let source = r"\section{Intro}\label{sec:intro}";
//! let label = CommandNode::new(r"\label", Span::new(15, 32))
//!     .with_required("sec:intro", Span::new(22, 31));
//! assert_eq!(label.extract_key(1), Some("sec:intro"));
//!
//! let mut project = Project::new();
//! let id = project.add_document(Document::new("main.tex", source, vec![Node::Command(label)]));
//! assert_eq!(project.files_in(Scope::File(id)), vec![id]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod document;
pub mod occurrence;
pub mod project;
pub mod span;

pub use document::{BibEntryNode, CommandNode, Document, DocumentKind, KeySource, Node};
pub use occurrence::{CommandRole, LabelKind, LabelOccurrence, ReferenceOccurrence};
pub use project::{FileId, NodeRef, Project, Scope};
pub use span::{Span, Spanned};
