//! The set of documents a resolve or complete call may look at.

use crate::document::{Document, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Identifier of a document inside a [`Project`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub usize);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Non-owning handle to a node: the file it lives in and its index there.
///
/// Handles are resolved back through [`Project::node`]; they never keep the
/// tree alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    /// The containing document.
    pub file: FileId,
    /// Index into [`Document::nodes`].
    pub index: usize,
}

impl NodeRef {
    /// Create a node handle.
    #[must_use]
    pub const fn new(file: FileId, index: usize) -> Self {
        Self { file, index }
    }
}

/// Which documents a call searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// A single document.
    File(FileId),
    /// A document and everything it includes, transitively.
    IncludeClosure(FileId),
    /// Every document in the project.
    Project,
}

/// An ordered set of documents plus the include edges between them.
#[derive(Debug, Clone, Default)]
pub struct Project {
    documents: Vec<Document>,
    includes: Vec<Vec<FileId>>,
}

impl Project {
    /// Create an empty project.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document and return its id.
    pub fn add_document(&mut self, document: Document) -> FileId {
        let id = FileId(self.documents.len());
        self.documents.push(document);
        self.includes.push(Vec::new());
        id
    }

    /// Record that `from` includes `to`.
    ///
    /// Edges naming unknown files and duplicate edges are ignored.
    pub fn add_include(&mut self, from: FileId, to: FileId) {
        if to.0 >= self.documents.len() {
            return;
        }
        if let Some(edges) = self.includes.get_mut(from.0) {
            if !edges.contains(&to) {
                edges.push(to);
            }
        }
    }

    /// Get a document by id.
    #[must_use]
    pub fn get(&self, id: FileId) -> Option<&Document> {
        self.documents.get(id.0)
    }

    /// Find a document by path.
    #[must_use]
    pub fn get_by_path(&self, path: &Path) -> Option<FileId> {
        self.documents
            .iter()
            .position(|doc| doc.path() == path)
            .map(FileId)
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the project has no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All documents with their ids, in insertion order.
    pub fn documents(&self) -> impl Iterator<Item = (FileId, &Document)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (FileId(i), doc))
    }

    /// Files directly included by `id`.
    #[must_use]
    pub fn includes_of(&self, id: FileId) -> &[FileId] {
        self.includes
            .get(id.0)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolve a node handle.
    #[must_use]
    pub fn node(&self, node: NodeRef) -> Option<&Node> {
        self.get(node.file)?.node(node.index)
    }

    /// The files a scope covers, in enumeration order.
    ///
    /// Unknown root files produce an empty list.
    #[must_use]
    pub fn files_in(&self, scope: Scope) -> Vec<FileId> {
        match scope {
            Scope::File(id) => self.get(id).map(|_| vec![id]).unwrap_or_default(),
            Scope::IncludeClosure(root) => self.include_closure(root),
            Scope::Project => (0..self.documents.len()).map(FileId).collect(),
        }
    }

    /// The root followed by every file it reaches through includes, in
    /// depth-first pre-order. Include cycles are visited once.
    #[must_use]
    pub fn include_closure(&self, root: FileId) -> Vec<FileId> {
        if self.get(root).is_none() {
            return Vec::new();
        }

        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            // Reverse so the first include is visited first.
            for &child in self.includes_of(id).iter().rev() {
                if !seen.contains(&child) {
                    stack.push(child);
                }
            }
        }

        order
    }
}
