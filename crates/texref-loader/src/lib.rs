//! LaTeX project loader with include resolution.
//!
//! This crate reads a root `.tex` file from disk, parses it, and follows its
//! include commands (`\input`, `\include`, `\subfile`, `\bibliography`,
//! `\addbibresource`) to build a [`texref_core::Project`].
//!
//! # Features
//!
//! - Recursive include resolution with cycle detection
//! - Default `.tex` / `.bib` extensions for include targets
//! - Per-file errors collected instead of aborting the load
//!
//! # Example
//!
//! ```no_run
//! use texref_loader::Loader;
//! use std::path::Path;
//!
//! let result = Loader::new().load(Path::new("thesis.tex"))?;
//! for (id, document) in result.project.documents() {
//!     println!("{id}: {}", document.path().display());
//! }
//! # Ok::<(), texref_loader::LoadError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod includes;

pub use includes::{includes_in, IncludeTarget};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use texref_core::{FileId, Project};
use texref_parser::ParseError;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading a file.
    #[error("failed to read file {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Include cycle detected.
    #[error("include cycle detected: {}", .cycle.join(" -> "))]
    IncludeCycle {
        /// The cycle of file paths.
        cycle: Vec<String>,
    },

    /// Parse errors occurred.
    #[error("parse errors in {path}")]
    ParseErrors {
        /// The file with parse errors.
        path: PathBuf,
        /// The parse errors.
        errors: Vec<ParseError>,
    },
}

/// Result of loading a project.
#[derive(Debug)]
pub struct LoadResult {
    /// Every loaded document, root first, then in include order.
    pub project: Project,
    /// Id of the root document.
    pub root: FileId,
    /// All errors encountered during loading.
    pub errors: Vec<LoadError>,
}

/// LaTeX project loader.
#[derive(Debug, Default)]
pub struct Loader {
    /// Files that have been loaded, by canonical path.
    loaded_files: HashMap<PathBuf, FileId>,
    /// Stack for cycle detection during loading.
    include_stack: Vec<PathBuf>,
    /// Directory of the root file. Include targets are looked up here first.
    root_dir: Option<PathBuf>,
}

impl Loader {
    /// Create a new loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a root file and everything it includes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the root file cannot be read. Problems with
    /// included files (missing files, cycles, parse errors) are collected in
    /// [`LoadResult::errors`] so a partial project is still returned.
    pub fn load(&mut self, path: &Path) -> Result<LoadResult, LoadError> {
        let mut project = Project::new();
        let mut errors = Vec::new();
        // File ids from an earlier load point into that load's project.
        self.loaded_files.clear();
        self.include_stack.clear();

        let canonical = path.canonicalize().map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.root_dir = canonical.parent().map(Path::to_path_buf);

        let root = self.load_recursive(&canonical, &mut project, &mut errors)?;
        info!(
            files = project.len(),
            errors = errors.len(),
            "loaded project from {}",
            canonical.display()
        );

        Ok(LoadResult {
            project,
            root,
            errors,
        })
    }

    fn load_recursive(
        &mut self,
        path: &Path,
        project: &mut Project,
        errors: &mut Vec<LoadError>,
    ) -> Result<FileId, LoadError> {
        let path_buf = path.to_path_buf();
        if self.include_stack.contains(&path_buf) {
            let mut cycle: Vec<String> = self
                .include_stack
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            cycle.push(path.display().to_string());
            return Err(LoadError::IncludeCycle { cycle });
        }

        if let Some(&id) = self.loaded_files.get(path) {
            return Ok(id);
        }

        let source = fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("parsing {}", path.display());

        let result = texref_parser::parse(path, source);
        if !result.errors.is_empty() {
            errors.push(LoadError::ParseErrors {
                path: path.to_path_buf(),
                errors: result.errors,
            });
        }

        let targets = includes_in(&result.document);
        let file_id = project.add_document(result.document);
        self.loaded_files.insert(path_buf.clone(), file_id);
        self.include_stack.push(path_buf);

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        for target in targets {
            let full_path = self.locate(&target.path, base_dir);
            let canonical = match full_path.canonicalize() {
                Ok(p) => p,
                Err(e) => {
                    errors.push(LoadError::Io {
                        path: full_path,
                        source: e,
                    });
                    continue;
                }
            };

            match self.load_recursive(&canonical, project, errors) {
                Ok(included) => project.add_include(file_id, included),
                Err(e) => errors.push(e),
            }
        }

        self.include_stack.pop();
        Ok(file_id)
    }

    /// Include targets are relative to the root file's directory, as LaTeX
    /// runs from there. The including file's directory is tried next, which
    /// is where `\subfile` documents expect their own includes.
    fn locate(&self, target: &str, base_dir: &Path) -> PathBuf {
        let candidates = self
            .root_dir
            .iter()
            .map(|root| root.join(target))
            .chain(std::iter::once(base_dir.join(target)));

        let mut fallback = None;
        for candidate in candidates {
            if candidate.is_file() {
                return candidate;
            }
            fallback.get_or_insert(candidate);
        }
        fallback.unwrap_or_else(|| base_dir.join(target))
    }
}

/// Load a LaTeX project.
///
/// This is a convenience function that creates a loader and loads a single file.
pub fn load(path: &Path) -> Result<LoadResult, LoadError> {
    Loader::new().load(path)
}
