//! LaTeX and BibTeX tree construction for texref.
//!
//! This crate turns source text into a [`texref_core::Document`]. It is not a
//! LaTeX grammar: it recognizes command invocations with their `[...]` and
//! `{...}` arguments, `%` comments, and BibTeX entry headers, which is all the
//! resolution engine needs.
//!
//! # Example
//!
//! ```
//! use texref_parser::parse;
//!
//! let result = parse("main.tex", "See \\ref{fig:plot}.\n\\label{fig:plot}\n");
//! assert!(result.errors.is_empty());
//! assert_eq!(result.document.nodes().len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bibtex;
mod error;
pub mod lexer;
mod latex;

pub use bibtex::parse_bibtex;
pub use error::{ParseError, ParseErrorKind};
pub use latex::parse_latex;

use std::path::PathBuf;
use texref_core::{Document, DocumentKind};

/// Result of parsing one file.
#[derive(Debug)]
pub struct ParseResult {
    /// The document tree.
    pub document: Document,
    /// Problems found along the way. The tree is usable regardless.
    pub errors: Vec<ParseError>,
}

/// Parse a file, choosing LaTeX or BibTeX from its extension.
pub fn parse(path: impl Into<PathBuf>, source: impl Into<String>) -> ParseResult {
    let path = path.into();
    let source = source.into();

    let (nodes, errors) = match DocumentKind::from_path(&path) {
        DocumentKind::Latex => parse_latex(&source),
        DocumentKind::Bibtex => parse_bibtex(&source),
    };

    ParseResult {
        document: Document::new(path, source, nodes),
        errors,
    }
}
