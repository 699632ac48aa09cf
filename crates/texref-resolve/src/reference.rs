//! Reference extraction.
//!
//! A reference command's first required parameter holds one or more
//! comma-separated keys. Each non-empty key becomes its own
//! [`ReferenceOccurrence`], with `match_range` pointing at the trimmed key
//! inside the command text. `\cite{a, b}` therefore yields two occurrences
//! sharing one source node. Range commands (`\crefrange{a}{b}`) take a key
//! from each of their first two required parameters.

use crate::classify::{normalize_name, CommandTable};
use texref_core::{CommandNode, Document, FileId, NodeRef, ReferenceOccurrence, Span, Spanned};

/// Commands whose first two required parameters are both keys.
const RANGE_COMMANDS: &[&str] = &[r"\crefrange", r"\Crefrange", r"\cpagerefrange", r"\Cpagerefrange"];

/// Every reference occurrence in a document, in document order.
pub fn references_in(
    file: FileId,
    document: &Document,
    table: &CommandTable,
) -> Vec<ReferenceOccurrence> {
    document
        .commands()
        .flat_map(|(index, cmd)| references_of(NodeRef::new(file, index), cmd, document, table))
        .collect()
}

/// The reference occurrence whose key contains the byte `offset`, if any.
///
/// An offset just past the end of a key still counts, so a cursor placed
/// after `\ref{sec:a` finds `sec:a`.
pub fn reference_at(
    file: FileId,
    document: &Document,
    table: &CommandTable,
    offset: usize,
) -> Option<ReferenceOccurrence> {
    document
        .commands()
        .filter(|(_, cmd)| cmd.span.start <= offset && offset <= cmd.span.end)
        .find_map(|(index, cmd)| {
            references_of(NodeRef::new(file, index), cmd, document, table)
                .into_iter()
                .find(|reference| {
                    let range = reference.match_range.offset_by(cmd.span.start);
                    range.start <= offset && offset <= range.end
                })
        })
}

/// The reference command whose key argument holds the byte `offset`, with
/// its node index.
///
/// Unlike [`reference_at`] this also finds arguments with no key under the
/// cursor yet: `\cite{}`, or `\cite{a, }` after the comma.
pub fn reference_command_at<'d>(
    document: &'d Document,
    table: &CommandTable,
    offset: usize,
) -> Option<(usize, &'d CommandNode)> {
    document.commands().find(|(_, cmd)| {
        table.classify(&cmd.name).is_reference()
            && key_parameters(cmd)
                .iter()
                .any(|param| param.span.start <= offset && offset <= param.span.end)
    })
}

/// The required parameters of a reference command that hold keys.
fn key_parameters(cmd: &CommandNode) -> &[Spanned<String>] {
    let count = if RANGE_COMMANDS.contains(&normalize_name(&cmd.name).as_ref()) {
        2
    } else {
        1
    };
    &cmd.required[..cmd.required.len().min(count)]
}

fn references_of(
    source: NodeRef,
    cmd: &CommandNode,
    document: &Document,
    table: &CommandTable,
) -> Vec<ReferenceOccurrence> {
    let role = table.classify(&cmd.name);
    if !role.is_reference() {
        return Vec::new();
    }
    let Some(raw_text) = document.span_text(cmd.span) else {
        return Vec::new();
    };

    key_parameters(cmd)
        .iter()
        .flat_map(|param| {
            key_ranges(&param.value)
                .into_iter()
                .map(move |range| range.offset_by(param.span.start))
        })
        .filter_map(|absolute| {
            let match_range = absolute.relative_to(cmd.span.start)?;
            Some(ReferenceOccurrence {
                command: cmd.name.clone(),
                raw_text: raw_text.to_string(),
                match_range,
                role,
                source,
            })
        })
        .collect()
}

/// Ranges of the non-empty, trimmed, comma-separated keys in `value`.
pub fn key_ranges(value: &str) -> Vec<Span> {
    let mut ranges = Vec::new();
    let mut start = 0;

    for piece in value.split(',') {
        let leading = piece.len() - piece.trim_start().len();
        let key = piece.trim();
        if !key.is_empty() {
            let key_start = start + leading;
            ranges.push(Span::new(key_start, key_start + key.len()));
        }
        start += piece.len() + 1;
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use texref_core::CommandRole;

    fn refs(source: &str) -> Vec<ReferenceOccurrence> {
        let document = texref_parser::parse("main.tex", source).document;
        references_in(FileId(0), &document, &CommandTable::default())
    }

    fn keys(found: &[ReferenceOccurrence]) -> Vec<&str> {
        found.iter().map(ReferenceOccurrence::key).collect()
    }

    #[test]
    fn test_key_ranges() {
        assert_eq!(
            key_ranges("a, bb ,,c"),
            vec![Span::new(0, 1), Span::new(3, 5), Span::new(8, 9)]
        );
        assert!(key_ranges(" , ").is_empty());
        assert!(key_ranges("").is_empty());
    }

    #[test]
    fn test_single_reference() {
        let found = refs(r"See \ref{fig:1}.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].command, r"\ref");
        assert_eq!(found[0].raw_text, r"\ref{fig:1}");
        assert_eq!(found[0].match_range, Span::new(5, 10));
        assert_eq!(found[0].key(), "fig:1");
        assert_eq!(found[0].role, CommandRole::LabelReferencing);
        assert_eq!(found[0].source, NodeRef::new(FileId(0), 0));
    }

    #[test]
    fn test_multi_key_citation_shares_source() {
        let found = refs(r"\cite[p.~2]{a, b,c}");
        assert_eq!(keys(&found), vec!["a", "b", "c"]);
        assert!(found.iter().all(|r| r.source == found[0].source));
        assert!(found
            .iter()
            .all(|r| r.role == CommandRole::BibliographyReferencing));
        // The optional argument shifts the ranges.
        assert_eq!(found[0].match_range, Span::new(12, 13));
    }

    #[test]
    fn test_ranges_lie_inside_command_text() {
        for r in refs(r"\Cref{ a , b } \citep{x} \ref{ y }") {
            assert!(r.match_range.end <= r.raw_text.len());
            assert_eq!(r.key(), r.key().trim());
            assert!(!r.key().is_empty());
        }
    }

    #[test]
    fn test_non_references_and_empty_arguments_ignored() {
        assert!(refs(r"\label{a} \section{b} \ref{} \cite{ , } \ref").is_empty());
    }

    #[test]
    fn test_references_in_document_order() {
        let found = refs("\\ref{a}\n\\footnote{\\cite{b}}\n\\eqref{c}");
        assert_eq!(keys(&found), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reference_at() {
        let source = r"Text \cite{alpha, beta} more";
        let document = texref_parser::parse("main.tex", source).document;
        let table = CommandTable::default();

        let at = |offset| reference_at(FileId(0), &document, &table, offset).map(|r| r.key().to_string());
        assert_eq!(at(source.find("alpha").unwrap()), Some("alpha".to_string()));
        assert_eq!(at(source.find("beta").unwrap() + 4), Some("beta".to_string()));
        assert_eq!(at(0), None);
        assert_eq!(at(source.find("more").unwrap()), None);
    }

    #[test]
    fn test_range_commands_take_both_keys() {
        let found = refs(r"\crefrange{eq:1}{eq:5} \Crefrange{a}{ b } \ref{x}{y}");
        assert_eq!(keys(&found), vec!["eq:1", "eq:5", "a", "b", "x"]);
        assert_eq!(found[1].match_range, Span::new(17, 21));
        assert_eq!(found[0].source, found[1].source);
    }

    #[test]
    fn test_reference_command_at_empty_argument() {
        let source = "\\label{x}\n\\cite{} and \\cite{knuth84, }";
        let document = texref_parser::parse("main.tex", source).document;
        let table = CommandTable::default();
        let command_at = |offset| reference_command_at(&document, &table, offset).map(|(i, _)| i);

        let empty = source.find("{}").unwrap() + 1;
        assert_eq!(reference_at(FileId(0), &document, &table, empty), None);
        assert_eq!(command_at(empty), Some(1));

        let after_comma = source.rfind('}').unwrap();
        assert_eq!(reference_at(FileId(0), &document, &table, after_comma), None);
        assert_eq!(command_at(after_comma), Some(2));

        assert_eq!(command_at(source.find("{x}").unwrap() + 1), None);
        assert_eq!(command_at(source.find("and").unwrap()), None);
    }
}
