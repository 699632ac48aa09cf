//! BibTeX tree builder.
//!
//! Produces one [`BibEntryNode`] per citable entry. `@string`, `@preamble`
//! and `@comment` blocks are skipped; text outside entries is ignored, as
//! BibTeX itself does.

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{tokenize_bibtex, BibToken};
use texref_core::{BibEntryNode, Node, Span, Spanned};

/// Entry types that do not define a citation key.
const NON_CITABLE: &[&str] = &["string", "preamble", "comment"];

/// Build entry nodes from BibTeX source.
pub fn parse_bibtex(source: &str) -> (Vec<Node>, Vec<ParseError>) {
    let tokens = tokenize_bibtex(source);
    let mut nodes = Vec::new();
    let mut errors = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let (token, header) = tokens[i];
        let BibToken::EntryType(raw_type) = token else {
            i += 1;
            continue;
        };
        let entry_type = &raw_type[1..];

        let open = i + 1;
        let Some(&(delimiter, _)) = tokens.get(open) else {
            errors.push(ParseError::new(
                ParseErrorKind::MissingEntryBody(entry_type.to_string()),
                header,
            ));
            break;
        };
        if !matches!(delimiter, BibToken::LBrace | BibToken::LParen) {
            errors.push(ParseError::new(
                ParseErrorKind::MissingEntryBody(entry_type.to_string()),
                header,
            ));
            i = open;
            continue;
        }

        let entry_end = find_entry_end(&tokens, open);
        let (end, limit, resume) = match entry_end {
            EntryEnd::Closed(c) => (tokens[c].1.end, c + 1, c + 1),
            EntryEnd::Interrupted(h) => (tokens[h - 1].1.end, h, h),
            EntryEnd::Eof => (source.len(), tokens.len(), tokens.len()),
        };
        if !matches!(entry_end, EntryEnd::Closed(_)) {
            errors.push(ParseError::new(
                ParseErrorKind::UnclosedEntry(entry_type.to_string()),
                header,
            ));
        }

        if !NON_CITABLE
            .iter()
            .any(|skip| skip.eq_ignore_ascii_case(entry_type))
        {
            let identifier = read_identifier(source, &tokens, open, limit);
            let has_key = matches!(tokens.get(open + 1), Some((BibToken::Word(_), _)));
            if !has_key {
                errors.push(ParseError::new(
                    ParseErrorKind::MissingEntryKey(entry_type.to_string()),
                    identifier.span,
                ));
            }
            nodes.push(Node::BibEntry(BibEntryNode {
                entry_type: entry_type.to_string(),
                identifier,
                span: Span::new(header.start, end),
            }));
        }

        i = resume;
    }

    (nodes, errors)
}

/// The identifier token: from the opening delimiter through the first `,` or
/// the closing delimiter of the entry, whichever comes first. `limit` is one
/// past the last token of the entry.
fn read_identifier(
    source: &str,
    tokens: &[(BibToken<'_>, Span)],
    open: usize,
    limit: usize,
) -> Spanned<String> {
    let start = tokens[open].1.start;
    let end = tokens[open + 1..limit]
        .iter()
        .find(|(t, _)| matches!(t, BibToken::Comma | BibToken::RBrace | BibToken::RParen))
        .map_or_else(|| tokens[limit - 1].1.end, |(_, span)| span.end);

    let span = Span::new(start, end);
    Spanned::new(source[span.into_range()].to_string(), span)
}

/// How an entry body ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryEnd {
    /// Index of the closing delimiter.
    Closed(usize),
    /// Index of a new entry header found before the body closed.
    Interrupted(usize),
    /// The file ended first.
    Eof,
}

/// Find where the entry opened at `open` ends.
fn find_entry_end(tokens: &[(BibToken<'_>, Span)], open: usize) -> EntryEnd {
    let paren = matches!(tokens[open].0, BibToken::LParen);
    // Nesting depth of the entry's own top level.
    let top = usize::from(!paren);
    let mut braces = 0usize;
    let mut parens = 0usize;
    let mut quoted = false;

    for (i, (token, _)) in tokens.iter().enumerate().skip(open) {
        match token {
            BibToken::LBrace => braces += 1,
            BibToken::RBrace => {
                braces = braces.saturating_sub(1);
                if !paren && braces == 0 {
                    return EntryEnd::Closed(i);
                }
            }
            BibToken::LParen if paren && braces == 0 && !quoted => parens += 1,
            BibToken::RParen if paren && braces == 0 && !quoted => {
                parens = parens.saturating_sub(1);
                if parens == 0 {
                    return EntryEnd::Closed(i);
                }
            }
            BibToken::Quote if braces == top => quoted = !quoted,
            BibToken::EntryType(_) if braces == top && !quoted => {
                return EntryEnd::Interrupted(i);
            }
            _ => {}
        }
    }

    EntryEnd::Eof
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(source: &str) -> Vec<BibEntryNode> {
        let (nodes, _) = parse_bibtex(source);
        nodes
            .into_iter()
            .filter_map(|n| match n {
                Node::BibEntry(entry) => Some(entry),
                Node::Command(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_single_entry() {
        let source = "@article{smith2020,\n  title = {On {Things}},\n  year = 2020\n}\n";
        let (nodes, errors) = parse_bibtex(source);
        assert!(errors.is_empty());
        assert_eq!(nodes.len(), 1);

        let entry = nodes[0].as_bib_entry().unwrap();
        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.identifier.value, "{smith2020,");
        assert_eq!(entry.span, Span::new(0, source.len() - 1));
    }

    #[test]
    fn test_paren_delimited_entry() {
        let found = entries("@book(knuth84, title = \"TeX\")");
        assert_eq!(found[0].identifier.value, "(knuth84,");
    }

    #[test]
    fn test_entry_without_fields() {
        let found = entries("@misc{lonely}");
        assert_eq!(found[0].identifier.value, "{lonely}");
    }

    #[test]
    fn test_non_citable_blocks_skipped() {
        let found = entries(
            "@string{ieee = \"IEEE\"}\n@Comment{whatever}\n@preamble{\"x\"}\n@inproceedings{a1, booktitle = ieee}",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entry_type, "inproceedings");
    }

    #[test]
    fn test_text_between_entries_ignored() {
        let found = entries("Some notes here.\n@article{a,}\nmore notes\n@article{b,}");
        let ids: Vec<_> = found.iter().map(|e| e.identifier.value.as_str()).collect();
        assert_eq!(ids, vec!["{a,", "{b,"]);
    }

    #[test]
    fn test_missing_key_reported_and_kept() {
        let (nodes, errors) = parse_bibtex("@article{, title = {x}}");
        assert_eq!(nodes.len(), 1);
        assert_eq!(errors[0].kind, ParseErrorKind::MissingEntryKey("article".to_string()));
    }

    #[test]
    fn test_unclosed_entry_does_not_swallow_next() {
        let (nodes, errors) = parse_bibtex("@article{a, title = {x}\n@book{b, title = {y}}");
        assert_eq!(nodes.len(), 2);
        assert!(errors
            .iter()
            .any(|e| e.kind == ParseErrorKind::UnclosedEntry("article".to_string())));
    }

    #[test]
    fn test_missing_body() {
        let (nodes, errors) = parse_bibtex("@article smith");
        assert!(nodes.is_empty());
        assert_eq!(errors[0].kind, ParseErrorKind::MissingEntryBody("article".to_string()));
    }
}
