//! LaTeX tree builder.
//!
//! Every control word becomes a [`CommandNode`], including commands nested
//! inside another command's arguments (`\caption{... \label{fig:1}}`), so the
//! node list is in document order of the backslash. Arguments are the `[...]`
//! and `{...}` groups that directly follow the command name, allowing
//! whitespace with at most one line break in between.

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{tokenize_latex, TexToken};
use texref_core::{CommandNode, Node, Span, Spanned};

/// Build command nodes from LaTeX source.
pub fn parse_latex(source: &str) -> (Vec<Node>, Vec<ParseError>) {
    let tokens = tokenize_latex(source);
    let mut errors = Vec::new();
    check_balance(&tokens, &mut errors);

    let nodes = tokens
        .iter()
        .enumerate()
        .filter_map(|(i, (token, span))| match token {
            TexToken::Command(name) => Some(Node::Command(read_command(
                source, &tokens, i, name, *span,
            ))),
            _ => None,
        })
        .collect();

    (nodes, errors)
}

#[derive(Clone, Copy)]
enum Group {
    Required,
    Optional,
}

/// Read the arguments following the command name at `at`.
fn read_command(
    source: &str,
    tokens: &[(TexToken<'_>, Span)],
    at: usize,
    name: &str,
    name_span: Span,
) -> CommandNode {
    let mut node = CommandNode::new(name, name_span);
    let mut end = name_span.end;
    let mut next = at + 1;

    loop {
        let candidate = skip_gap(tokens, next);
        let group = match tokens.get(candidate) {
            Some((TexToken::LBrace, _)) => Group::Required,
            Some((TexToken::LBracket, _)) => Group::Optional,
            _ => break,
        };
        let Some(close) = find_closing(tokens, candidate, group) else {
            break;
        };

        let inner = Span::new(tokens[candidate].1.end, tokens[close].1.start);
        let value = Spanned::new(source[inner.into_range()].to_string(), inner);
        match group {
            Group::Required => node.required.push(value),
            Group::Optional => node.optional.push(value),
        }

        end = tokens[close].1.end;
        next = close + 1;
    }

    node.span = Span::new(name_span.start, end);
    node
}

/// Skip one whitespace token if it holds at most one line break.
fn skip_gap(tokens: &[(TexToken<'_>, Span)], at: usize) -> usize {
    match tokens.get(at) {
        Some((TexToken::Whitespace(ws), _)) if ws.matches('\n').count() <= 1 => at + 1,
        _ => at,
    }
}

/// Find the token closing the group opened at `open`.
///
/// Braces nest. Brackets only count outside of braces, so `[{]}]` is one
/// optional group.
fn find_closing(tokens: &[(TexToken<'_>, Span)], open: usize, group: Group) -> Option<usize> {
    let mut braces = 0usize;
    let mut brackets = 0usize;

    for (i, (token, _)) in tokens.iter().enumerate().skip(open) {
        match (group, token) {
            (_, TexToken::LBrace) => braces += 1,
            (Group::Required, TexToken::RBrace) => {
                braces = braces.checked_sub(1)?;
                if braces == 0 {
                    return Some(i);
                }
            }
            (Group::Optional, TexToken::RBrace) => {
                // A stray `}` ends the enclosing group, so the bracket never closes.
                braces = braces.checked_sub(1)?;
            }
            (Group::Optional, TexToken::LBracket) if braces == 0 => brackets += 1,
            (Group::Optional, TexToken::RBracket) if braces == 0 => {
                brackets -= 1;
                if brackets == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Report unbalanced braces.
fn check_balance(tokens: &[(TexToken<'_>, Span)], errors: &mut Vec<ParseError>) {
    let mut open = Vec::new();

    for (token, span) in tokens {
        match token {
            TexToken::LBrace => open.push(*span),
            TexToken::RBrace => {
                if open.pop().is_none() {
                    errors.push(ParseError::new(ParseErrorKind::UnmatchedClose('}'), *span));
                }
            }
            _ => {}
        }
    }

    errors.extend(
        open.into_iter()
            .map(|span| ParseError::new(ParseErrorKind::UnclosedGroup('{'), span)),
    );
}
