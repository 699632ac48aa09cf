//! Logos tokenizers for LaTeX and BibTeX.
//!
//! Both lexers are deliberately shallow: they only separate what the tree
//! builders need (command names, group delimiters, comments, entry headers)
//! and leave everything else as opaque text.

use logos::Logos;
use texref_core::Span;

/// LaTeX tokens.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexToken<'src> {
    /// A control word such as `\label` or `\cite*`. The slice includes the backslash.
    #[regex(r"\\[a-zA-Z@]+\*?")]
    Command(&'src str),

    /// A control symbol such as `\%`, `\{` or `\\`.
    #[regex(r"\\[^a-zA-Z@]")]
    ControlSymbol(&'src str),

    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,

    /// A `%` comment up to (not including) the end of the line.
    #[regex(r"%[^\n]*")]
    Comment(&'src str),

    /// A run of whitespace, newlines included.
    #[regex(r"[ \t\r\n]+")]
    Whitespace(&'src str),

    /// Any other run of text.
    #[regex(r"[^\\{}\[\]% \t\r\n]+")]
    Text(&'src str),

    /// Input the lexer could not classify (a trailing lone backslash).
    Error,
}

/// BibTeX tokens. Whitespace is skipped.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum BibToken<'src> {
    /// An entry header such as `@article`. The slice includes the `@`.
    #[regex(r"@[a-zA-Z]+")]
    EntryType(&'src str),

    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `,`
    #[token(",")]
    Comma,
    /// `=`
    #[token("=")]
    Equals,
    /// `"`
    #[token("\"")]
    Quote,

    /// A key, field name, or value fragment.
    #[regex(r#"[^@{}(),="\s]+"#)]
    Word(&'src str),

    /// Input the lexer could not classify (a bare `@`).
    Error,
}

/// Tokenize LaTeX source into `(token, span)` pairs.
pub fn tokenize_latex(source: &str) -> Vec<(TexToken<'_>, Span)> {
    let mut lexer = TexToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span: Span = lexer.span().into();
        tokens.push((result.unwrap_or(TexToken::Error), span));
    }

    tokens
}

/// Tokenize BibTeX source into `(token, span)` pairs.
pub fn tokenize_bibtex(source: &str) -> Vec<(BibToken<'_>, Span)> {
    let mut lexer = BibToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span: Span = lexer.span().into();
        tokens.push((result.unwrap_or(BibToken::Error), span));
    }

    tokens
}
