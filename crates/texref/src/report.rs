//! Diagnostics and their rendering.
//!
//! Uses ariadne for pretty-printed messages with source context, and a flat
//! JSON shape for tools.

use ariadne::{ColorGenerator, Config, IndexType, Label, Report, ReportKind, Source};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use texref_core::{Document, Span};
use texref_parser::ParseError;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Counts toward a failing exit code.
    Error,
    /// Reported only.
    Warning,
}

/// One problem found in a source file.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// File the problem is in.
    pub path: PathBuf,
    /// Where in the file.
    pub span: Span,
    /// Error or warning.
    pub severity: Severity,
    /// Short stable code, e.g. `R0001`.
    pub code: String,
    /// One-line description.
    pub message: String,
    /// Text attached to the highlighted span.
    pub label: String,
    /// Extra lines shown under the report.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// A parse error as a diagnostic.
    pub fn from_parse_error(path: PathBuf, error: &ParseError) -> Self {
        Self {
            path,
            span: error.span,
            severity: Severity::Error,
            code: format!("P{:04}", error.kind_code()),
            message: error.message(),
            label: error.label().to_string(),
            notes: Vec::new(),
        }
    }

    /// Flatten to the JSON shape, computing line and column from `document`.
    pub fn to_json(&self, document: Option<&Document>) -> JsonDiagnostic {
        let position = |offset| document.map_or((1, 1), |doc| doc.line_col(offset));
        let (line, column) = position(self.span.start);
        let (end_line, end_column) = position(self.span.end);
        JsonDiagnostic {
            file: self.path.display().to_string(),
            line,
            column,
            end_line,
            end_column,
            severity: self.severity,
            code: self.code.clone(),
            message: self.message.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// A diagnostic message in JSON format.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// Source file path
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// End line number (1-based)
    pub end_line: usize,
    /// End column number (1-based)
    pub end_column: usize,
    /// Severity: "error" or "warning"
    pub severity: Severity,
    /// Diagnostic code (e.g., "P0001", "R0001")
    pub code: String,
    /// Diagnostic message
    pub message: String,
    /// Additional notes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// JSON output structure for all diagnostics.
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    /// List of diagnostics
    pub diagnostics: Vec<JsonDiagnostic>,
    /// Total error count
    pub error_count: usize,
    /// Total warning count
    pub warning_count: usize,
}

/// Render diagnostics against their source text.
///
/// `source` is the text of `diagnostic.path`; spans outside it are clamped.
pub fn report_diagnostic<W: Write>(
    diagnostic: &Diagnostic,
    source: &str,
    color: bool,
    writer: &mut W,
) -> std::io::Result<()> {
    let path_str = diagnostic.path.display().to_string();
    let kind = match diagnostic.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };
    let start = diagnostic.span.start.min(source.len());
    let end = diagnostic.span.end.clamp(start, source.len());

    let mut label = Label::new((path_str.as_str(), start..end)).with_message(&diagnostic.label);
    if color {
        label = label.with_color(ColorGenerator::new().next());
    }
    // Spans are byte offsets into the source.
    let config = Config::default()
        .with_compact(false)
        .with_color(color)
        .with_index_type(IndexType::Byte);

    let mut report = Report::build(kind, (path_str.as_str(), start..end))
        .with_code(&diagnostic.code)
        .with_message(&diagnostic.message)
        .with_label(label)
        .with_config(config);
    for note in &diagnostic.notes {
        report = report.with_note(note);
    }

    report
        .finish()
        .write((path_str.as_str(), Source::from(source)), &mut *writer)
}

/// Print a summary of errors and warnings.
pub fn print_summary<W: Write>(
    errors: usize,
    warnings: usize,
    color: bool,
    writer: &mut W,
) -> std::io::Result<()> {
    let paint = |code: &str, symbol: &str| {
        if color {
            format!("\x1b[{code}m{symbol}\x1b[0m")
        } else {
            symbol.to_string()
        }
    };

    if errors == 0 && warnings == 0 {
        return writeln!(writer, "{} No problems found", paint("32", "\u{2713}"));
    }

    let error_text = if errors == 1 { "error" } else { "errors" };
    let warning_text = if warnings == 1 { "warning" } else { "warnings" };
    if errors > 0 && warnings > 0 {
        writeln!(
            writer,
            "{} {errors} {error_text}, {warnings} {warning_text}",
            paint("31", "\u{2717}")
        )
    } else if errors > 0 {
        writeln!(writer, "{} {errors} {error_text}", paint("31", "\u{2717}"))
    } else {
        writeln!(writer, "{} {warnings} {warning_text}", paint("33", "\u{26A0}"))
    }
}
