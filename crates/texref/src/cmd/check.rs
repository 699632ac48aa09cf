//! Implementation of texref-check: report undefined references and duplicate labels.

use crate::report::{self, Diagnostic, JsonOutput, Severity};
use crate::session::{self, CommonArgs, OutputFormat, Session};
use anyhow::Result;
use clap::Parser;
use std::collections::HashMap;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use texref_core::{CommandRole, DocumentKind, FileId, LabelOccurrence, Scope};
use texref_loader::LoadError;

/// Check a LaTeX project for undefined references and duplicate labels.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The root LaTeX file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Suppress all output (just use exit code)
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not report labels defined more than once
    #[arg(long)]
    pub allow_duplicates: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run the command, writing to `out`.
///
/// Exits with 1 if any error was found. Duplicate labels are warnings.
pub fn run<W: Write>(args: &Args, out: &mut W, color: bool) -> Result<ExitCode> {
    let session = Session::open(&args.file, args.common.config.as_deref())?;
    let project = &session.load.project;

    // (file the diagnostic is in, diagnostic)
    let mut diagnostics: Vec<(Option<FileId>, Diagnostic)> = Vec::new();
    // Problems that have no position in a file.
    let mut messages: Vec<(Severity, String, String)> = Vec::new();

    for error in &session.load.errors {
        match error {
            LoadError::ParseErrors { path, errors } => {
                let file = project.get_by_path(path);
                diagnostics.extend(
                    errors
                        .iter()
                        .map(|e| (file, Diagnostic::from_parse_error(path.clone(), e))),
                );
            }
            LoadError::Io { .. } => {
                messages.push((Severity::Error, "E0001".to_string(), error.to_string()));
            }
            LoadError::IncludeCycle { .. } => {
                messages.push((Severity::Error, "E0002".to_string(), error.to_string()));
            }
        }
    }

    for (file, document) in project.documents() {
        if document.kind() == DocumentKind::Bibtex {
            continue;
        }
        let resolver = session.resolver(args.common.scope.for_file(file));
        for reference in resolver.references_in(file) {
            if !resolver.multi_resolve(&reference)?.is_empty() {
                continue;
            }
            let Some(command) = project.node(reference.source) else {
                continue;
            };
            let span = reference.match_range.offset_by(command.span().start);
            let (what, label) = match reference.role {
                CommandRole::BibliographyReferencing => {
                    ("citation", "no bibliography entry defines this key")
                }
                _ => ("reference", "no label defines this key"),
            };
            diagnostics.push((
                Some(file),
                Diagnostic {
                    path: document.path().to_path_buf(),
                    span,
                    severity: Severity::Error,
                    code: "R0001".to_string(),
                    message: format!("undefined {what} '{}'", reference.key()),
                    label: label.to_string(),
                    notes: Vec::new(),
                },
            ));
        }
    }

    if !args.allow_duplicates {
        let labels = session.resolver(Scope::Project).collect_labels()?;
        diagnostics.extend(duplicates(&session, &labels));
    }

    let error_count = diagnostics
        .iter()
        .filter(|(_, d)| d.severity == Severity::Error)
        .count()
        + messages.iter().filter(|(s, _, _)| *s == Severity::Error).count();
    let warning_count = diagnostics.len() + messages.len() - error_count;

    match args.common.format {
        OutputFormat::Json => {
            let mut json: Vec<_> = diagnostics
                .iter()
                .map(|(file, d)| d.to_json(file.and_then(|id| project.get(id))))
                .collect();
            json.extend(messages.iter().map(|(severity, code, message)| {
                report::JsonDiagnostic {
                    file: args.file.display().to_string(),
                    line: 1,
                    column: 1,
                    end_line: 1,
                    end_column: 1,
                    severity: *severity,
                    code: code.clone(),
                    message: message.clone(),
                    notes: Vec::new(),
                }
            }));
            let output = JsonOutput {
                diagnostics: json,
                error_count,
                warning_count,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        OutputFormat::Text if args.quiet => {}
        OutputFormat::Text => {
            for (_, code, message) in &messages {
                writeln!(out, "error[{code}]: {message}")?;
            }
            for (file, diagnostic) in &diagnostics {
                let source = file
                    .and_then(|id| project.get(id))
                    .map_or("", |doc| doc.source());
                report::report_diagnostic(diagnostic, source, color, out)?;
            }
            report::print_summary(error_count, warning_count, color, out)?;
        }
    }

    if error_count > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// One warning per definition of a key after its first.
fn duplicates(session: &Session, labels: &[LabelOccurrence]) -> Vec<(Option<FileId>, Diagnostic)> {
    let project = &session.load.project;
    let mut first_seen: HashMap<&str, &LabelOccurrence> = HashMap::new();
    let mut found = Vec::new();

    for label in labels {
        let Some(first) = first_seen.get(label.key.as_str()) else {
            first_seen.insert(&label.key, label);
            continue;
        };
        let (Some(document), Some(node)) = (project.get(label.source.file), project.node(label.source))
        else {
            continue;
        };
        found.push((
            Some(label.source.file),
            Diagnostic {
                path: document.path().to_path_buf(),
                span: node.span(),
                severity: Severity::Warning,
                code: "R0002".to_string(),
                message: format!("'{}' is defined more than once", label.key),
                label: "defined again here".to_string(),
                notes: vec![format!("first defined at {}", first.provenance())],
            },
        ));
    }

    found
}

/// Main entry point for the check command.
pub fn main() -> ExitCode {
    main_with_args(Args::parse())
}

/// Entry point with already parsed arguments.
pub fn main_with_args(args: Args) -> ExitCode {
    session::init_logging(args.common.verbose);

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    match run(&args, &mut stdout.lock(), color) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
