//! Implementation of texref-resolve: show where references point.

use crate::session::{self, parse_position, CommonArgs, OutputFormat, Session};
use anyhow::{bail, Result};
use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use texref_core::{FileId, LabelOccurrence, ReferenceOccurrence};
use texref_resolve::Resolution;

/// Resolve the references (`\ref`, `\cite`, ...) of a LaTeX project to their definitions.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The root LaTeX file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only resolve references in this loaded file (default: every file)
    #[arg(long, value_name = "PATH")]
    pub focus: Option<PathBuf>,

    /// Only resolve the reference at LINE:COL of the focused file
    #[arg(long, value_name = "LINE:COL", value_parser = parse_position, requires = "focus")]
    pub at: Option<(usize, usize)>,

    /// Only resolve references to this key
    #[arg(short, long, value_name = "KEY")]
    pub key: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// One resolved reference.
#[derive(Debug, Serialize)]
struct JsonResolution {
    file: String,
    line: usize,
    column: usize,
    command: String,
    key: String,
    status: &'static str,
    #[serde(skip)]
    resolution: Resolution,
    labels: Vec<LabelOccurrence>,
}

/// Run the command, writing to `out`.
///
/// Exits with 1 if any reference is unresolved or ambiguous.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<ExitCode> {
    let session = Session::open(&args.file, args.common.config.as_deref())?;

    let files: Vec<FileId> = match &args.focus {
        Some(path) => vec![session.focus(Some(path))?],
        None => session.load.project.documents().map(|(id, _)| id).collect(),
    };

    let mut results = Vec::new();
    for file in files {
        let Some(document) = session.document(file) else {
            continue;
        };
        let resolver = session.resolver(args.common.scope.for_file(file));

        let references: Vec<ReferenceOccurrence> = match args.at {
            Some((line, col)) => {
                let Some(offset) = document.offset_of(line, col) else {
                    bail!("{}:{line}:{col} is outside the file", document.path().display());
                };
                resolver.reference_at(file, offset).into_iter().collect()
            }
            None => resolver.references_in(file),
        };

        for reference in references {
            if args.key.as_deref().is_some_and(|key| key != reference.key()) {
                continue;
            }
            let Some(command) = session.load.project.node(reference.source) else {
                continue;
            };
            let offset = command.span().start + reference.match_range.start;
            let (line, column) = document.line_col(offset);
            let resolution = Resolution::from_matches(resolver.multi_resolve(&reference)?);
            let status = match resolution {
                Resolution::Unresolved => "unresolved",
                Resolution::Unique(_) => "unique",
                Resolution::Ambiguous(_) => "ambiguous",
            };

            results.push(JsonResolution {
                file: document.path().display().to_string(),
                line,
                column,
                command: reference.command.clone(),
                key: reference.key().to_string(),
                status,
                labels: resolution.labels().to_vec(),
                resolution,
            });
        }
    }

    let failures = results
        .iter()
        .filter(|r| r.resolution.unique().is_none())
        .count();

    match args.common.format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&results)?)?;
        }
        OutputFormat::Text => {
            for result in &results {
                let target = match &result.resolution {
                    Resolution::Unresolved => "unresolved".to_string(),
                    Resolution::Unique(label) => label.provenance(),
                    Resolution::Ambiguous(labels) => format!(
                        "ambiguous: {}",
                        labels
                            .iter()
                            .map(|l| l.provenance())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                };
                writeln!(
                    out,
                    "{}:{}:{}: {}{{{}}} -> {target}",
                    result.file, result.line, result.column, result.command, result.key
                )?;
            }
        }
    }

    if failures > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Main entry point for the resolve command.
pub fn main() -> ExitCode {
    main_with_args(Args::parse())
}

/// Entry point with already parsed arguments.
pub fn main_with_args(args: Args) -> ExitCode {
    session::init_logging(args.common.verbose);

    match run(&args, &mut io::stdout().lock()) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
