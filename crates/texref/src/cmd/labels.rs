//! Implementation of texref-labels: list label definitions.

use crate::session::{self, CommonArgs, OutputFormat, Session};
use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use texref_core::{LabelKind, LabelOccurrence};

/// List the labels and bibliography keys defined in a LaTeX project.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The root LaTeX file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only show labels defined with this key
    #[arg(short, long, value_name = "KEY")]
    pub key: Option<String>,

    /// Only show BibTeX entries and bibliography items
    #[arg(long)]
    pub bibliography: bool,

    /// File the scope is rooted at (default: FILE)
    #[arg(long, value_name = "PATH")]
    pub focus: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Serialize)]
struct JsonLabel<'a> {
    key: &'a str,
    kind: LabelKind,
    file: &'a str,
    line: usize,
}

impl<'a> From<&'a LabelOccurrence> for JsonLabel<'a> {
    fn from(label: &'a LabelOccurrence) -> Self {
        Self {
            key: &label.key,
            kind: label.kind,
            file: &label.file_name,
            line: label.line,
        }
    }
}

fn kind_name(kind: LabelKind) -> &'static str {
    match kind {
        LabelKind::Label => "label",
        LabelKind::BibItem => "bibitem",
        LabelKind::BibEntry => "entry",
    }
}

/// Run the command, writing to `out`.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<ExitCode> {
    let session = Session::open(&args.file, args.common.config.as_deref())?;
    let focus = session.focus(args.focus.as_deref())?;
    let resolver = session.resolver(args.common.scope.for_file(focus));

    let mut labels = match &args.key {
        Some(key) => resolver.find_labels(key)?,
        None => resolver.collect_labels()?,
    };
    if args.bibliography {
        labels.retain(|label| label.kind.is_bibliographic());
    }

    match args.common.format {
        OutputFormat::Json => {
            let json: Vec<JsonLabel<'_>> = labels.iter().map(JsonLabel::from).collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputFormat::Text => {
            let width = labels.iter().map(|l| l.key.len()).max().unwrap_or(0);
            for label in &labels {
                writeln!(
                    out,
                    "{:<width$}  {:<7}  {}",
                    label.key,
                    kind_name(label.kind),
                    label.provenance()
                )?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Main entry point for the labels command.
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
