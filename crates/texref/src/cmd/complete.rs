//! Implementation of texref-complete: completion candidates for a reference.

use crate::session::{self, parse_position, CommonArgs, OutputFormat, Session};
use anyhow::{bail, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Offer the keys a reference command could use, with where each is defined.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The root LaTeX file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// The command being completed, e.g. '\cite' or 'ref'
    #[arg(long, value_name = "NAME", required_unless_present = "at", conflicts_with = "at")]
    pub command: Option<String>,

    /// Complete the reference at LINE:COL of the focused file
    #[arg(long, value_name = "LINE:COL", value_parser = parse_position)]
    pub at: Option<(usize, usize)>,

    /// File the position and scope refer to (default: FILE)
    #[arg(long, value_name = "PATH")]
    pub focus: Option<PathBuf>,

    /// Only offer keys starting with this prefix
    #[arg(short, long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run the command, writing to `out`.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<ExitCode> {
    let session = Session::open(&args.file, args.common.config.as_deref())?;
    let focus = session.focus(args.focus.as_deref())?;
    let resolver = session.resolver(args.common.scope.for_file(focus));

    let mut candidates = match (&args.command, args.at) {
        (Some(name), _) => resolver.complete_command(name)?,
        (None, Some((line, col))) => {
            let document = session.document(focus);
            let Some(offset) = document.and_then(|doc| doc.offset_of(line, col)) else {
                bail!("{line}:{col} is outside the file");
            };
            resolver.complete_at(focus, offset)?
        }
        (None, None) => bail!("either --command or --at is required"),
    };
    if let Some(prefix) = &args.prefix {
        candidates.retain(|c| c.key.starts_with(prefix.as_str()));
    }

    match args.common.format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&candidates)?)?;
        }
        OutputFormat::Text => {
            for candidate in &candidates {
                writeln!(out, "{}\t{}", candidate.key, candidate.provenance)?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Main entry point for the complete command.
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
