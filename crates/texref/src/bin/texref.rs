//! texref - LaTeX label and citation tools.
//!
//! Umbrella binary dispatching to the same implementations as the
//! `texref-*` binaries.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use texref::cmd;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List label definitions and bibliography keys
    Labels(cmd::labels::Args),
    /// Resolve references to their definitions
    Resolve(cmd::resolve::Args),
    /// Offer keys for a reference command
    Complete(cmd::complete::Args),
    /// Report undefined references and duplicate labels
    Check(cmd::check::Args),
}

fn main() -> ExitCode {
    match Cli::parse().command {
        Command::Labels(args) => cmd::labels::main_with_args(args),
        Command::Resolve(args) => cmd::resolve::main_with_args(args),
        Command::Complete(args) => cmd::complete::main_with_args(args),
        Command::Check(args) => cmd::check::main_with_args(args),
    }
}
