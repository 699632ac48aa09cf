//! LaTeX label and citation tools.
//!
//! This crate provides command-line tools over a LaTeX project loaded from
//! its root file:
//!
//! - `texref-labels`: List label definitions and bibliography keys
//! - `texref-resolve`: Show where each `\ref` / `\cite` points
//! - `texref-complete`: Offer keys for a reference command
//! - `texref-check`: Report undefined references and duplicate labels
//!
//! Each is also available as a sub-command of `texref`.
//!
//! # Example Usage
//!
//! ```bash
//! texref-check thesis.tex
//! texref-resolve thesis.tex --focus chapters/intro.tex --at 12:18
//! texref complete thesis.tex --command '\cite' --format json
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod report;
pub mod session;
