//! Core library entry for the `exportmap` CLI.
//!
//! Scans a mixed Python/JavaScript project, extracts the functions and
//! classes each source file declares, and keeps a Markdown document's
//! generated region in sync with them.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod discover;
pub mod error;
pub mod extract;
pub mod logging;
pub mod patch;
pub mod ports;
pub mod report;
pub mod syntax;

use std::env;
use std::path::PathBuf;

use clap::Parser;

use crate::error::{Error, Result};

/// Run the CLI with the provided arguments.
///
/// `--help` and `--version` print their text and return `Ok`.
///
/// # Errors
///
/// Returns an error when argument parsing fails or the run hits a fatal
/// problem (grammar loading, configuration, recording).
pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return Ok(());
        }
        Err(err) => return Err(Error::Usage(err.to_string())),
    };
    logging::init_tracing(cli.verbose);

    let cwd = env::current_dir()
        .map_err(|e| Error::Read { path: PathBuf::from("."), reason: e.to_string() })?;
    let start = match &cli.root {
        Some(root) => cwd.join(root),
        None => cwd,
    };
    let start = start.canonicalize().unwrap_or(start);

    commands::dispatch(&cli, &start)
}
