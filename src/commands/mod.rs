//! Command dispatch.

pub mod generate;

use std::env;
use std::path::Path;

use crate::cassette::session::RecordingSession;
use crate::cassette::RECORD_ENV;
use crate::cli::Cli;
use crate::context::ServiceContext;
use crate::error::{Error, Result};

/// Run the pipeline for a parsed command line, starting the root search at `start`.
///
/// When `EXPORTMAP_RECORD` is set to a directory path, all filesystem
/// interactions are recorded to a cassette under that directory.
///
/// # Errors
///
/// Returns an error if the pipeline fails or the recording cannot be saved.
pub fn dispatch(cli: &Cli, start: &Path) -> Result<()> {
    let (ctx, session) = if let Ok(dir) = env::var(RECORD_ENV) {
        let (ctx, session) =
            ServiceContext::recording_at(Path::new(&dir), start).map_err(Error::Recording)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(), None)
    };

    let options = generate::Options {
        include: cli.include_paths(),
        output: cli.output.clone(),
        dry_run: cli.dry_run,
    };
    let result = generate::run(&ctx, start, &options).map(|_| ());

    // Finish recording after the run completes (even on error).
    if let Some(session) = session {
        // Drop the context first to release its recorder handle.
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

fn finish_recording(session: RecordingSession) -> Result<()> {
    let output_dir = session.finish().map_err(Error::Recording)?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}
