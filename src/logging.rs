//! Diagnostic logging setup.

use std::io;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Level selected by the number of `-v` flags.
#[must_use]
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs a stderr subscriber. `RUST_LOG` wins over `verbosity` when set.
///
/// Later calls are no-ops, so tests may run the CLI repeatedly.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity).to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}
