//! Error type shared by the pipeline stages.
//!
//! Per-file variants are logged and downgraded to "skip this file" by their
//! callers. Failures to read or write the target document are reported
//! without changing the exit status.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while scanning, extracting, or patching.
#[derive(Debug, Error)]
pub enum Error {
    /// A tree-sitter grammar could not be loaded into the linked runtime.
    #[error("failed to load the {grammar} grammar: {reason}")]
    GrammarUnavailable {
        /// Grammar name (`python`, `typescript`, `tsx`).
        grammar: &'static str,
        /// Underlying loader message.
        reason: String,
    },

    /// The file extension maps to no known grammar.
    #[error("unsupported file type: {}", path.display())]
    UnsupportedFile {
        /// Offending path.
        path: PathBuf,
    },

    /// A file could not be read.
    #[error("failed to read {}: {reason}", path.display())]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O message.
        reason: String,
    },

    /// The parser produced no tree for a file.
    #[error("failed to parse {}", path.display())]
    Parse {
        /// Path that failed.
        path: PathBuf,
    },

    /// The configuration file is malformed.
    #[error("invalid configuration in {}: {reason}", path.display())]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// The target document could not be written.
    #[error("failed to write {}: {reason}", path.display())]
    Write {
        /// Target document path.
        path: PathBuf,
        /// Underlying I/O message.
        reason: String,
    },

    /// A recording session could not be started or saved.
    #[error("recording failed: {0}")]
    Recording(String),

    /// Command-line arguments were rejected.
    #[error("{0}")]
    Usage(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
