//! Cassette format for recording and replaying port interactions.

pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;

/// Environment variable naming the directory that receives recordings.
pub const RECORD_ENV: &str = "EXPORTMAP_RECORD";
