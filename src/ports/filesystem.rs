//! Filesystem port for file I/O operations.

use std::path::{Path, PathBuf};

/// Error type returned by port implementations.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// Provides filesystem access for reading, writing, and walking files.
///
/// Abstracting the filesystem allows deterministic replay and testing
/// without touching the real disk.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, PortError>;

    /// Writes the given contents to a file, creating or overwriting it.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError>;

    /// Returns `true` if the path exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if the path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Lists the entry names of a directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a directory or cannot be read.
    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError>;

    /// Recursively lists the regular files under `root` in sorted order.
    ///
    /// Entries below `root` whose name starts with `.` are pruned, as are
    /// directories named in `skip_dirs`. `root` itself is always walked.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be read.
    fn walk_files(&self, root: &Path, skip_dirs: &[String]) -> Result<Vec<PathBuf>, PortError>;
}
