//! Recording session owning the cassette recorders of one run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::recorder::CassetteRecorder;

/// Owns the per-port recorders of a recording run.
///
/// Cassettes are stored in a timestamped directory below the base directory
/// given to [`RecordingSession::new`], one `<port>.cassette.yaml` per port.
pub struct RecordingSession {
    /// Recorder for filesystem interactions.
    pub fs: Arc<Mutex<CassetteRecorder>>,
    /// Output directory containing all cassette files.
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Create a new recording session below `base_dir`.
    ///
    /// `project_dir` is only used to stamp the cassette with its git commit.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The cassette directory already exists
    /// - The directory cannot be created
    pub fn new(base_dir: &Path, project_dir: &Path) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = base_dir.join(&timestamp);

        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }

        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let commit = get_commit_hash(project_dir);
        let path = output_dir.join("fs.cassette.yaml");
        let fs = Arc::new(Mutex::new(CassetteRecorder::new(path, format!("{timestamp}-fs"), commit)));

        Ok(Self { fs, output_dir })
    }

    /// Directory the cassettes are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Finish all recorders and write cassette files to disk.
    ///
    /// Every adapter holding a recorder must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if a recorder is still shared or a file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.fs)
            .map_err(|_| "Recording adapter for fs still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock for fs poisoned: {e}"))?;
        tracing::debug!(interactions = recorder.len(), "writing fs cassette");
        recorder.finish().map_err(|e| format!("Failed to write fs cassette: {e}"))?;
        Ok(self.output_dir)
    }
}

/// Get the current git commit hash of `dir`, or "unknown" if unavailable.
fn get_commit_hash(dir: &Path) -> String {
    let hash = std::process::Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string());

    hash.unwrap_or_else(|| {
        tracing::warn!("could not read git commit hash of {}, using 'unknown'", dir.display());
        "unknown".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn session_creates_output_directory_and_finishes() {
        let base = TempDir::new().unwrap();
        let session = RecordingSession::new(base.path(), base.path()).unwrap();
        let dir = session.output_dir().to_path_buf();
        assert!(dir.exists(), "Output directory should exist after new()");

        session.fs.lock().unwrap().record(
            "fs",
            "exists",
            serde_json::json!({"path": "/p"}),
            serde_json::json!(false),
        );

        let finished = session.finish().unwrap();
        assert_eq!(finished, dir);
        assert!(dir.join("fs.cassette.yaml").exists());
    }

    #[test]
    fn finish_fails_while_an_adapter_still_holds_the_recorder() {
        let base = TempDir::new().unwrap();
        let session = RecordingSession::new(base.path(), base.path()).unwrap();
        let _held = Arc::clone(&session.fs);
        assert!(session.finish().unwrap_err().contains("still has references"));
    }

    #[test]
    fn commit_hash_outside_a_repository_is_unknown_or_a_hash() {
        let dir = TempDir::new().unwrap();
        let hash = get_commit_hash(dir.path());
        assert!(!hash.is_empty());
    }
}
