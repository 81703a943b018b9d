//! Recording adapter for the `FileSystem` port.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::{record_interaction, record_result};
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{FileSystem, PortError};

/// Records filesystem interactions while delegating to an inner implementation.
pub struct RecordingFileSystem {
    inner: Box<dyn FileSystem>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingFileSystem {
    /// Creates a new recording filesystem wrapping the given implementation.
    pub fn new(inner: Box<dyn FileSystem>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct PathInput<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct WriteInput<'a> {
    path: &'a str,
    contents: &'a str,
}

#[derive(Serialize)]
struct WalkInput<'a> {
    path: &'a str,
    skip_dirs: &'a [String],
}

impl FileSystem for RecordingFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        let result = self.inner.read_to_string(path);
        let input = PathInput { path: &path.display().to_string() };
        record_result(&self.recorder, "fs", "read_to_string", &input, &result);
        result
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        let result = self.inner.write(path, contents);
        let input = WriteInput { path: &path.display().to_string(), contents };
        record_result(&self.recorder, "fs", "write", &input, &result);
        result
    }

    fn exists(&self, path: &Path) -> bool {
        let result = self.inner.exists(path);
        let input = PathInput { path: &path.display().to_string() };
        record_interaction(&self.recorder, "fs", "exists", &input, &result);
        result
    }

    fn is_dir(&self, path: &Path) -> bool {
        let result = self.inner.is_dir(path);
        let input = PathInput { path: &path.display().to_string() };
        record_interaction(&self.recorder, "fs", "is_dir", &input, &result);
        result
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let result = self.inner.list_dir(path);
        let input = PathInput { path: &path.display().to_string() };
        record_result(&self.recorder, "fs", "list_dir", &input, &result);
        result
    }

    fn walk_files(&self, root: &Path, skip_dirs: &[String]) -> Result<Vec<PathBuf>, PortError> {
        let result = self.inner.walk_files(root, skip_dirs);
        let input = WalkInput { path: &root.display().to_string(), skip_dirs };
        record_result(&self.recorder, "fs", "walk_files", &input, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::filesystem::LiveFileSystem;
    use crate::cassette::format::Cassette;
    use tempfile::TempDir;

    #[test]
    fn records_reads_and_failures() {
        let dir = TempDir::new().unwrap();
        let cassette_path = dir.path().join("fs.cassette.yaml");
        let source = dir.path().join("a.py");
        std::fs::write(&source, "def a():\n    pass\n").unwrap();

        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&cassette_path, "test", "abc")));

        // Scope the adapter so it's dropped before we try to unwrap
        {
            let fs = RecordingFileSystem::new(Box::new(LiveFileSystem), Arc::clone(&recorder));
            let _ = fs.exists(&source);
            let _ = fs.read_to_string(&source);
            let _ = fs.read_to_string(&dir.path().join("missing.py"));
        }

        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        recorder.finish().unwrap();

        let content = std::fs::read_to_string(&cassette_path).unwrap();
        let cassette: Cassette = serde_yaml::from_str(&content).unwrap();
        assert_eq!(cassette.interactions.len(), 3);
        assert_eq!(cassette.interactions[0].method, "exists");
        assert_eq!(cassette.interactions[0].output, serde_json::json!(true));
        assert_eq!(
            cassette.interactions[1].output,
            serde_json::json!({"ok": "def a():\n    pass\n"})
        );
        assert!(cassette.interactions[2].output.get("err").is_some());
    }
}
