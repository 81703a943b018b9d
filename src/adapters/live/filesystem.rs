//! Live filesystem adapter using `std::fs` and `walkdir`.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::ports::filesystem::{FileSystem, PortError};

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(path, contents)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                entries.push(name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn walk_files(&self, root: &Path, skip_dirs: &[String]) -> Result<Vec<PathBuf>, PortError> {
        if !root.is_dir() {
            return Err(format!("not a directory: {}", root.display()).into());
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_pruned(entry, skip_dirs));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("skipping unreadable entry: {err}");
                    continue;
                }
            };
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

/// Returns `true` for hidden entries and skip-listed directories.
fn is_pruned(entry: &DirEntry, skip_dirs: &[String]) -> bool {
    let Some(name) = entry.file_name().to_str() else {
        return true;
    };
    name.starts_with('.')
        || (entry.file_type().is_dir() && skip_dirs.iter().any(|skip| skip == name))
}
