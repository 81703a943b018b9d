//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::recording::RecordingFileSystem;
use crate::adapters::replaying::ReplayingFileSystem;
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::ports::filesystem::FileSystem;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, replaying, recording).
pub struct ServiceContext {
    /// Filesystem for file I/O and directory walking.
    pub fs: Box<dyn FileSystem>,
}

impl ServiceContext {
    /// Creates a live context backed by the real disk.
    #[must_use]
    pub fn live() -> Self {
        Self { fs: Box::new(LiveFileSystem) }
    }

    /// Creates a recording context around the live adapters.
    ///
    /// Cassettes land in a timestamped directory under `base_dir`. The
    /// returned session must be finished after this context is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette directory cannot be created.
    pub fn recording_at(
        base_dir: &Path,
        project_dir: &Path,
    ) -> Result<(Self, RecordingSession), String> {
        let session = RecordingSession::new(base_dir, project_dir)?;
        let fs = RecordingFileSystem::new(Box::new(LiveFileSystem), Arc::clone(&session.fs));
        Ok((Self { fs: Box::new(fs) }, session))
    }

    /// Creates a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
        Ok(Self::replaying_cassette(&cassette))
    }

    /// Creates a replaying context from an in-memory cassette.
    #[must_use]
    pub fn replaying_cassette(cassette: &Cassette) -> Self {
        Self { fs: Box::new(ReplayingFileSystem::new(CassetteReplayer::new(cassette))) }
    }
}
