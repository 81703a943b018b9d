//! Project configuration loaded from `.exportmap.yaml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::patch::{self, MarkerRegion, BEGIN_MARKER, END_MARKER};
use crate::ports::FileSystem;

/// File name of the optional configuration, relative to the project root.
pub const CONFIG_FILE: &str = ".exportmap.yaml";

/// Default target document, relative to the project root.
pub const DEFAULT_OUTPUT: &str = ".github/copilot-instructions.md";

/// Directory names never descended into, in addition to hidden ones.
pub const DEFAULT_SKIP_DIRS: &[&str] =
    &["node_modules", "dist", "build", "target", "__pycache__", "venv"];

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Target document, relative to the project root.
    pub output: PathBuf,
    /// Line opening the generated region.
    pub begin_marker: String,
    /// Line closing the generated region.
    pub end_marker: String,
    /// Initial content of a target document that does not exist yet.
    pub bootstrap: Option<String>,
    /// Directory names pruned while scanning.
    pub skip_dirs: Vec<String>,
    /// Extra scan roots, relative to the project root.
    pub include: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            begin_marker: BEGIN_MARKER.to_string(),
            end_marker: END_MARKER.to_string(),
            bootstrap: None,
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|d| (*d).to_string()).collect(),
            include: Vec::new(),
        }
    }
}

impl Config {
    /// Loads `.exportmap.yaml` from `root`, or the defaults if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file cannot be read, does not
    /// parse, or names unusable markers.
    pub fn load(fs: &dyn FileSystem, root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !fs.exists(&path) {
            return Ok(Self::default());
        }
        let text = fs
            .read_to_string(&path)
            .map_err(|e| Error::Config { path: path.clone(), reason: e.to_string() })?;
        let config = Self::parse(&text).map_err(|reason| Error::Config { path: path.clone(), reason })?;
        tracing::debug!("loaded {}", path.display());
        Ok(config)
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.begin_marker.trim().is_empty() || self.end_marker.trim().is_empty() {
            return Err("markers must not be empty".into());
        }
        if self.begin_marker == self.end_marker {
            return Err("begin_marker and end_marker must differ".into());
        }
        Ok(())
    }

    /// Marker pair delimiting the generated region.
    #[must_use]
    pub fn markers(&self) -> MarkerRegion {
        MarkerRegion::new(&self.begin_marker, &self.end_marker)
    }

    /// Content used when the target document has to be created.
    #[must_use]
    pub fn bootstrap_text(&self) -> String {
        self.bootstrap.clone().unwrap_or_else(|| patch::default_bootstrap(&self.markers()))
    }
}
