//! Marker-bounded patching of the target document.
//!
//! Only the span from the begin marker through the first end marker after it
//! belongs to the tool. Everything around it is user text and is carried over
//! byte-for-byte.

use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ports::FileSystem;

/// Default begin marker.
pub const BEGIN_MARKER: &str = "<!-- BEGIN GENERATED CONTENT -->";
/// Default end marker.
pub const END_MARKER: &str = "<!-- END GENERATED CONTENT -->";

/// The pair of literal lines delimiting the generated region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRegion {
    /// Text opening the region.
    pub begin: String,
    /// Text closing the region.
    pub end: String,
}

impl Default for MarkerRegion {
    fn default() -> Self {
        Self::new(BEGIN_MARKER, END_MARKER)
    }
}

impl MarkerRegion {
    /// Creates a marker pair.
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self { begin: begin.into(), end: end.into() }
    }

    /// `generated` wrapped in the markers, each on its own line.
    #[must_use]
    pub fn wrap(&self, generated: &str) -> String {
        let mut region = String::with_capacity(self.begin.len() + generated.len() + self.end.len() + 2);
        region.push_str(&self.begin);
        region.push('\n');
        region.push_str(generated);
        if !generated.is_empty() && !generated.ends_with('\n') {
            region.push('\n');
        }
        region.push_str(&self.end);
        region
    }

    /// Byte range of the region, begin marker through end marker.
    ///
    /// The first end marker preceded by a begin marker closes the region,
    /// and the nearest begin marker before it opens it. Stray markers left
    /// in user text therefore never swallow the text that follows them.
    fn locate(&self, text: &str) -> Option<(usize, usize)> {
        let mut from = 0;
        while let Some(offset) = text[from..].find(&self.end) {
            let end_start = from + offset;
            if let Some(start) = text[..end_start].rfind(&self.begin) {
                return Some((start, end_start + self.end.len()));
            }
            from = end_start + self.end.len();
        }
        None
    }
}

/// Scaffold for a document that does not exist yet.
#[must_use]
pub fn default_bootstrap(markers: &MarkerRegion) -> String {
    format!(
        "# Project Structure\n\n\
         Notes written above or below the generated block are preserved.\n\n\
         {}\n{}\n",
        markers.begin, markers.end
    )
}

/// Result of patching a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Full document text after patching.
    pub text: String,
    /// Whether `text` differs from what is stored.
    pub changed: bool,
}

/// Replaces the generated region of `existing` with `generated`.
///
/// A missing document starts from `bootstrap` and always counts as changed.
/// A document without a well-formed region gets one appended after its
/// content, separated by a blank line.
#[must_use]
pub fn patch(
    existing: Option<&str>,
    generated: &str,
    markers: &MarkerRegion,
    bootstrap: &str,
) -> PatchOutcome {
    let region = markers.wrap(generated);
    let Some(current) = existing else {
        let text = replace_or_append(bootstrap, &region, markers).0;
        return PatchOutcome { text, changed: true };
    };
    let (text, changed) = replace_or_append(current, &region, markers);
    PatchOutcome { text, changed }
}

fn replace_or_append(current: &str, region: &str, markers: &MarkerRegion) -> (String, bool) {
    if let Some((start, end)) = markers.locate(current) {
        if &current[start..end] == region {
            return (current.to_string(), false);
        }
        let mut text = String::with_capacity(current.len() - (end - start) + region.len());
        text.push_str(&current[..start]);
        text.push_str(region);
        text.push_str(&current[end..]);
        return (text, true);
    }

    tracing::debug!("generated region not found; appending");
    let mut text = current.to_string();
    if !text.is_empty() {
        if !text.ends_with('\n') {
            text.push('\n');
        }
        if !text.ends_with("\n\n") {
            text.push('\n');
        }
    }
    text.push_str(region);
    text.push('\n');
    (text, true)
}

/// Patches the document at `path`, writing only when its content changes.
///
/// # Errors
///
/// Returns [`Error::Read`] when an existing document cannot be read (it is
/// never replaced by the bootstrap in that case) and [`Error::Write`] when
/// the new text cannot be stored.
pub fn write_document(
    fs: &dyn FileSystem,
    path: &Path,
    generated: &str,
    config: &Config,
) -> Result<PatchOutcome> {
    let existing = if fs.exists(path) {
        let text = fs
            .read_to_string(path)
            .map_err(|e| Error::Read { path: path.into(), reason: e.to_string() })?;
        Some(text)
    } else {
        tracing::info!("creating {}", path.display());
        None
    };

    let outcome = patch(existing.as_deref(), generated, &config.markers(), &config.bootstrap_text());
    if outcome.changed {
        fs.write(path, &outcome.text)
            .map_err(|e| Error::Write { path: path.into(), reason: e.to_string() })?;
    } else {
        tracing::info!("{} is up to date", path.display());
    }
    Ok(outcome)
}
