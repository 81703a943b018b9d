//! The `exportmap` pipeline: scan, extract, build, render, patch.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::context::ServiceContext;
use crate::discover;
use crate::error::{Error, Result};
use crate::extract;
use crate::patch;
use crate::report::{self, SourceFile};
use crate::syntax::Grammars;

/// Per-run options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Extra scan roots appended to the configured ones.
    pub include: Vec<PathBuf>,
    /// Replaces the configured target document.
    pub output: Option<PathBuf>,
    /// Print instead of patching.
    pub dry_run: bool,
}

/// What happened to the target document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    /// The document was created or its region replaced.
    Updated,
    /// The region already held the generated text.
    Unchanged,
    /// Nothing was written because of `--dry-run`.
    DryRun,
    /// Reading or writing the document failed.
    Failed(String),
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated => f.write_str("updated"),
            Self::Unchanged => f.write_str("unchanged"),
            Self::DryRun => f.write_str("dry run"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Resolved project root.
    pub project_root: PathBuf,
    /// Target document path.
    pub document: PathBuf,
    /// Number of packages reported.
    pub packages: usize,
    /// Supported files found by the scan.
    pub files_scanned: usize,
    /// Files that made it into the report.
    pub files_reported: usize,
    /// Rendered report, without markers.
    pub generated: String,
    /// Fate of the target document.
    pub status: DocumentStatus,
}

/// Execute the pipeline and print a summary.
///
/// # Errors
///
/// Returns an error when the grammars cannot be loaded or the configuration
/// file is invalid. Problems with single files or with the target document
/// are logged and reported in the summary instead.
pub fn run(ctx: &ServiceContext, start: &Path, options: &Options) -> Result<Summary> {
    let summary = generate(ctx, start, options)?;
    if options.dry_run {
        return Ok(summary);
    }
    println!(
        "Scanned {} files, reported {} across {} packages",
        summary.files_scanned, summary.files_reported, summary.packages
    );
    println!("{}: {}", summary.document.display(), summary.status);
    Ok(summary)
}

/// Runs the pipeline without printing a summary.
///
/// # Errors
///
/// See [`run`].
pub fn generate(ctx: &ServiceContext, start: &Path, options: &Options) -> Result<Summary> {
    let grammars = Grammars::load()?;
    let fs = ctx.fs.as_ref();

    let project_root = discover::find_project_root(fs, start);
    tracing::info!("project root: {}", project_root.display());

    let mut config = Config::load(fs, &project_root)?;
    if let Some(output) = &options.output {
        config.output.clone_from(output);
    }
    config.include.extend(options.include.iter().cloned());

    let sources = discover::collect_sources(fs, &project_root, &config.include, &config.skip_dirs);
    let entries: Vec<SourceFile> = sources
        .iter()
        .filter_map(|source| match extract::extract_file(fs, &grammars, &source.path) {
            Ok((language, declarations)) => {
                tracing::debug!(file = %source.display, count = declarations.len(), "extracted");
                Some(SourceFile { path: source.display.clone(), language, declarations })
            }
            Err(err @ Error::UnsupportedFile { .. }) => {
                tracing::debug!("{err}");
                None
            }
            Err(err) => {
                tracing::warn!("{err}");
                None
            }
        })
        .collect();

    let packages =
        discover::discover_packages(fs, &project_root, &config.include, &config.skip_dirs);
    let report = report::build(&entries, &packages);
    let generated = report::render(&report);
    let document = project_root.join(&config.output);

    let status = if options.dry_run {
        println!("{}", config.markers().wrap(&generated));
        DocumentStatus::DryRun
    } else {
        match patch::write_document(fs, &document, &generated, &config) {
            Ok(outcome) if outcome.changed => DocumentStatus::Updated,
            Ok(_) => DocumentStatus::Unchanged,
            Err(err) => {
                tracing::error!("{err}");
                eprintln!("{err}");
                DocumentStatus::Failed(err.to_string())
            }
        }
    };

    Ok(Summary {
        project_root,
        document,
        packages: report.packages.len(),
        files_scanned: sources.len(),
        files_reported: report.file_count(),
        generated,
        status,
    })
}
