//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Top-level CLI parser for `exportmap`.
#[derive(Debug, Parser)]
#[command(
    name = "exportmap",
    version,
    about = "Map the functions and classes of a Python/JavaScript project into a Markdown document"
)]
pub struct Cli {
    /// Comma-separated extra scan roots, relative to the project root.
    #[arg(value_name = "PATHS")]
    pub paths: Option<String>,

    /// Directory to start the project-root search from [default: current directory].
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Target document, relative to the project root.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the generated region instead of patching the document.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Extra scan roots from `PATHS`, trimmed, with empty items dropped.
    #[must_use]
    pub fn include_paths(&self) -> Vec<PathBuf> {
        self.paths
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn defaults_without_arguments() {
        let cli = Cli::parse_from(["exportmap"]);
        assert!(cli.include_paths().is_empty());
        assert!(cli.root.is_none());
        assert!(!cli.dry_run);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn paths_are_split_and_trimmed() {
        let cli = Cli::parse_from(["exportmap", " packages/a, ,libs/b ,"]);
        assert_eq!(cli.include_paths(), vec![PathBuf::from("packages/a"), PathBuf::from("libs/b")]);
    }

    #[test]
    fn parses_flags() {
        let cli =
            Cli::parse_from(["exportmap", "--root", "/tmp/p", "-o", "MAP.md", "--dry-run", "-vv"]);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/p")));
        assert_eq!(cli.output, Some(PathBuf::from("MAP.md")));
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
    }
}
