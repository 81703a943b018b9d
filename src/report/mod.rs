//! Report model: per-package directory trees with declarations at the leaves.

mod render;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extract::Declaration;
use crate::syntax::Language;

pub use render::render;

/// Declarations extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    /// Language family the file was parsed as.
    pub language: Language,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
}

/// Ecosystem of a package, from the manifest that identified it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// `package.json`.
    Js,
    /// `setup.py` or `pyproject.toml`.
    Py,
}

impl PackageKind {
    /// Whether files of `language` belong to this ecosystem.
    fn serves(self, language: Language) -> bool {
        matches!((self, language), (Self::Js, Language::JavaScript) | (Self::Py, Language::Python))
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Js => f.write_str("js"),
            Self::Py => f.write_str("py"),
        }
    }
}

/// A package root inside the project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Package {
    /// Root relative to the project, `/`-separated; `"."` is the project root.
    pub root: String,
    /// Manifest kind.
    pub kind: PackageKind,
}

impl Package {
    /// Creates a package descriptor.
    pub fn new(root: impl Into<String>, kind: PackageKind) -> Self {
        Self { root: root.into(), kind }
    }

    /// `path` relative to this package, if the package contains it.
    fn relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        let root = self.root.trim_end_matches('/');
        if root == "." || root.is_empty() {
            return Some(path);
        }
        path.strip_prefix(root)?.strip_prefix('/')
    }

    fn depth(&self) -> usize {
        match self.root.trim_end_matches('/') {
            "." | "" => 0,
            root => root.split('/').count(),
        }
    }
}

/// A node of a package tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportNode {
    /// A directory and its entries.
    Directory(Directory),
    /// A source file and its declarations.
    File(Vec<Declaration>),
}

/// Directory entries keyed by path segment, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<(String, ReportNode)>,
}

impl Directory {
    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[(String, ReportNode)] {
        &self.entries
    }

    /// Entry named `key`.
    pub fn get(&self, key: &str) -> Option<&ReportNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, node)| node)
    }

    /// True when the directory holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut ReportNode> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, node)| node)
    }

    /// Places `declarations` at `segments`, creating directories on the way.
    ///
    /// Returns `false` when the slot is already taken or a path segment is a
    /// file.
    fn insert_file(&mut self, segments: &[&str], declarations: &[Declaration]) -> bool {
        let Some((leaf, dirs)) = segments.split_last() else {
            return false;
        };
        let mut current = self;
        for segment in dirs {
            if current.get(segment).is_none() {
                current
                    .entries
                    .push(((*segment).to_string(), ReportNode::Directory(Directory::default())));
            }
            match current.get_mut(segment) {
                Some(ReportNode::Directory(dir)) => current = dir,
                _ => return false,
            }
        }
        if current.get(leaf).is_some() {
            return false;
        }
        current.entries.push(((*leaf).to_string(), ReportNode::File(declarations.to_vec())));
        true
    }
}

/// The report forest, one tree per package in descriptor order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Packages paired with their trees.
    pub packages: Vec<(Package, Directory)>,
}

impl Report {
    /// Number of files placed across all packages.
    #[must_use]
    pub fn file_count(&self) -> usize {
        fn count(dir: &Directory) -> usize {
            dir.entries
                .iter()
                .map(|(_, node)| match node {
                    ReportNode::Directory(sub) => count(sub),
                    ReportNode::File(_) => 1,
                })
                .sum()
        }
        self.packages.iter().map(|(_, dir)| count(dir)).sum()
    }
}

/// Groups source files under their packages.
///
/// Each file goes to the package with the longest root containing it. When
/// a `js` and a `py` package share that root, the file goes to the one
/// matching its language. With no packages the whole project is one
/// implicit `js` package. Files that
/// declare nothing are left out, and the first entry for a path wins.
#[must_use]
pub fn build(entries: &[SourceFile], packages: &[Package]) -> Report {
    let packages = if packages.is_empty() {
        vec![Package::new(".", PackageKind::Js)]
    } else {
        packages.to_vec()
    };

    let mut trees = vec![Directory::default(); packages.len()];
    for entry in entries {
        if entry.declarations.is_empty() {
            continue;
        }
        let path = entry.path.trim_start_matches("./");
        let Some((index, relative)) = owning_package(&packages, path, entry.language) else {
            tracing::debug!(path, "no package contains file");
            continue;
        };
        let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
        if !trees[index].insert_file(&segments, &entry.declarations) {
            tracing::debug!(path, "path already placed; keeping the first entry");
        }
    }

    Report { packages: packages.into_iter().zip(trees).collect() }
}

/// Index of the package owning `path` and the path relative to it.
///
/// Deeper roots win, then a kind serving `language`, then descriptor order.
fn owning_package<'a>(
    packages: &[Package],
    path: &'a str,
    language: Language,
) -> Option<(usize, &'a str)> {
    let mut best: Option<(usize, &'a str, (usize, bool))> = None;
    for (index, package) in packages.iter().enumerate() {
        let Some(relative) = package.relative(path) else {
            continue;
        };
        let rank = (package.depth(), package.kind.serves(language));
        if best.as_ref().map_or(true, |(_, _, current)| rank > *current) {
            best = Some((index, relative, rank));
        }
    }
    best.map(|(index, relative, _)| (index, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file(path: &str, names: &[&str]) -> SourceFile {
        SourceFile {
            path: path.into(),
            language: Language::Python,
            declarations: names
                .iter()
                .map(|n| Declaration::Function { name: (*n).to_string() })
                .collect(),
        }
    }

    fn keys(dir: &Directory) -> Vec<&str> {
        dir.entries().iter().map(|(k, _)| k.as_str()).collect()
    }

    fn subdir<'a>(dir: &'a Directory, key: &str) -> &'a Directory {
        match dir.get(key) {
            Some(ReportNode::Directory(sub)) => sub,
            other => panic!("expected directory at {key}, got {other:?}"),
        }
    }

    #[test]
    fn implicit_root_package_when_none_given() {
        let report = build(&[file("src/a.js", &["a"])], &[]);
        assert_eq!(report.packages.len(), 1);
        assert_eq!(report.packages[0].0, Package::new(".", PackageKind::Js));
        assert_eq!(keys(subdir(&report.packages[0].1, "src")), vec!["a.js"]);
    }

    #[test]
    fn files_without_declarations_are_excluded() {
        let report = build(&[file("empty.py", &[]), file("full.py", &["f"])], &[]);
        assert_eq!(keys(&report.packages[0].1), vec!["full.py"]);
        assert_eq!(report.file_count(), 1);
    }

    #[test]
    fn longest_root_wins() {
        let packages = vec![
            Package::new(".", PackageKind::Js),
            Package::new("api", PackageKind::Py),
            Package::new("apis", PackageKind::Js),
        ];
        let entries = vec![
            file("index.js", &["main"]),
            file("api/server.py", &["serve"]),
            file("apis/client.js", &["call"]),
        ];
        let report = build(&entries, &packages);

        assert_eq!(keys(&report.packages[0].1), vec!["index.js"]);
        assert_eq!(keys(&report.packages[1].1), vec!["server.py"]);
        assert_eq!(keys(&report.packages[2].1), vec!["client.js"]);
    }

    #[test]
    fn shared_root_splits_files_by_language() {
        let packages =
            vec![Package::new("both", PackageKind::Js), Package::new("both", PackageKind::Py)];
        let mut script = file("both/app.js", &["start"]);
        script.language = Language::JavaScript;
        let entries = vec![script, file("both/tool.py", &["run"])];
        let report = build(&entries, &packages);

        assert_eq!(keys(&report.packages[0].1), vec!["app.js"]);
        assert_eq!(keys(&report.packages[1].1), vec!["tool.py"]);
    }

    #[test]
    fn deeper_root_beats_language_match() {
        let packages = vec![Package::new(".", PackageKind::Py), Package::new("web", PackageKind::Js)];
        let report = build(&[file("web/setup_helpers.py", &["build"])], &packages);

        assert!(report.packages[0].1.is_empty());
        assert_eq!(keys(&report.packages[1].1), vec!["setup_helpers.py"]);
    }

    #[test]
    fn unmatched_files_are_dropped_and_empty_packages_kept() {
        let packages = vec![Package::new("lib", PackageKind::Py), Package::new("web", PackageKind::Js)];
        let report = build(&[file("lib/a.py", &["a"]), file("scripts/x.py", &["x"])], &packages);

        assert_eq!(report.file_count(), 1);
        assert!(report.packages[1].1.is_empty());
    }

    #[test]
    fn insertion_order_is_kept_and_duplicates_ignored() {
        let entries = vec![
            file("src/zeta.py", &["z"]),
            file("lib/alpha.py", &["a"]),
            file("src/beta.py", &["b"]),
            file("src/zeta.py", &["other"]),
        ];
        let report = build(&entries, &[]);
        let root = &report.packages[0].1;

        assert_eq!(keys(root), vec!["src", "lib"]);
        assert_eq!(keys(subdir(root, "src")), vec!["zeta.py", "beta.py"]);
        assert_eq!(
            subdir(root, "src").get("zeta.py"),
            Some(&ReportNode::File(vec![Declaration::Function { name: "z".into() }]))
        );
    }
}
