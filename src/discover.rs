//! Project root, package, and source file discovery.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::ports::FileSystem;
use crate::report::{Package, PackageKind};
use crate::syntax::Grammar;

const JS_MANIFEST: &str = "package.json";
const PY_MANIFESTS: &[&str] = &["setup.py", "pyproject.toml"];

/// A source file found by the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePath {
    /// Path handed to the filesystem port.
    pub path: PathBuf,
    /// Project-relative, `/`-separated path used in the report.
    pub display: String,
}

/// Nearest directory at or above `start` holding a `package.json`.
///
/// Falls back to `start` when no ancestor has one.
pub fn find_project_root(fs: &dyn FileSystem, start: &Path) -> PathBuf {
    for dir in start.ancestors() {
        if fs.exists(&dir.join(JS_MANIFEST)) {
            return dir.to_path_buf();
        }
    }
    tracing::debug!("no {JS_MANIFEST} above {}; using it as project root", start.display());
    start.to_path_buf()
}

/// Packages of the project, identified by their manifests.
///
/// The root is a `js` package when it holds a `package.json`. Immediate
/// subdirectories follow, `js` packages before `py` ones, then the include
/// paths in the order given. Repeated descriptors are dropped.
pub fn discover_packages(
    fs: &dyn FileSystem,
    root: &Path,
    include: &[PathBuf],
    skip_dirs: &[String],
) -> Vec<Package> {
    let mut packages = Vec::new();
    if fs.exists(&root.join(JS_MANIFEST)) {
        packages.push(Package::new(".", PackageKind::Js));
    }

    let names = match fs.list_dir(root) {
        Ok(names) => names,
        Err(err) => {
            tracing::warn!("cannot list {}: {err}", root.display());
            Vec::new()
        }
    };
    let mut python = Vec::new();
    for name in names {
        if name.starts_with('.') || skip_dirs.contains(&name) {
            continue;
        }
        let dir = root.join(&name);
        if !fs.is_dir(&dir) {
            continue;
        }
        let kinds = manifest_kinds(fs, &dir);
        if kinds.contains(&PackageKind::Js) {
            packages.push(Package::new(name.clone(), PackageKind::Js));
        }
        if kinds.contains(&PackageKind::Py) {
            python.push(Package::new(name, PackageKind::Py));
        }
    }
    packages.append(&mut python);

    for extra in include {
        let dir = root.join(extra);
        if !fs.is_dir(&dir) {
            continue;
        }
        let label = relative_label(extra);
        for kind in manifest_kinds(fs, &dir) {
            packages.push(Package::new(label.clone(), kind));
        }
    }

    let mut seen = HashSet::new();
    packages.retain(|p| seen.insert(p.clone()));
    tracing::info!(count = packages.len(), "discovered packages");
    packages
}

fn manifest_kinds(fs: &dyn FileSystem, dir: &Path) -> Vec<PackageKind> {
    let mut kinds = Vec::new();
    if fs.exists(&dir.join(JS_MANIFEST)) {
        kinds.push(PackageKind::Js);
    }
    if PY_MANIFESTS.iter().any(|m| fs.exists(&dir.join(m))) {
        kinds.push(PackageKind::Py);
    }
    kinds
}

/// Supported source files under the project root and each include path.
///
/// Files reached from more than one scan root are listed once, under the
/// first root that found them. Missing include paths are logged and skipped.
pub fn collect_sources(
    fs: &dyn FileSystem,
    root: &Path,
    include: &[PathBuf],
    skip_dirs: &[String],
) -> Vec<SourcePath> {
    let mut scan_roots = vec![(root.to_path_buf(), String::new())];
    for extra in include {
        let label = relative_label(extra);
        scan_roots.push((root.join(extra), if label == "." { String::new() } else { label }));
    }

    let mut seen = HashSet::new();
    let mut sources = Vec::new();
    for (dir, label) in scan_roots {
        if !fs.is_dir(&dir) {
            tracing::warn!("scan path does not exist: {}", dir.display());
            continue;
        }
        let files = match fs.walk_files(&dir, skip_dirs) {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!("cannot walk {}: {err}", dir.display());
                continue;
            }
        };
        for path in files {
            if Grammar::for_path(&path).is_none() || !seen.insert(path.clone()) {
                continue;
            }
            let Ok(rel) = path.strip_prefix(&dir) else {
                continue;
            };
            let rel = slash_path(rel);
            let display = if label.is_empty() { rel } else { format!("{label}/{rel}") };
            sources.push(SourcePath { path, display });
        }
    }
    tracing::info!(count = sources.len(), "collected source files");
    sources
}

/// `/`-separated form of a relative path, without `.` segments.
fn slash_path(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::CurDir => None,
            Component::ParentDir => Some("..".to_string()),
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect();
    parts.join("/")
}

fn relative_label(path: &Path) -> String {
    let label = slash_path(path);
    if label.is_empty() {
        ".".to_string()
    } else {
        label
    }
}
