//! Markdown rendering of a [`Report`].

use std::fmt::Write as _;

use super::{Directory, Report, ReportNode};
use crate::extract::Declaration;

const INDENT: &str = "  ";

/// Renders every package as a heading followed by a nested bullet list.
#[must_use]
pub fn render(report: &Report) -> String {
    let mut out = String::new();
    for (package, tree) in &report.packages {
        let _ = writeln!(out, "## Package ({}): `{}`", package.kind, package.root);
        out.push('\n');
        render_directory(&mut out, tree, 0);
        out.push('\n');
    }
    out
}

fn render_directory(out: &mut String, dir: &Directory, depth: usize) {
    for (key, node) in dir.entries() {
        match node {
            ReportNode::Directory(sub) => {
                line(out, depth, &format!("{key}/"));
                render_directory(out, sub, depth + 1);
            }
            ReportNode::File(declarations) => {
                line(out, depth, key);
                for declaration in declarations {
                    line(out, depth + 1, declaration.name());
                    if let Declaration::Class { methods, .. } = declaration {
                        for method in methods {
                            line(out, depth + 2, method);
                        }
                    }
                }
            }
        }
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    let _ = writeln!(out, "- {text}");
}
