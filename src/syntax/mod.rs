//! Read-only view of a parsed syntax tree.
//!
//! The extractor only ever talks to [`SyntaxNode`]; the tree-sitter backed
//! implementation lives in [`tree_sitter`].

pub mod tree_sitter;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::tree_sitter::{Grammars, ParsedSource, TsNode};

/// A node of a concrete syntax tree.
pub trait SyntaxNode: Sized {
    /// Grammar type tag, e.g. `class_definition`.
    fn kind(&self) -> &str;

    /// Child stored under the named grammar field.
    fn field(&self, name: &str) -> Option<Self>;

    /// Named children, in source order.
    fn named_children(&self) -> Vec<Self>;

    /// All children including punctuation, in source order.
    fn children(&self) -> Vec<Self>;

    /// Source text covered by this node.
    fn text(&self) -> Option<&str>;
}

/// Language family a source file is read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Python modules and stubs.
    Python,
    /// JavaScript and TypeScript, with or without JSX.
    JavaScript,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => f.write_str("python"),
            Self::JavaScript => f.write_str("javascript"),
        }
    }
}

/// Concrete grammar used to parse a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// tree-sitter-python.
    Python,
    /// tree-sitter-typescript, TypeScript dialect.
    TypeScript,
    /// tree-sitter-typescript, TSX dialect. Also reads plain JavaScript.
    Tsx,
}

impl Grammar {
    /// Picks the grammar for a path from its extension.
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "py" | "pyi" => Some(Self::Python),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" | "js" | "jsx" | "mjs" | "cjs" => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Language family whose extraction rules apply.
    pub fn language(self) -> Language {
        match self {
            Self::Python => Language::Python,
            Self::TypeScript | Self::Tsx => Language::JavaScript,
        }
    }

    /// Short name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        }
    }
}
