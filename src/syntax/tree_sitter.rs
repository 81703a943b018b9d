//! Tree-sitter backed parsing.
//!
//! This is where the tree-sitter dependency lives.

use std::path::Path;

use tree_sitter::{Language as TsLanguage, Node, Parser, Tree};

use super::{Grammar, Language, SyntaxNode};
use crate::error::{Error, Result};

/// Loaded grammars, checked against the linked tree-sitter runtime.
pub struct Grammars {
    python: TsLanguage,
    typescript: TsLanguage,
    tsx: TsLanguage,
}

impl Grammars {
    /// Loads every grammar and verifies each one can drive a parser.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GrammarUnavailable`] when a grammar was built for an
    /// incompatible runtime ABI.
    pub fn load() -> Result<Self> {
        let grammars = Self {
            python: tree_sitter_python::language(),
            typescript: tree_sitter_typescript::language_typescript(),
            tsx: tree_sitter_typescript::language_tsx(),
        };

        let mut parser = Parser::new();
        for grammar in [Grammar::Python, Grammar::TypeScript, Grammar::Tsx] {
            parser.set_language(grammars.get(grammar)).map_err(|e| {
                Error::GrammarUnavailable { grammar: grammar.name(), reason: e.to_string() }
            })?;
        }
        tracing::debug!("loaded python, typescript and tsx grammars");
        Ok(grammars)
    }

    fn get(&self, grammar: Grammar) -> &TsLanguage {
        match grammar {
            Grammar::Python => &self.python,
            Grammar::TypeScript => &self.typescript,
            Grammar::Tsx => &self.tsx,
        }
    }

    /// Parses `source` with the grammar matching `path`'s extension.
    ///
    /// A missing trailing newline is added before parsing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFile`] for unknown extensions and
    /// [`Error::Parse`] when tree-sitter gives up.
    pub fn parse(&self, path: &Path, source: impl Into<String>) -> Result<ParsedSource> {
        let grammar =
            Grammar::for_path(path).ok_or_else(|| Error::UnsupportedFile { path: path.into() })?;

        let mut source = source.into();
        if !source.ends_with('\n') {
            source.push('\n');
        }

        let mut parser = Parser::new();
        parser.set_language(self.get(grammar)).map_err(|e| Error::GrammarUnavailable {
            grammar: grammar.name(),
            reason: e.to_string(),
        })?;
        let tree = parser.parse(&source, None).ok_or_else(|| Error::Parse { path: path.into() })?;

        Ok(ParsedSource { tree, source, language: grammar.language() })
    }
}

/// A parsed file: the tree plus the text it points into.
pub struct ParsedSource {
    tree: Tree,
    source: String,
    language: Language,
}

impl ParsedSource {
    /// Root node of the tree.
    pub fn root(&self) -> TsNode<'_> {
        TsNode { node: self.tree.root_node(), source: &self.source }
    }

    /// Language family of the file.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Returns `true` if tree-sitter had to recover from syntax errors.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// [`SyntaxNode`] over a tree-sitter node.
#[derive(Clone, Copy)]
pub struct TsNode<'a> {
    node: Node<'a>,
    source: &'a str,
}

impl<'a> TsNode<'a> {
    fn wrap(&self, node: Node<'a>) -> Self {
        Self { node, source: self.source }
    }
}

impl SyntaxNode for TsNode<'_> {
    fn kind(&self) -> &str {
        self.node.kind()
    }

    fn field(&self, name: &str) -> Option<Self> {
        self.node.child_by_field_name(name).map(|n| self.wrap(n))
    }

    fn named_children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node.named_children(&mut cursor).map(|n| self.wrap(n)).collect()
    }

    fn children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node.children(&mut cursor).map(|n| self.wrap(n)).collect()
    }

    fn text(&self) -> Option<&str> {
        self.source.get(self.node.byte_range())
    }
}
