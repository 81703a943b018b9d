//! Declaration extraction over a parsed syntax tree.
//!
//! One walk serves every language: [`rules::LanguageRules`] says which node
//! kinds are classes, functions, methods, scopes, and bindings, and the
//! walker carries the enclosing scope down the tree. Children are visited
//! left to right, so records come out in the order they appear in the file,
//! and a method claimed by its class is never reported again as a function.

pub mod rules;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ports::FileSystem;
use crate::syntax::{Grammar, Grammars, Language, SyntaxNode};
use rules::LanguageRules;

/// Name reported for a class whose declaration carries no name.
pub const UNNAMED_CLASS: &str = "UnnamedClass";

/// A function or class a source file declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Declaration {
    /// A free function or a top-level binding.
    Function {
        /// Declared name.
        name: String,
    },
    /// A class and the methods declared directly in its body.
    Class {
        /// Declared name, or [`UNNAMED_CLASS`].
        name: String,
        /// Method names in source order.
        methods: Vec<String>,
    },
}

impl Declaration {
    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Function { name } | Self::Class { name, .. } => name,
        }
    }

    fn function(name: impl Into<String>) -> Self {
        Self::Function { name: name.into() }
    }
}

/// Extracts the declarations of one syntax tree, in source order.
#[must_use]
pub fn extract<N: SyntaxNode>(root: &N, language: Language) -> Vec<Declaration> {
    let mut walker = Walker { rules: LanguageRules::for_language(language), out: Vec::new() };
    walker.visit_children(root, Scope::TopLevel);
    walker.out
}

/// Reads, parses, and extracts a single file.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFile`], [`Error::Read`] or [`Error::Parse`];
/// callers treat all of them as "this file declares nothing".
pub fn extract_file(
    fs: &dyn FileSystem,
    grammars: &Grammars,
    path: &Path,
) -> Result<(Language, Vec<Declaration>)> {
    if Grammar::for_path(path).is_none() {
        return Err(Error::UnsupportedFile { path: path.into() });
    }
    let source = fs
        .read_to_string(path)
        .map_err(|e| Error::Read { path: path.into(), reason: e.to_string() })?;
    let parsed = grammars.parse(path, source)?;
    if parsed.has_errors() {
        tracing::debug!("{} has syntax errors; keeping what parsed", path.display());
    }
    let language = parsed.language();
    Ok((language, extract(&parsed.root(), language)))
}

/// Where the walker currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Direct child of the module, or of a top-level export.
    TopLevel,
    /// Inside module-level control flow (`if`, `try`, blocks).
    ModuleBlock,
    /// Direct child of a module-level class body.
    ClassBody,
    /// Anywhere inside a function, method, lambda, or nested class.
    Local,
}

impl Scope {
    fn is_module(self) -> bool {
        matches!(self, Self::TopLevel | Self::ModuleBlock)
    }

    /// Scope of an ordinary child node.
    fn nested(self) -> Self {
        match self {
            Self::TopLevel | Self::ModuleBlock => Self::ModuleBlock,
            Self::ClassBody | Self::Local => Self::Local,
        }
    }
}

struct Walker {
    rules: &'static LanguageRules,
    out: Vec<Declaration>,
}

impl Walker {
    fn visit_children<N: SyntaxNode>(&mut self, node: &N, scope: Scope) {
        for child in node.named_children() {
            self.visit(&child, scope);
        }
    }

    fn visit<N: SyntaxNode>(&mut self, node: &N, scope: Scope) {
        let rules = self.rules;
        let kind = node.kind();

        if rules.is_class(kind) {
            let inner = if scope.is_module() {
                let record = self.class_record(node);
                self.out.push(record);
                Scope::ClassBody
            } else {
                Scope::Local
            };
            if let Some(body) = node.field(rules.body_field) {
                self.visit_children(&body, inner);
            }
        } else if rules.opens_scope(kind) {
            if scope.is_module() && rules.is_function(kind) {
                match declared_name(node) {
                    Some(name) => self.out.push(Declaration::function(name)),
                    None => tracing::debug!(kind, "skipping function without a name"),
                }
            }
            self.visit_children(node, Scope::Local);
        } else if scope == Scope::TopLevel && rules.is_binding(kind) {
            let mut names = Vec::new();
            for declarator in node.named_children() {
                if declarator.kind() != rules.declarator {
                    continue;
                }
                if let Some(target) = declarator.field("name") {
                    bound_names(&target, &mut names);
                }
            }
            self.out.extend(names.into_iter().map(Declaration::function));
            self.visit_children(node, Scope::ModuleBlock);
        } else if rules.is_passthrough(kind) {
            if scope == Scope::TopLevel && rules.is_export(kind) {
                for child in node.named_children() {
                    if child.kind() != "identifier" {
                        continue;
                    }
                    // `export default name` re-exports; only report names not declared here.
                    match non_empty_text(&child) {
                        Some(name) if !self.out.iter().any(|d| d.name() == name) => {
                            self.out.push(Declaration::function(name));
                        }
                        _ => {}
                    }
                }
            }
            self.visit_children(node, scope);
        } else {
            self.visit_children(node, scope.nested());
        }
    }

    fn class_record<N: SyntaxNode>(&self, node: &N) -> Declaration {
        let name = declared_name(node).unwrap_or_else(|| UNNAMED_CLASS.to_string());
        let methods: Vec<String> = node
            .field(self.rules.body_field)
            .map(|body| body.named_children().iter().filter_map(|m| self.method_name(m)).collect())
            .unwrap_or_default();
        Declaration::Class { name, methods }
    }

    /// Name of a method sitting directly in a class body, unwrapping decorators.
    fn method_name<N: SyntaxNode>(&self, node: &N) -> Option<String> {
        let kind = node.kind();
        if self.rules.is_method(kind) {
            return declared_name(node);
        }
        if self.rules.is_passthrough(kind) {
            let inner = node.field(self.rules.wrapped_field?)?;
            if self.rules.is_method(inner.kind()) {
                return declared_name(&inner);
            }
        }
        None
    }
}

fn declared_name<N: SyntaxNode>(node: &N) -> Option<String> {
    node.field("name").and_then(|name| non_empty_text(&name))
}

fn non_empty_text<N: SyntaxNode>(node: &N) -> Option<String> {
    node.text().map(str::trim).filter(|t| !t.is_empty()).map(str::to_owned)
}

/// Collects the identifiers a binding target introduces, in source order.
fn bound_names<N: SyntaxNode>(target: &N, names: &mut Vec<String>) {
    match target.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            names.extend(non_empty_text(target));
        }
        // `{ key: value }` binds only the value side.
        "pair_pattern" => {
            if let Some(value) = target.field("value") {
                bound_names(&value, names);
            }
        }
        // `x = default` binds only the left side.
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = target.field("left") {
                bound_names(&left, names);
            }
        }
        _ => {
            for child in target.named_children() {
                bound_names(&child, names);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::ReplayingFileSystem;
    use crate::cassette::format::{Cassette, Interaction};
    use crate::cassette::replayer::CassetteReplayer;
    use pretty_assertions::assert_eq;

    fn func(name: &str) -> Declaration {
        Declaration::function(name)
    }

    fn class(name: &str, methods: &[&str]) -> Declaration {
        Declaration::Class {
            name: name.into(),
            methods: methods.iter().map(|m| (*m).to_string()).collect(),
        }
    }

    fn extract_source(file: &str, source: &str) -> Vec<Declaration> {
        let grammars = Grammars::load().unwrap();
        let parsed = grammars.parse(Path::new(file), source).unwrap();
        extract(&parsed.root(), parsed.language())
    }

    #[test]
    fn python_declarations_keep_source_order() {
        let source = "\
def alpha():
    pass

class Beta:
    pass

def gamma():
    pass
";
        assert_eq!(
            extract_source("m.py", source),
            vec![func("alpha"), class("Beta", &[]), func("gamma")]
        );
    }

    #[test]
    fn python_methods_are_not_reported_as_functions() {
        let source = "\
class Foo:
    def bar(self):
        pass

    @property
    def baz(self):
        return 1

    def qux(self):
        def helper():
            pass
        return helper
";
        assert_eq!(extract_source("m.py", source), vec![class("Foo", &["bar", "baz", "qux"])]);
    }

    #[test]
    fn python_closures_and_local_classes_are_excluded() {
        let source = "\
def outer():
    def inner():
        pass
    class Local:
        def method(self):
            pass
    return inner

if __name__ == '__main__':
    def main():
        pass

@decorator
def wrapped():
    pass
";
        assert_eq!(
            extract_source("m.py", source),
            vec![func("outer"), func("main"), func("wrapped")]
        );
    }

    #[test]
    fn python_nested_classes_stay_inside_their_parent() {
        let source = "\
class Outer:
    class Inner:
        def hidden(self):
            pass

    def visible(self):
        pass
";
        assert_eq!(extract_source("m.py", source), vec![class("Outer", &["visible"])]);
    }

    #[test]
    fn javascript_classes_functions_and_bindings() {
        let source = "\
function first() {
  function nested() {}
  const local = 1;
}

class Widget {
  constructor() {}
  render() {
    return 1;
  }
}

const a = 1, b = () => {};
let { c, d: renamed, ...rest } = source;
var [e, f = 2] = pair;

if (ready) {
  const blocked = true;
}
";
        assert_eq!(
            extract_source("m.js", source),
            vec![
                func("first"),
                class("Widget", &["constructor", "render"]),
                func("a"),
                func("b"),
                func("c"),
                func("renamed"),
                func("rest"),
                func("e"),
                func("f"),
            ]
        );
    }

    #[test]
    fn typescript_exports_report_declared_names() {
        let source = "\
export const sampleFunction = (): void => {
  console.log('This is a sample function');
};

export const anotherFunction = (): void => {
  console.log('This is another function');
};

export class SampleClass {
  constructor() {
    console.log('This is a sample class');
  }
}

export const sampleVariable: string = 'This is a sample variable';

export function helper(x: number): number {
  return x;
}

export default helper;
";
        assert_eq!(
            extract_source("index.ts", source),
            vec![
                func("sampleFunction"),
                func("anotherFunction"),
                class("SampleClass", &["constructor"]),
                func("sampleVariable"),
                func("helper"),
            ]
        );
    }

    #[test]
    fn default_export_reports_only_undeclared_names() {
        let source = "\
import external from './external';

class Store {}

export default Store;
export default external;
";
        assert_eq!(extract_source("m.js", source), vec![class("Store", &[]), func("external")]);
    }

    #[test]
    fn object_literal_methods_do_not_leak() {
        let source = "\
const api = {
  get() {
    function deep() {}
  },
};
";
        assert_eq!(extract_source("m.js", source), vec![func("api")]);
    }

    #[test]
    fn anonymous_default_export_is_dropped() {
        assert_eq!(extract_source("m.js", "export default function () {}\n"), vec![]);
    }

    /// Hand-built tree for shapes a real parser rarely produces.
    #[derive(Clone)]
    struct FakeNode {
        kind: &'static str,
        text: Option<&'static str>,
        fields: Vec<(&'static str, usize)>,
        children: Vec<FakeNode>,
    }

    impl FakeNode {
        fn leaf(kind: &'static str, text: &'static str) -> Self {
            Self { kind, text: Some(text), fields: vec![], children: vec![] }
        }

        fn branch(kind: &'static str, children: Vec<FakeNode>) -> Self {
            Self { kind, text: None, fields: vec![], children }
        }

        fn with_field(mut self, name: &'static str, index: usize) -> Self {
            self.fields.push((name, index));
            self
        }
    }

    impl SyntaxNode for FakeNode {
        fn kind(&self) -> &str {
            self.kind
        }

        fn field(&self, name: &str) -> Option<Self> {
            self.fields.iter().find(|(f, _)| *f == name).map(|(_, i)| self.children[*i].clone())
        }

        fn named_children(&self) -> Vec<Self> {
            self.children.clone()
        }

        fn children(&self) -> Vec<Self> {
            self.children.clone()
        }

        fn text(&self) -> Option<&str> {
            self.text
        }
    }

    fn fake_function(name: &'static str) -> FakeNode {
        FakeNode::branch("function_definition", vec![FakeNode::leaf("identifier", name)])
            .with_field("name", 0)
    }

    #[test]
    fn class_without_name_gets_placeholder() {
        let body = FakeNode::branch("block", vec![fake_function("run")]);
        let class_node = FakeNode::branch("class_definition", vec![body]).with_field("body", 0);
        let root = FakeNode::branch("module", vec![class_node]);

        assert_eq!(extract(&root, Language::Python), vec![class(UNNAMED_CLASS, &["run"])]);
    }

    #[test]
    fn function_without_name_is_skipped() {
        let unnamed = FakeNode::branch("function_definition", vec![]);
        let root = FakeNode::branch(
            "module",
            vec![fake_function("a"), unnamed, fake_function("b"), fake_function("c")],
        );

        assert_eq!(extract(&root, Language::Python), vec![func("a"), func("b"), func("c")]);
    }

    fn replaying_fs(output: serde_json::Value) -> ReplayingFileSystem {
        let cassette = Cassette {
            name: "extract".into(),
            recorded_at: chrono::Utc::now(),
            commit: "abc".into(),
            interactions: vec![Interaction {
                seq: 0,
                port: "fs".into(),
                method: "read_to_string".into(),
                input: serde_json::json!({"path": "/p/util.py"}),
                output,
            }],
        };
        ReplayingFileSystem::new(CassetteReplayer::new(&cassette))
    }

    #[test]
    fn extract_file_reads_through_the_port() {
        let grammars = Grammars::load().unwrap();
        let fs = replaying_fs(serde_json::json!({"ok": "def helper():\n    pass"}));
        let (language, decls) = extract_file(&fs, &grammars, Path::new("/p/util.py")).unwrap();
        assert_eq!(language, Language::Python);
        assert_eq!(decls, vec![func("helper")]);
    }

    #[test]
    fn extract_file_reports_unreadable_and_unsupported_files() {
        let grammars = Grammars::load().unwrap();
        let fs = replaying_fs(serde_json::json!({"err": "permission denied"}));
        let err = extract_file(&fs, &grammars, Path::new("/p/util.py")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));

        // Unsupported extensions are rejected before any read.
        let err = extract_file(&fs, &grammars, Path::new("/p/notes.md")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFile { .. }));
    }
}
