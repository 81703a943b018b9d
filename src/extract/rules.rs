//! Per-language node kinds driving the shared extractor walk.

use crate::syntax::Language;

/// Grammar node kinds that carry meaning for declaration extraction.
#[derive(Debug)]
pub struct LanguageRules {
    /// Class declarations.
    pub classes: &'static [&'static str],
    /// Free function declarations, reported when declared at module level.
    pub functions: &'static [&'static str],
    /// Methods, collected from a class body and never reported on their own.
    pub methods: &'static [&'static str],
    /// Other constructs whose contents are local (lambdas, closures, namespaces).
    pub scopes: &'static [&'static str],
    /// Top-level variable declarations whose declarators bind names.
    pub bindings: &'static [&'static str],
    /// Declarator kind inside a binding declaration.
    pub declarator: &'static str,
    /// Wrappers that keep the scope of what they wrap (exports, decorators).
    pub passthrough: &'static [&'static str],
    /// Wrappers whose bare identifier child names an exported symbol.
    pub exports: &'static [&'static str],
    /// Field holding the wrapped definition of a passthrough node.
    pub wrapped_field: Option<&'static str>,
    /// Field holding a class body.
    pub body_field: &'static str,
}

static PYTHON: LanguageRules = LanguageRules {
    classes: &["class_definition"],
    functions: &["function_definition"],
    methods: &["function_definition"],
    scopes: &["lambda"],
    bindings: &[],
    declarator: "",
    passthrough: &["decorated_definition"],
    exports: &[],
    wrapped_field: Some("definition"),
    body_field: "body",
};

static JAVASCRIPT: LanguageRules = LanguageRules {
    classes: &["class_declaration", "abstract_class_declaration"],
    functions: &["function_declaration", "generator_function_declaration"],
    methods: &["method_definition", "abstract_method_signature"],
    scopes: &[
        "arrow_function",
        "function",
        "function_expression",
        "generator_function",
        "class",
        "internal_module",
        "module",
    ],
    bindings: &["lexical_declaration", "variable_declaration"],
    declarator: "variable_declarator",
    passthrough: &["export_statement"],
    exports: &["export_statement"],
    wrapped_field: None,
    body_field: "body",
};

impl LanguageRules {
    /// Rule table for a language family.
    pub fn for_language(language: Language) -> &'static Self {
        match language {
            Language::Python => &PYTHON,
            Language::JavaScript => &JAVASCRIPT,
        }
    }

    pub(crate) fn is_class(&self, kind: &str) -> bool {
        self.classes.contains(&kind)
    }

    pub(crate) fn is_function(&self, kind: &str) -> bool {
        self.functions.contains(&kind)
    }

    pub(crate) fn is_method(&self, kind: &str) -> bool {
        self.methods.contains(&kind)
    }

    /// Any construct whose body is local: functions, methods, and `scopes`.
    pub(crate) fn opens_scope(&self, kind: &str) -> bool {
        self.is_function(kind) || self.is_method(kind) || self.scopes.contains(&kind)
    }

    pub(crate) fn is_binding(&self, kind: &str) -> bool {
        self.bindings.contains(&kind)
    }

    pub(crate) fn is_passthrough(&self, kind: &str) -> bool {
        self.passthrough.contains(&kind)
    }

    pub(crate) fn is_export(&self, kind: &str) -> bool {
        self.exports.contains(&kind)
    }
}
