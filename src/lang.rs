// src/lang.rs
//! Language table: detection, tree-sitter grammars, and import queries.

use serde::Serialize;
use tree_sitter::Language;

/// Languages with a dedicated import-extraction capability. Everything
/// else is handled by the generic heuristic scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Lang {
    Rust,
    Python,
    TypeScript,
    JavaScript,
}

impl Lang {
    /// Built-in extension mapping. [`ScanOptions::language_map`] entries
    /// take precedence over this table.
    ///
    /// [`ScanOptions::language_map`]: crate::options::ScanOptions
    #[must_use]
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext {
            "rs" => Some(Self::Rust),
            "py" | "pyi" => Some(Self::Python),
            "ts" | "tsx" => Some(Self::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            _ => None,
        }
    }

    #[must_use]
    pub fn grammar(self) -> Language {
        match self {
            Self::Rust => tree_sitter_rust::language(),
            Self::Python => tree_sitter_python::language(),
            // The TSX grammar is a superset; one grammar covers both
            // plain and JSX-bearing sources.
            Self::TypeScript | Self::JavaScript => {
                tree_sitter_typescript::language_tsx()
            }
        }
    }

    /// Tree-sitter query locating import-like syntax for this language.
    #[must_use]
    pub fn q_imports(self) -> &'static str {
        match self {
            Self::Rust => Q_IMPORTS_RUST,
            Self::Python => Q_IMPORTS_PYTHON,
            Self::TypeScript | Self::JavaScript => Q_IMPORTS_TS,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Python => "python",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
        }
    }
}

const Q_IMPORTS_RUST: &str = r"
    (use_declaration argument: (_) @import)
    (mod_item name: (identifier) @mod)
";

const Q_IMPORTS_PYTHON: &str = r"
    (import_statement name: (dotted_name) @import)
    (aliased_import name: (dotted_name) @import)
    (import_from_statement module_name: (dotted_name) @import)
    (import_from_statement module_name: (relative_import) @import)
";

const Q_IMPORTS_TS: &str = r#"
    (import_statement source: (string) @import)
    (export_statement source: (string) @import)
    (call_expression
      function: (identifier) @func
      arguments: (arguments (string) @import)
      (#eq? @func "require"))
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ext() {
        assert_eq!(Lang::from_ext("rs"), Some(Lang::Rust));
        assert_eq!(Lang::from_ext("tsx"), Some(Lang::TypeScript));
        assert_eq!(Lang::from_ext("mjs"), Some(Lang::JavaScript));
        assert_eq!(Lang::from_ext("zig"), None);
    }

    #[test]
    fn test_queries_compile() {
        for lang in [Lang::Rust, Lang::Python, Lang::TypeScript] {
            assert!(
                tree_sitter::Query::new(lang.grammar(), lang.q_imports()).is_ok(),
                "import query must compile for {lang:?}"
            );
        }
    }
}
