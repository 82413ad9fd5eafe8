// src/extract/capability.rs
//! Import-extraction capabilities: tree-sitter per language, plus a
//! keyword-scanning fallback that works on anything line-oriented.

use std::sync::LazyLock;

use anyhow::{anyhow, bail, Result};
use regex::Regex;
use serde::Serialize;
use tree_sitter::{Parser, Query, QueryCursor};

use crate::lang::Lang;

/// How a reference was located. `Import` (capability-extracted) is more
/// specific than `Heuristic`; the ordering matters when merged edges saw
/// both kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Heuristic,
    Import,
}

/// One raw import/require/include token found in a file, before
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference {
    pub raw: String,
    /// 1-based source line.
    pub line: usize,
    pub kind: ReferenceKind,
}

/// One strategy for locating import-like syntax in one language's
/// grammar. A failure here is recoverable: the extractor falls back to
/// [`HeuristicCapability`] for that file.
pub trait ImportCapability: Send + Sync {
    fn try_extract(&self, content: &str) -> Result<Vec<RawReference>>;
}

/// Grammar-backed capability. One instance per language.
pub struct TreeSitterCapability {
    lang: Lang,
}

impl TreeSitterCapability {
    #[must_use]
    pub fn new(lang: Lang) -> Self {
        Self { lang }
    }
}

impl ImportCapability for TreeSitterCapability {
    fn try_extract(&self, content: &str) -> Result<Vec<RawReference>> {
        let grammar = self.lang.grammar();
        let query = Query::new(grammar, self.lang.q_imports())
            .map_err(|e| anyhow!("invalid import query: {e}"))?;

        let mut parser = Parser::new();
        parser
            .set_language(grammar)
            .map_err(|e| anyhow!("grammar version mismatch: {e}"))?;

        let Some(tree) = parser.parse(content, None) else {
            bail!("parser produced no tree");
        };
        if tree.root_node().has_error() {
            bail!("syntax errors in source");
        }

        // `@func` guards the require() predicate and is not itself an
        // import token.
        let wanted: Vec<u32> = query
            .capture_names()
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() != "func")
            .map(|(i, _)| i as u32)
            .collect();

        let mut cursor = QueryCursor::new();
        let matches = cursor.matches(&query, tree.root_node(), content.as_bytes());
        let mut refs = Vec::new();

        for m in matches {
            for capture in m.captures {
                if !wanted.contains(&capture.index) {
                    continue;
                }
                if let Ok(text) = capture.node.utf8_text(content.as_bytes()) {
                    refs.push(RawReference {
                        raw: clean_token(text),
                        line: capture.node.start_position().row + 1,
                        kind: ReferenceKind::Import,
                    });
                }
            }
        }

        Ok(refs)
    }
}

/// Strips string quoting from JS/TS import sources.
fn clean_token(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

// Ordered: quoted-source forms must precede the bare `import X` form or a
// JS import line would yield its binding list instead of its source.
static HEURISTIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"^\s*import\s+[\w{},*\s]+\s+from\s+["']([^"']+)["']"#,
        r#"^\s*import\s+["']([^"']+)["']"#,
        r#"require\(\s*["']([^"']+)["']\s*\)"#,
        r"^\s*(?:pub\s+)?use\s+([A-Za-z0-9_:]+)",
        r"^\s*(?:pub\s+)?mod\s+([A-Za-z0-9_]+)\s*;",
        r"^\s*from\s+([\w.]+)\s+import\b",
        r"^\s*import\s+([\w.]+)",
        r#"^\s*#\s*include\s*[<"]([^">]+)[">]"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("heuristic pattern is valid"))
    .collect()
});

/// The always-present fallback: a line scan for common import keywords.
/// Language-agnostic and infallible.
pub struct HeuristicCapability;

impl ImportCapability for HeuristicCapability {
    fn try_extract(&self, content: &str) -> Result<Vec<RawReference>> {
        let mut refs = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            for pattern in HEURISTIC_PATTERNS.iter() {
                if let Some(caps) = pattern.captures(line) {
                    if let Some(token) = caps.get(1) {
                        refs.push(RawReference {
                            raw: token.as_str().to_string(),
                            line: idx + 1,
                            kind: ReferenceKind::Heuristic,
                        });
                    }
                    break;
                }
            }
        }
        Ok(refs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(lang: Lang, content: &str) -> Vec<String> {
        TreeSitterCapability::new(lang)
            .try_extract(content)
            .expect("extraction should succeed")
            .into_iter()
            .map(|r| r.raw)
            .collect()
    }

    #[test]
    fn test_rust_imports() {
        let code = r"
            use std::io;
            use crate::config::Config;
            mod tests;
        ";
        let imports = extract(Lang::Rust, code);
        assert!(imports.contains(&"std::io".to_string()));
        assert!(imports.contains(&"crate::config::Config".to_string()));
        assert!(imports.contains(&"tests".to_string()));
    }

    #[test]
    fn test_python_imports() {
        let code = r"
import os
from sys import path
import numpy as np
";
        let imports = extract(Lang::Python, code);
        assert!(imports.contains(&"os".to_string()));
        assert!(imports.contains(&"sys".to_string()));
        assert!(imports.contains(&"numpy".to_string()));
    }

    #[test]
    fn test_ts_imports() {
        let code = r#"
            import { Foo } from "./components";
            const fs = require('fs');
            export * from "./utils";
        "#;
        let imports = extract(Lang::TypeScript, code);
        assert!(imports.contains(&"./components".to_string()));
        assert!(imports.contains(&"fs".to_string()));
        assert!(imports.contains(&"./utils".to_string()));
        assert!(!imports.contains(&"require".to_string()));
    }

    #[test]
    fn test_malformed_rust_fails_over() {
        let result = TreeSitterCapability::new(Lang::Rust).try_extract("use ;;; {{{");
        assert!(result.is_err(), "malformed source must error, not succeed");
    }

    #[test]
    fn test_heuristic_lines() {
        let code = "use crate::alpha;\nimport beta\nconst x = require('gamma');\n#include <delta.h>\n";
        let refs = HeuristicCapability
            .try_extract(code)
            .expect("heuristic is infallible");
        let raw: Vec<&str> = refs.iter().map(|r| r.raw.as_str()).collect();
        assert_eq!(raw, vec!["crate::alpha", "beta", "gamma", "delta.h"]);
        assert_eq!(refs[1].line, 2);
        assert!(refs.iter().all(|r| r.kind == ReferenceKind::Heuristic));
    }

    #[test]
    fn test_heuristic_js_from_form() {
        let code = "import { a, b } from './mod';\n";
        let refs = HeuristicCapability.try_extract(code).unwrap();
        assert_eq!(refs[0].raw, "./mod");
    }
}
