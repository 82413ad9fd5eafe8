// src/extract/mod.rs
//! Reference extraction: capability dispatch with heuristic fallback.

pub mod capability;
pub mod resolver;

use std::collections::HashMap;

use log::debug;

use crate::error::Diagnostic;
use crate::lang::Lang;
use crate::walker::FileDescriptor;

pub use capability::{
    HeuristicCapability, ImportCapability, RawReference, ReferenceKind, TreeSitterCapability,
};
pub use resolver::{Resolution, Resolver};

/// The capability table: one extraction strategy per supported language,
/// with the heuristic fallback always present.
pub struct Extractor {
    table: HashMap<Lang, Box<dyn ImportCapability>>,
    fallback: HeuristicCapability,
}

impl Extractor {
    #[must_use]
    pub fn new() -> Self {
        let mut table: HashMap<Lang, Box<dyn ImportCapability>> = HashMap::new();
        for lang in [Lang::Rust, Lang::Python, Lang::TypeScript, Lang::JavaScript] {
            table.insert(lang, Box::new(TreeSitterCapability::new(lang)));
        }
        Self {
            table,
            fallback: HeuristicCapability,
        }
    }

    /// Extracts raw references from one file. A capability failure is
    /// absorbed: the heuristic runs instead and a Parse diagnostic is
    /// returned alongside the (possibly heuristic) references.
    pub fn extract(
        &self,
        descriptor: &FileDescriptor,
        lang: Option<Lang>,
        content: &str,
    ) -> (Vec<RawReference>, Option<Diagnostic>) {
        let mut diagnostic = None;

        if let Some(capability) = lang.and_then(|l| self.table.get(&l)) {
            match capability.try_extract(content) {
                Ok(refs) => return (refs, None),
                Err(err) => {
                    debug!(
                        "capability failed for {}: {err}; using heuristic",
                        descriptor.relative_path
                    );
                    diagnostic = Some(Diagnostic::parse(
                        descriptor.relative_path.clone(),
                        format!("language capability failed ({err}); heuristic fallback used"),
                    ));
                }
            }
        }

        let refs = self.fallback.try_extract(content).unwrap_or_default();
        (refs, diagnostic)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(path: &str) -> FileDescriptor {
        FileDescriptor {
            relative_path: path.to_string(),
            extension: path.rsplit('.').next().unwrap_or_default().to_string(),
            size: 0,
            depth: path.matches('/').count(),
        }
    }

    #[test]
    fn test_dispatch_uses_capability() {
        let extractor = Extractor::new();
        let (refs, diag) = extractor.extract(
            &descriptor("src/main.rs"),
            Some(Lang::Rust),
            "use crate::config;\n",
        );
        assert!(diag.is_none());
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, ReferenceKind::Import);
    }

    #[test]
    fn test_malformed_falls_back_with_diagnostic() {
        let extractor = Extractor::new();
        let (refs, diag) = extractor.extract(
            &descriptor("src/bad.rs"),
            Some(Lang::Rust),
            "use broken::;;; {{{\nuse crate::ok;\n",
        );
        assert!(diag.is_some(), "parse failure must surface a diagnostic");
        assert!(refs.iter().all(|r| r.kind == ReferenceKind::Heuristic));
    }

    #[test]
    fn test_unknown_language_goes_heuristic() {
        let extractor = Extractor::new();
        let (refs, diag) =
            extractor.extract(&descriptor("build.gradle"), None, "import com.example.Thing\n");
        assert!(diag.is_none(), "no capability means no parse failure");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "com.example.Thing");
    }
}
