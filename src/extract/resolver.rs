// src/extract/resolver.rs
//! Resolves raw import tokens to node identities.
//!
//! Resolution probes the set of walker-seen relative paths, never the live
//! filesystem: results stay deterministic and remain consistent with a
//! budget-truncated walk. Tokens that match no known file become external
//! node identities rather than being discarded.

use std::collections::{HashMap, HashSet};

use crate::lang::Lang;
use crate::options::ResolutionPolicy;

/// Outcome of resolving one raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A walker-seen repository-relative path.
    File(String),
    /// The raw token, to be namespaced as an external node id.
    External(String),
}

/// Per-scan resolution context. Carries the memo cache explicitly so
/// concurrent scans of different repositories never share state.
pub struct Resolver<'a> {
    files: HashSet<&'a str>,
    policy: &'a ResolutionPolicy,
    cache: HashMap<(String, Option<Lang>, String), Resolution>,
}

impl<'a> Resolver<'a> {
    pub fn new(files: impl IntoIterator<Item = &'a str>, policy: &'a ResolutionPolicy) -> Self {
        Self {
            files: files.into_iter().collect(),
            policy,
            cache: HashMap::new(),
        }
    }

    /// Resolves `raw` as referenced from `source_rel`.
    pub fn resolve(&mut self, source_rel: &str, lang: Option<Lang>, raw: &str) -> Resolution {
        let dir = parent_dir(source_rel).to_string();
        let key = (dir.clone(), lang, raw.to_string());
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        let resolved = self.resolve_uncached(&dir, lang, raw);
        self.cache.insert(key, resolved.clone());
        resolved
    }

    fn resolve_uncached(&self, dir: &str, lang: Option<Lang>, raw: &str) -> Resolution {
        let hit = match lang {
            Some(Lang::Rust) => self.resolve_rust(dir, raw),
            Some(Lang::Python) => self.resolve_python(dir, raw),
            Some(Lang::TypeScript | Lang::JavaScript) => self.resolve_script(dir, raw),
            None => self.resolve_generic(dir, raw),
        };
        match hit {
            Some(path) => Resolution::File(path),
            None => Resolution::External(raw.to_string()),
        }
    }

    // ── Rust ────────────────────────────────────────────────

    fn resolve_rust(&self, dir: &str, raw: &str) -> Option<String> {
        if let Some(rest) = raw.strip_prefix("crate::") {
            let parts: Vec<&str> = rest.split("::").collect();
            return self.rust_variations("src", &parts);
        }
        if raw.starts_with("super::") {
            let mut parts: Vec<&str> = raw.split("::").collect();
            let mut base = dir.to_string();
            while parts.first() == Some(&"super") {
                parts.remove(0);
                base = parent_dir(&base).to_string();
            }
            if parts.is_empty() {
                return None;
            }
            return self.rust_variations(&base, &parts);
        }
        if let Some(rest) = raw.strip_prefix("self::") {
            let parts: Vec<&str> = rest.split("::").collect();
            return self.rust_variations(dir, &parts);
        }
        if !raw.contains("::") {
            // Bare segment: a `mod foo;` declaration or a sibling module.
            return self.rust_variations(dir, &[raw]);
        }
        None
    }

    /// Tries `<base>/<parts...>.rs` then `<base>/<parts...>/mod.rs`,
    /// shortening from the right so `crate::config::Config` still lands
    /// on `config.rs` when the last segment names an item.
    fn rust_variations(&self, base: &str, parts: &[&str]) -> Option<String> {
        for end in (1..=parts.len()).rev() {
            let joined = join_path(base, &parts[..end].join("/"));
            if let Some(hit) = self.probe(&format!("{joined}.rs")) {
                return Some(hit);
            }
            if let Some(hit) = self.probe(&format!("{joined}/mod.rs")) {
                return Some(hit);
            }
        }
        None
    }

    // ── Python ──────────────────────────────────────────────

    fn resolve_python(&self, dir: &str, raw: &str) -> Option<String> {
        let dots = raw.chars().take_while(|&c| c == '.').count();
        if dots > 0 {
            // `.utils` is sibling, `..utils` one level up, and so on.
            let mut base = dir.to_string();
            for _ in 1..dots {
                base = parent_dir(&base).to_string();
            }
            let rest = &raw[dots..];
            if rest.is_empty() {
                return self.probe(&join_path(&base, "__init__.py"));
            }
            return self.python_variations(&base, rest);
        }

        if let Some(hit) = self.python_variations("", raw) {
            return Some(hit);
        }
        for root in &self.policy.source_roots {
            if let Some(hit) = self.python_variations(root, raw) {
                return Some(hit);
            }
        }
        None
    }

    fn python_variations(&self, base: &str, dotted: &str) -> Option<String> {
        let parts: Vec<&str> = dotted.split('.').collect();
        for end in (1..=parts.len()).rev() {
            let joined = join_path(base, &parts[..end].join("/"));
            if let Some(hit) = self.probe(&format!("{joined}.py")) {
                return Some(hit);
            }
            if let Some(hit) = self.probe(&format!("{joined}/__init__.py")) {
                return Some(hit);
            }
        }
        None
    }

    // ── TypeScript / JavaScript ─────────────────────────────

    fn resolve_script(&self, dir: &str, raw: &str) -> Option<String> {
        if raw.starts_with('.') {
            let joined = normalize(&join_path(dir, raw))?;
            return self.script_candidates(&joined);
        }
        if is_bare_package(raw) {
            return None;
        }
        // Path-shaped bare specifier: try the configured source roots.
        for root in &self.policy.source_roots {
            let joined = normalize(&join_path(root, raw))?;
            if let Some(hit) = self.script_candidates(&joined) {
                return Some(hit);
            }
        }
        None
    }

    /// The configured fallback chain: exact path, each script suffix,
    /// then each index basename inside the path as a directory.
    fn script_candidates(&self, path: &str) -> Option<String> {
        if let Some(hit) = self.probe(path) {
            return Some(hit);
        }
        for suffix in &self.policy.script_suffixes {
            if let Some(hit) = self.probe(&format!("{path}{suffix}")) {
                return Some(hit);
            }
        }
        for index in &self.policy.index_basenames {
            for suffix in &self.policy.script_suffixes {
                if let Some(hit) = self.probe(&join_path(path, &format!("{index}{suffix}"))) {
                    return Some(hit);
                }
            }
        }
        None
    }

    // ── Fallback for heuristic tokens ───────────────────────

    fn resolve_generic(&self, dir: &str, raw: &str) -> Option<String> {
        if raw.starts_with('.') || raw.contains('/') {
            if let Some(joined) = normalize(&join_path(dir, raw)) {
                if let Some(hit) = self.script_candidates(&joined) {
                    return Some(hit);
                }
            }
            if let Some(rooted) = normalize(raw) {
                return self.script_candidates(&rooted);
            }
            return None;
        }
        if raw.contains("::") {
            let parts: Vec<&str> = raw
                .trim_start_matches("crate::")
                .trim_start_matches("self::")
                .split("::")
                .collect();
            return self
                .rust_variations("src", &parts)
                .or_else(|| self.rust_variations(dir, &parts));
        }
        if raw.contains('.') {
            return self.python_variations("", raw);
        }
        // Single bare token: sibling file in any known shape.
        self.rust_variations(dir, &[raw])
            .or_else(|| self.python_variations(dir, raw))
            .or_else(|| self.script_candidates(&join_path(dir, raw)))
    }

    fn probe(&self, path: &str) -> Option<String> {
        let normalized = normalize(path)?;
        self.files
            .contains(normalized.as_str())
            .then_some(normalized)
    }
}

/// Heuristic from the node ecosystem: a specifier with no path separator
/// (or a scoped `@scope/name` pair) is a package, not a file.
fn is_bare_package(raw: &str) -> bool {
    if raw.starts_with('@') {
        return raw.splitn(3, '/').count() <= 2;
    }
    !raw.contains('/')
}

fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

fn join_path(base: &str, rest: &str) -> String {
    if base.is_empty() {
        rest.to_string()
    } else if rest.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{rest}")
    }
}

/// Lexically collapses `.` and `..` segments. Returns `None` when `..`
/// escapes the repository root.
fn normalize(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}
