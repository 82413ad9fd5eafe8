// src/walker.rs
//! File discovery: iterative traversal with ignore rules and a budget.
//!
//! The walk uses an explicit stack rather than recursion so arbitrarily
//! deep trees cannot overflow, and a visited set of canonical directory
//! paths so symlink cycles terminate. A single unreadable entry never
//! aborts the walk; it becomes a diagnostic and the walk moves on.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, warn};

use crate::error::Diagnostic;
use crate::options::{CompiledOptions, ScanOptions, BINARY_EXTENSIONS};

/// One candidate file, as seen by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Repository-relative path, always forward-slashed. The stable
    /// identity of the eventual graph node.
    pub relative_path: String,
    /// Lowercased extension, empty if none.
    pub extension: String,
    pub size: u64,
    /// Number of directories between the file and the root.
    pub depth: usize,
}

/// Result of a walk: descriptors in lexicographic order, plus anything
/// that went wrong along the way.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub files: Vec<FileDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
    /// True when the cooperative budget stopped the walk early.
    pub truncated: bool,
}

struct PendingDir {
    abs: PathBuf,
    rel: String,
    depth: usize,
}

/// Enumerates candidate files under `root`.
#[must_use]
pub fn walk(root: &Path, options: &ScanOptions, compiled: &CompiledOptions) -> WalkOutcome {
    let mut outcome = WalkOutcome::default();
    let started = Instant::now();

    let mut visited: HashSet<PathBuf> = HashSet::new();
    match fs::canonicalize(root) {
        Ok(canonical) => {
            visited.insert(canonical);
        }
        Err(err) => {
            outcome
                .diagnostics
                .push(Diagnostic::io(None, format!("cannot open root: {err}")));
            return outcome;
        }
    }

    let mut stack = vec![PendingDir {
        abs: root.to_path_buf(),
        rel: String::new(),
        depth: 0,
    }];

    'walk: while let Some(dir) = stack.pop() {
        if budget_exhausted(options, &outcome, started) {
            outcome.truncated = true;
            break;
        }

        let (entries, unreadable) = match read_sorted(&dir.abs) {
            Ok(listing) => listing,
            Err(err) => {
                warn!("skipping unreadable directory {}: {err}", dir.rel);
                outcome
                    .diagnostics
                    .push(Diagnostic::io(Some(dir.rel.clone()), err.to_string()));
                continue;
            }
        };
        if unreadable > 0 {
            outcome.diagnostics.push(Diagnostic::io(
                Some(dir.rel.clone()),
                format!("{unreadable} unreadable entries skipped"),
            ));
        }

        // Reverse so the LIFO stack pops subdirectories in lexicographic
        // order; this keeps budget truncation deterministic.
        let mut subdirs: Vec<PendingDir> = Vec::new();

        for (name, abs) in entries {
            let rel = if dir.rel.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", dir.rel, name)
            };

            // fs::metadata follows symlinks, so a link to a directory is
            // walked like a directory (guarded by the visited set below).
            let metadata = match fs::metadata(&abs) {
                Ok(metadata) => metadata,
                Err(err) => {
                    outcome
                        .diagnostics
                        .push(Diagnostic::io(Some(rel), err.to_string()));
                    continue;
                }
            };

            if metadata.is_dir() {
                if compiled.prune.is_match(&rel) {
                    debug!("pruned {rel}");
                    continue;
                }
                if options.max_depth.is_some_and(|max| dir.depth + 1 > max) {
                    continue;
                }
                match fs::canonicalize(&abs) {
                    Ok(canonical) => {
                        if !visited.insert(canonical) {
                            debug!("symlink cycle broken at {rel}");
                            continue;
                        }
                    }
                    Err(err) => {
                        outcome
                            .diagnostics
                            .push(Diagnostic::io(Some(rel), err.to_string()));
                        continue;
                    }
                }
                subdirs.push(PendingDir {
                    abs,
                    rel,
                    depth: dir.depth + 1,
                });
            } else if metadata.is_file() {
                if compiled.ignore.is_match(&rel) {
                    continue;
                }
                let extension = extension_of(&rel);
                if BINARY_EXTENSIONS.contains(&extension.as_str()) {
                    continue;
                }
                outcome.files.push(FileDescriptor {
                    depth: rel.matches('/').count(),
                    relative_path: rel,
                    extension,
                    size: metadata.len(),
                });
                if budget_exhausted(options, &outcome, started) {
                    outcome.truncated = true;
                    break 'walk;
                }
            }
        }

        subdirs.reverse();
        stack.extend(subdirs);
    }

    outcome.files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    outcome
}

fn budget_exhausted(options: &ScanOptions, outcome: &WalkOutcome, started: Instant) -> bool {
    if options
        .budget
        .max_files
        .is_some_and(|max| outcome.files.len() >= max)
    {
        return true;
    }
    options
        .budget
        .max_elapsed
        .is_some_and(|max| started.elapsed() >= max)
}

/// Reads a directory into (name, absolute path) pairs, sorted by name.
/// Individual unreadable entries are counted, not fatal.
fn read_sorted(dir: &Path) -> std::io::Result<(Vec<(String, PathBuf)>, usize)> {
    let mut entries: Vec<(String, PathBuf)> = Vec::new();
    let mut unreadable = 0;
    for entry in fs::read_dir(dir)? {
        match entry {
            Ok(entry) => {
                let name = entry.file_name().to_string_lossy().into_owned();
                entries.push((name, entry.path()));
            }
            Err(_) => unreadable += 1,
        }
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok((entries, unreadable))
}

fn extension_of(rel: &str) -> String {
    Path::new(rel)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lowercased() {
        assert_eq!(extension_of("src/Main.RS"), "rs");
        assert_eq!(extension_of("Makefile"), "");
    }
}
