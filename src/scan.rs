// src/scan.rs
//! Pipeline orchestration: walk, parallel extraction, merge, score.
//!
//! The read-and-extract step touches no shared mutable state and fans
//! out across the rayon pool; everything after the collect barrier
//! (resolution, graph merge, scoring) runs sequentially in walker order
//! so the result is deterministic.

use std::fs;
use std::path::Path;

use log::debug;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::error::{Diagnostic, Result};
use crate::extract::{Extractor, RawReference, Resolver};
use crate::graph::{Graph, GraphBuilder};
use crate::options::ScanOptions;
use crate::score;
use crate::serialize::{self, NodeRecord};
use crate::walker::{self, FileDescriptor};

/// Everything a scan produces: the closed graph, the per-file line
/// records, the accumulated diagnostics, and whether the budget cut the
/// walk short.
#[derive(Debug)]
pub struct ScanResult {
    pub graph: Graph,
    pub records: Vec<NodeRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub truncated: bool,
}

struct Extracted {
    references: Vec<RawReference>,
    diagnostics: Vec<Diagnostic>,
}

/// Scans a repository into a structural model.
///
/// # Errors
/// Only configuration problems are fatal; see [`ConfigError`]. Per-file
/// failures are absorbed into `ScanResult::diagnostics` and the pipeline
/// always completes with a usable (possibly partial) graph.
///
/// [`ConfigError`]: crate::error::ConfigError
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanResult> {
    let compiled = options.validate()?;

    let outcome = walker::walk(root, options, &compiled);
    debug!(
        "walked {} files ({} diagnostics, truncated: {})",
        outcome.files.len(),
        outcome.diagnostics.len(),
        outcome.truncated
    );

    let extractor = Extractor::new();
    // Fan-out: one independent read+extract per file. The collect() is
    // the synchronization barrier before the single-threaded merge.
    let extracted: Vec<Extracted> = outcome
        .files
        .par_iter()
        .map(|descriptor| extract_one(root, descriptor, options, &extractor))
        .collect();

    let mut diagnostics = outcome.diagnostics;
    let mut builder = GraphBuilder::new();
    for descriptor in &outcome.files {
        builder.add_file(descriptor, options.lang_for_ext(&descriptor.extension));
    }

    let mut resolver = Resolver::new(
        outcome.files.iter().map(|f| f.relative_path.as_str()),
        &options.resolution,
    );
    for (descriptor, result) in outcome.files.iter().zip(&extracted) {
        let lang = options.lang_for_ext(&descriptor.extension);
        for reference in &result.references {
            let resolution = resolver.resolve(&descriptor.relative_path, lang, &reference.raw);
            builder.add_reference(&descriptor.relative_path, &resolution, reference.kind);
        }
    }
    for result in extracted {
        diagnostics.extend(result.diagnostics);
    }

    let mut graph = builder.finish();
    score::score(&mut graph, &options.weights, &options.entry_points);
    let records = serialize::build_records(&graph);

    Ok(ScanResult {
        graph,
        records,
        diagnostics,
        truncated: outcome.truncated,
    })
}

fn extract_one(
    root: &Path,
    descriptor: &FileDescriptor,
    options: &ScanOptions,
    extractor: &Extractor,
) -> Extracted {
    let absolute = root.join(&descriptor.relative_path);
    let bytes = match fs::read(&absolute) {
        Ok(bytes) => bytes,
        Err(err) => {
            return Extracted {
                references: Vec::new(),
                diagnostics: vec![Diagnostic::io(
                    Some(descriptor.relative_path.clone()),
                    err.to_string(),
                )],
            };
        }
    };

    let content = String::from_utf8_lossy(&bytes);
    let lang = options.lang_for_ext(&descriptor.extension);
    let (references, diagnostic) = extractor.extract(descriptor, lang, &content);

    Extracted {
        references,
        diagnostics: diagnostic.into_iter().collect(),
    }
}
