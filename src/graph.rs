// src/graph.rs
//! The structural model: file/external nodes, weighted directed edges,
//! and the builder that merges resolved references into a closed graph.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::extract::{Resolution, ReferenceKind};
use crate::lang::Lang;
use crate::walker::FileDescriptor;

/// Namespace for synthetic nodes, so an external identity can never
/// collide with a repository-relative path.
pub const EXTERNAL_PREFIX: &str = "external:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    External,
}

/// A node: one scanned file, or one unresolved reference target.
///
/// Identity is immutable; `score` is filled in by the scorer after the
/// graph is closed.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub language: Option<Lang>,
    pub size: u64,
    pub depth: usize,
    pub score: f64,
}

/// Directed "source references target" relation. Multiple raw references
/// between the same ordered pair collapse into one edge with summed
/// weight; the kind is the most specific seen.
#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: ReferenceKind,
    pub weight: u32,
}

/// The closed graph. Node order: all file nodes in walker (lexicographic)
/// order, then external nodes in first-reference order. May contain
/// cycles; is not required to be connected.
#[derive(Debug, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    index: HashMap<String, usize>,
}

impl Graph {
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Weight-summed (in, out) degree per node id. Self-loops count on
    /// both sides.
    #[must_use]
    pub fn weighted_degrees(&self) -> HashMap<&str, (u64, u64)> {
        let mut degrees: HashMap<&str, (u64, u64)> =
            self.nodes.iter().map(|n| (n.id.as_str(), (0, 0))).collect();
        for edge in &self.edges {
            if let Some(entry) = degrees.get_mut(edge.source.as_str()) {
                entry.1 += u64::from(edge.weight);
            }
            if let Some(entry) = degrees.get_mut(edge.target.as_str()) {
                entry.0 += u64::from(edge.weight);
            }
        }
        degrees
    }

    pub(crate) fn set_score(&mut self, id: &str, score: f64) {
        if let Some(&i) = self.index.get(id) {
            self.nodes[i].score = score;
        }
    }
}

/// Assembles a [`Graph`] from walker output and resolved references.
/// Synthesizes external nodes lazily; performs no cycle detection, since
/// cycles are valid and flow through to serialization unchanged.
#[derive(Default)]
pub struct GraphBuilder {
    files: Vec<Node>,
    file_index: HashMap<String, usize>,
    // External nodes are kept apart so file nodes always come first in
    // the finished graph, whatever order references arrive in.
    externals: Vec<Node>,
    external_seen: HashMap<String, usize>,
    // Keyed by (source file order, target id): gives deterministic edge
    // ordering that follows the walker's ordering.
    edges: BTreeMap<(usize, String), (u32, ReferenceKind)>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one walker-discovered file as a node. Call in walker
    /// order; node order is insertion order.
    pub fn add_file(&mut self, descriptor: &FileDescriptor, language: Option<Lang>) {
        let id = descriptor.relative_path.clone();
        if self.file_index.contains_key(&id) {
            return;
        }
        let label = id.rsplit('/').next().unwrap_or(&id).to_string();
        self.file_index.insert(id.clone(), self.files.len());
        self.files.push(Node {
            id,
            kind: NodeKind::File,
            label,
            language,
            size: descriptor.size,
            depth: descriptor.depth,
            score: 0.0,
        });
    }

    /// Records one resolved reference as an edge candidate. External
    /// targets get their node synthesized on first sight.
    pub fn add_reference(&mut self, source_id: &str, resolution: &Resolution, kind: ReferenceKind) {
        let Some(&source_idx) = self.file_index.get(source_id) else {
            return;
        };
        let target_id = match resolution {
            Resolution::File(path) => {
                if !self.file_index.contains_key(path) {
                    return;
                }
                path.clone()
            }
            Resolution::External(token) => self.ensure_external(token),
        };

        let entry = self
            .edges
            .entry((source_idx, target_id))
            .or_insert((0, kind));
        entry.0 += 1;
        entry.1 = entry.1.max(kind);
    }

    fn ensure_external(&mut self, token: &str) -> String {
        let id = format!("{EXTERNAL_PREFIX}{token}");
        if !self.external_seen.contains_key(&id) {
            self.external_seen.insert(id.clone(), self.externals.len());
            self.externals.push(Node {
                id: id.clone(),
                kind: NodeKind::External,
                label: token.to_string(),
                language: None,
                size: 0,
                depth: 0,
                score: 0.0,
            });
        }
        id
    }

    #[must_use]
    pub fn finish(self) -> Graph {
        let edges = self
            .edges
            .into_iter()
            .map(|((source_idx, target), (weight, kind))| Edge {
                source: self.files[source_idx].id.clone(),
                target,
                kind,
                weight,
            })
            .collect();

        let mut nodes = self.files;
        nodes.extend(self.externals);
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        Graph { nodes, edges, index }
    }
}
