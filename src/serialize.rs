// src/serialize.rs
//! The two durable output contracts.
//!
//! Field names and ordering here are depended on by downstream
//! consumers (the narrative generator reads the line records, the
//! visualization reads the aggregate document). Both artifacts follow
//! the walker's ordering so an unchanged repository serializes
//! byte-identically run over run.

use std::io::{self, Write};

use serde::Serialize;

use crate::graph::{Graph, NodeKind};
use crate::layout::LayoutResult;

/// One line of the record stream: a single FileNode with its resolved
/// outgoing reference targets. Each line parses independently, so the
/// stream is appendable and diff-friendly.
#[derive(Debug, Clone, Serialize)]
pub struct NodeRecord {
    pub path: String,
    pub language: Option<String>,
    pub size: u64,
    pub score: f64,
    pub references: Vec<String>,
}

/// Builds the line records for every FileNode, in graph (walker) order.
/// References inherit the graph's deterministic edge ordering.
#[must_use]
pub fn build_records(graph: &Graph) -> Vec<NodeRecord> {
    graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::File)
        .map(|node| NodeRecord {
            path: node.id.clone(),
            language: node.language.map(|l| l.name().to_string()),
            size: node.size,
            score: node.score,
            references: graph
                .edges
                .iter()
                .filter(|e| e.source == node.id)
                .map(|e| e.target.clone())
                .collect(),
        })
        .collect()
}

/// Writes the record stream: one JSON object per line, `\n` terminated.
///
/// # Errors
/// Propagates I/O failures from the writer.
pub fn write_node_records(records: &[NodeRecord], mut writer: impl Write) -> io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record).map_err(io::Error::from)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct NodeDoc<'a> {
    id: &'a str,
    label: &'a str,
    score: f64,
    depth: usize,
    x: f32,
    y: f32,
}

#[derive(Serialize)]
struct EdgeDoc<'a> {
    source: &'a str,
    target: &'a str,
    weight: u32,
}

#[derive(Serialize)]
struct GraphDocument<'a> {
    truncated: bool,
    nodes: Vec<NodeDoc<'a>>,
    edges: Vec<EdgeDoc<'a>>,
}

/// Writes the aggregate node/edge document consumed by the
/// visualization front end. Nodes missing from the layout (never the
/// case for a layout computed over the same graph) sit at the origin.
///
/// # Errors
/// Propagates I/O failures from the writer.
pub fn write_graph_document(
    graph: &Graph,
    layout: &LayoutResult,
    truncated: bool,
    mut writer: impl Write,
) -> io::Result<()> {
    let document = GraphDocument {
        truncated,
        nodes: graph
            .nodes
            .iter()
            .map(|node| {
                let (x, y) = layout.position(&node.id).unwrap_or((0.0, 0.0));
                NodeDoc {
                    id: &node.id,
                    label: &node.label,
                    score: node.score,
                    depth: node.depth,
                    x,
                    y,
                }
            })
            .collect(),
        edges: graph
            .edges
            .iter()
            .map(|edge| EdgeDoc {
                source: &edge.source,
                target: &edge.target,
                weight: edge.weight,
            })
            .collect(),
    };

    serde_json::to_writer_pretty(&mut writer, &document).map_err(io::Error::from)?;
    writer.write_all(b"\n")
}
