// src/score.rs
//! Importance scoring: structural degree, file size, and entry-point
//! signals folded into one normalized `[0, 1]` value per node.

use crate::graph::{Graph, NodeKind};
use crate::options::ScoreWeights;

/// Scores every node in place.
///
/// Raw score is a weighted sum of the node's share of incoming edge
/// weight, its share of outgoing edge weight, its normalized byte size,
/// and a fixed bonus when its stem is a configured entry-point name.
/// Raw scores are then divided by the maximum raw score; a graph with no
/// signal at all scores zero everywhere. External nodes carry only the
/// in-degree term.
pub fn score(graph: &mut Graph, weights: &ScoreWeights, entry_points: &[String]) {
    let degrees = graph.weighted_degrees();
    let total_weight: u64 = graph.edges.iter().map(|e| u64::from(e.weight)).sum();
    let max_size = graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::File)
        .map(|n| n.size)
        .max()
        .unwrap_or(0);

    let raw: Vec<f64> = graph
        .nodes
        .iter()
        .map(|node| {
            let (in_w, out_w) = degrees.get(node.id.as_str()).copied().unwrap_or((0, 0));
            let in_frac = fraction(in_w, total_weight);

            if node.kind == NodeKind::External {
                return weights.in_degree * in_frac;
            }

            let out_frac = fraction(out_w, total_weight);
            let size_frac = fraction(node.size, max_size);
            let entry = if is_entry_point(&node.label, entry_points) {
                1.0
            } else {
                0.0
            };

            weights.in_degree * in_frac
                + weights.out_degree * out_frac
                + weights.size * size_frac
                + weights.entry_point_bonus * entry
        })
        .collect();

    let max_raw = raw.iter().copied().fold(0.0_f64, f64::max);
    let ids: Vec<String> = graph.nodes.iter().map(|n| n.id.clone()).collect();
    for (id, raw_score) in ids.iter().zip(&raw) {
        let normalized = if max_raw > 0.0 { raw_score / max_raw } else { 0.0 };
        graph.set_score(id, normalized);
    }
}

fn fraction(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Entry-point match is on the filename stem: `main.rs`, `index.ts`, and
/// a bare `Makefile`-style name all compare by their pre-extension part.
fn is_entry_point(label: &str, entry_points: &[String]) -> bool {
    let stem = label.rsplit_once('.').map_or(label, |(stem, _)| stem);
    entry_points.iter().any(|e| e == stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{Resolution, ReferenceKind};
    use crate::graph::GraphBuilder;
    use crate::lang::Lang;
    use crate::walker::FileDescriptor;

    fn file(path: &str, size: u64) -> FileDescriptor {
        FileDescriptor {
            relative_path: path.to_string(),
            extension: "rs".to_string(),
            size,
            depth: path.matches('/').count(),
        }
    }

    fn weights() -> ScoreWeights {
        ScoreWeights::default()
    }

    #[test]
    fn test_three_cycle_scores_equal() {
        let mut builder = GraphBuilder::new();
        for name in ["a.rs", "b.rs", "c.rs"] {
            builder.add_file(&file(name, 100), Some(Lang::Rust));
        }
        builder.add_reference("a.rs", &Resolution::File("b.rs".into()), ReferenceKind::Import);
        builder.add_reference("b.rs", &Resolution::File("c.rs".into()), ReferenceKind::Import);
        builder.add_reference("c.rs", &Resolution::File("a.rs".into()), ReferenceKind::Import);
        let mut graph = builder.finish();

        score(&mut graph, &weights(), &[]);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        let scores: Vec<f64> = graph.nodes.iter().map(|n| n.score).collect();
        assert!((scores[0] - scores[1]).abs() < 1e-12);
        assert!((scores[1] - scores[2]).abs() < 1e-12);
        assert!((scores[0] - 1.0).abs() < 1e-12, "max score must be 1.0");
    }

    #[test]
    fn test_single_silent_node_scores_zero() {
        let mut builder = GraphBuilder::new();
        builder.add_file(&file("only.rs", 0), Some(Lang::Rust));
        let mut graph = builder.finish();
        score(&mut graph, &weights(), &[]);
        assert_eq!(graph.nodes[0].score, 0.0);
    }

    #[test]
    fn test_entry_point_bonus_applies() {
        let mut builder = GraphBuilder::new();
        builder.add_file(&file("src/main.rs", 100), Some(Lang::Rust));
        builder.add_file(&file("src/util.rs", 100), Some(Lang::Rust));
        let mut graph = builder.finish();
        score(&mut graph, &weights(), &["main".to_string()]);

        let main = graph.node("src/main.rs").expect("node exists").score;
        let util = graph.node("src/util.rs").expect("node exists").score;
        assert!((main - 1.0).abs() < 1e-12);
        assert!(util < main);
    }

    #[test]
    fn test_external_scored_from_in_degree_only() {
        let mut builder = GraphBuilder::new();
        builder.add_file(&file("a.rs", 10), Some(Lang::Rust));
        builder.add_reference(
            "a.rs",
            &Resolution::External("serde".into()),
            ReferenceKind::Import,
        );
        let mut graph = builder.finish();
        score(&mut graph, &weights(), &[]);

        let external = graph.node("external:serde").expect("node exists").score;
        assert!(external > 0.0, "referenced external must carry signal");
        assert!(external <= 1.0);
    }

    #[test]
    fn test_scores_bounded() {
        let mut builder = GraphBuilder::new();
        for name in ["a.rs", "b.rs", "hub.rs"] {
            builder.add_file(&file(name, 50), Some(Lang::Rust));
        }
        for source in ["a.rs", "b.rs"] {
            builder.add_reference(
                source,
                &Resolution::File("hub.rs".into()),
                ReferenceKind::Import,
            );
        }
        let mut graph = builder.finish();
        score(&mut graph, &weights(), &[]);
        assert!(graph.nodes.iter().all(|n| (0.0..=1.0).contains(&n.score)));
        let max = graph.nodes.iter().map(|n| n.score).fold(0.0_f64, f64::max);
        assert!((max - 1.0).abs() < 1e-12);
    }
}
