// tests/unit_layout.rs
//! Tests for the force-directed layout: reproducibility, bounds, and
//! node separation.

use repograph::graph::GraphBuilder;
use repograph::walker::FileDescriptor;
use repograph::{layout, Graph, Lang, ReferenceKind, Resolution, SimParams};

/// Ten files with a dozen weighted edges: a hub, a chain, and one
/// isolated node.
fn sample_graph() -> Graph {
    let mut builder = GraphBuilder::new();
    for i in 0..10 {
        builder.add_file(
            &FileDescriptor {
                relative_path: format!("src/m{i}.rs"),
                extension: "rs".to_string(),
                size: 50 + i * 10,
                depth: 1,
            },
            Some(Lang::Rust),
        );
    }
    let edges = [
        (0, 1),
        (0, 2),
        (0, 3),
        (0, 4),
        (1, 2),
        (2, 3),
        (3, 4),
        (4, 5),
        (5, 6),
        (6, 7),
        (7, 8),
        (8, 0),
    ];
    for (source, target) in edges {
        builder.add_reference(
            &format!("src/m{source}.rs"),
            &Resolution::File(format!("src/m{target}.rs")),
            ReferenceKind::Import,
        );
    }
    // Repeat one reference so at least one edge carries weight 2.
    builder.add_reference(
        "src/m0.rs",
        &Resolution::File("src/m1.rs".to_string()),
        ReferenceKind::Import,
    );
    builder.finish()
}

#[test]
fn test_same_seed_reproduces_exactly() {
    let graph = sample_graph();
    let params = SimParams::default();
    let first = layout(&graph, &params, 42).expect("layout succeeds");
    let second = layout(&graph, &params, 42).expect("layout succeeds");

    for node in &graph.nodes {
        assert_eq!(
            first.position(&node.id),
            second.position(&node.id),
            "{} must land on identical coordinates",
            node.id
        );
    }
}

#[test]
fn test_different_seed_differs() {
    let graph = sample_graph();
    let params = SimParams::default();
    let a = layout(&graph, &params, 1).expect("layout succeeds");
    let b = layout(&graph, &params, 2).expect("layout succeeds");

    let moved = graph
        .nodes
        .iter()
        .any(|node| a.position(&node.id) != b.position(&node.id));
    assert!(moved, "a different seed should produce a different layout");
}

#[test]
fn test_positions_within_viewport() {
    let graph = sample_graph();
    let params = SimParams::default();
    let result = layout(&graph, &params, 7).expect("layout succeeds");

    let (width, height) = params.viewport;
    for node in &graph.nodes {
        let (x, y) = result.position(&node.id).expect("every node is placed");
        assert!(x >= -width / 2.0 - 0.5 && x <= width / 2.0 + 0.5, "x = {x}");
        assert!(y >= -height / 2.0 - 0.5 && y <= height / 2.0 + 0.5, "y = {y}");
    }
}

#[test]
fn test_nodes_are_separated() {
    let graph = sample_graph();
    let result = layout(&graph, &SimParams::default(), 3).expect("layout succeeds");

    let positions: Vec<(f32, f32)> = graph
        .nodes
        .iter()
        .map(|n| result.position(&n.id).expect("placed"))
        .collect();
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let dx = positions[i].0 - positions[j].0;
            let dy = positions[i].1 - positions[j].1;
            let dist = (dx * dx + dy * dy).sqrt();
            assert!(dist > 4.0, "nodes {i} and {j} ended up {dist} apart");
        }
    }
}

#[test]
fn test_empty_graph() {
    let graph = GraphBuilder::new().finish();
    let result = layout(&graph, &SimParams::default(), 9).expect("layout succeeds");
    assert!(result.positions.is_empty());
}

#[test]
fn test_single_node_centered() {
    let mut builder = GraphBuilder::new();
    builder.add_file(
        &FileDescriptor {
            relative_path: "only.rs".to_string(),
            extension: "rs".to_string(),
            size: 1,
            depth: 0,
        },
        Some(Lang::Rust),
    );
    let graph = builder.finish();
    let result = layout(&graph, &SimParams::default(), 11).expect("layout succeeds");
    assert_eq!(result.position("only.rs"), Some((0.0, 0.0)));
}

#[test]
fn test_zero_iterations_rejected() {
    let graph = sample_graph();
    let params = SimParams {
        iterations: 0,
        ..SimParams::default()
    };
    assert!(layout(&graph, &params, 1).is_err());
}
