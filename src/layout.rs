// src/layout.rs
//! Deterministic force-directed layout.
//!
//! A fixed number of simulation iterations over the whole graph:
//! pairwise inverse-square repulsion, weighted spring attraction along
//! edges, a weak centering pull, and an explicit pairwise collision
//! correction pass. Initial positions come from a seeded generator, never
//! the clock, so a (graph, seed, params) triple always reproduces the
//! same coordinates bit for bit. The loop is intentionally sequential:
//! parallel accumulation would reorder float additions and break that.

use std::collections::HashMap;

use crate::error::Result;
use crate::graph::Graph;
use crate::options::SimParams;

/// Final 2-D coordinates, keyed by node id. Ephemeral: recomputed every
/// run, never persisted as part of the graph itself.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub positions: HashMap<String, (f32, f32)>,
}

impl LayoutResult {
    #[must_use]
    pub fn position(&self, id: &str) -> Option<(f32, f32)> {
        self.positions.get(id).copied()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Vec2 {
    x: f32,
    y: f32,
}

/// SplitMix64: tiny, seedable, and stable across platforms. Enough
/// entropy for initial scatter; statistical quality is irrelevant here.
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in `[-1, 1)`.
    fn next_unit(&mut self) -> f32 {
        let raw = (self.next_u64() >> 40) as f32 / (1u32 << 24) as f32;
        raw * 2.0 - 1.0
    }
}

/// Runs the simulation and rescales the result into the viewport.
///
/// # Errors
/// Returns [`ConfigError`](crate::error::ConfigError) when `params` are
/// invalid; the simulation itself cannot fail.
pub fn layout(graph: &Graph, params: &SimParams, seed: u64) -> Result<LayoutResult> {
    params.validate()?;

    let n = graph.nodes.len();
    if n == 0 {
        return Ok(LayoutResult {
            positions: HashMap::new(),
        });
    }

    let mut positions = initial_positions(n, seed);
    let radii = collision_radii(graph, params);
    let edges = edge_indices(graph);

    for iteration in 0..params.iterations {
        let mut displacement = vec![Vec2::default(); n];

        apply_repulsion(&positions, &mut displacement, params);
        apply_springs(&edges, &positions, &mut displacement, params);
        apply_centering(&positions, &mut displacement, params);

        // Cooling: early iterations may move far, late ones settle.
        let progress = iteration as f32 / params.iterations as f32;
        let step_limit = MAX_STEP * (1.0 - progress) + MIN_STEP;
        integrate(&mut positions, &displacement, step_limit);

        resolve_collisions(&mut positions, &radii);
    }

    rescale(&mut positions, params.viewport);

    let positions = graph
        .nodes
        .iter()
        .zip(positions)
        .map(|(node, p)| (node.id.clone(), (p.x, p.y)))
        .collect();
    Ok(LayoutResult { positions })
}

const MAX_STEP: f32 = 30.0;
const MIN_STEP: f32 = 1.0;
const MIN_DISTANCE: f32 = 0.01;

fn initial_positions(n: usize, seed: u64) -> Vec<Vec2> {
    let mut rng = SplitMix64::new(seed);
    // Scatter radius grows with node count so dense graphs do not start
    // inside each other's collision radii.
    let spread = 100.0 * (n as f32).sqrt();
    (0..n)
        .map(|_| Vec2 {
            x: rng.next_unit() * spread,
            y: rng.next_unit() * spread,
        })
        .collect()
}

fn collision_radii(graph: &Graph, params: &SimParams) -> Vec<f32> {
    let degrees = graph.weighted_degrees();
    graph
        .nodes
        .iter()
        .map(|node| {
            let (in_w, out_w) = degrees.get(node.id.as_str()).copied().unwrap_or((0, 0));
            let degree = (in_w + out_w) as f32;
            (params.min_radius + params.radius_per_degree * degree)
                .clamp(params.min_radius, params.max_radius)
        })
        .collect()
}

fn edge_indices(graph: &Graph) -> Vec<(usize, usize, u32)> {
    let index: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    graph
        .edges
        .iter()
        .filter_map(|e| {
            let source = *index.get(e.source.as_str())?;
            let target = *index.get(e.target.as_str())?;
            Some((source, target, e.weight))
        })
        .collect()
}

fn apply_repulsion(positions: &[Vec2], displacement: &mut [Vec2], params: &SimParams) {
    let n = positions.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (dx, dy, dist) = separation(positions[i], positions[j], i, j);
            let push = params.repulsion / (dist * dist);
            let ux = dx / dist;
            let uy = dy / dist;
            displacement[i].x += ux * push;
            displacement[i].y += uy * push;
            displacement[j].x -= ux * push;
            displacement[j].y -= uy * push;
        }
    }
}

fn apply_springs(
    edges: &[(usize, usize, u32)],
    positions: &[Vec2],
    displacement: &mut [Vec2],
    params: &SimParams,
) {
    for &(source, target, weight) in edges {
        if source == target {
            continue;
        }
        let (dx, dy, dist) = separation(positions[source], positions[target], source, target);
        // Heavier edges rest closer together.
        let rest = params.spring_rest_length / (1.0 + (weight as f32).ln_1p());
        let pull = params.spring * (dist - rest);
        let ux = dx / dist;
        let uy = dy / dist;
        // dx points source -> away from target; a positive pull moves
        // the endpoints toward each other.
        displacement[source].x -= ux * pull;
        displacement[source].y -= uy * pull;
        displacement[target].x += ux * pull;
        displacement[target].y += uy * pull;
    }
}

fn apply_centering(positions: &[Vec2], displacement: &mut [Vec2], params: &SimParams) {
    for (pos, disp) in positions.iter().zip(displacement.iter_mut()) {
        disp.x -= pos.x * params.centering;
        disp.y -= pos.y * params.centering;
    }
}

fn integrate(positions: &mut [Vec2], displacement: &[Vec2], step_limit: f32) {
    for (pos, disp) in positions.iter_mut().zip(displacement) {
        let magnitude = (disp.x * disp.x + disp.y * disp.y).sqrt();
        if magnitude <= f32::EPSILON {
            continue;
        }
        let scale = (magnitude.min(step_limit)) / magnitude;
        pos.x += disp.x * scale;
        pos.y += disp.y * scale;
    }
}

/// Hard exclusion pass: overlapping pairs are pushed apart by half the
/// overlap each, in index order. Not a soft force — after this pass no
/// pair (visited last) overlaps, and repeated iterations settle the rest.
fn resolve_collisions(positions: &mut [Vec2], radii: &[f32]) {
    let n = positions.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (dx, dy, dist) = separation(positions[i], positions[j], i, j);
            let required = radii[i] + radii[j];
            if dist >= required {
                continue;
            }
            let correction = (required - dist) / 2.0;
            let ux = dx / dist;
            let uy = dy / dist;
            positions[i].x += ux * correction;
            positions[i].y += uy * correction;
            positions[j].x -= ux * correction;
            positions[j].y -= uy * correction;
        }
    }
}

/// Separation vector from `b` to `a` with a deterministic nudge when the
/// two points coincide, so coincident nodes split instead of dividing by
/// zero.
fn separation(a: Vec2, b: Vec2, i: usize, j: usize) -> (f32, f32, f32) {
    let mut dx = a.x - b.x;
    let mut dy = a.y - b.y;
    let mut dist = (dx * dx + dy * dy).sqrt();
    if dist < MIN_DISTANCE {
        let angle = (i * 31 + j * 17) as f32;
        dx = angle.cos() * MIN_DISTANCE;
        dy = angle.sin() * MIN_DISTANCE;
        dist = MIN_DISTANCE;
    }
    (dx, dy, dist)
}

/// Affine min-max rescale, independent per axis, into
/// `[-w/2, w/2] x [-h/2, h/2]`. A degenerate axis collapses to 0.
fn rescale(positions: &mut [Vec2], viewport: (f32, f32)) {
    let (width, height) = viewport;
    let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
    for p in positions.iter() {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    for p in positions.iter_mut() {
        p.x = map_axis(p.x, min_x, max_x, width);
        p.y = map_axis(p.y, min_y, max_y, height);
    }
}

fn map_axis(v: f32, min: f32, max: f32, extent: f32) -> f32 {
    if max - min <= f32::EPSILON {
        0.0
    } else {
        (v - min) / (max - min) * extent - extent / 2.0
    }
}
