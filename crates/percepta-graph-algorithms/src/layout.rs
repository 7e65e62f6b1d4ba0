//! Force-directed layout
//!
//! Fruchterman–Reingold spring embedder. Edge weights scale the attractive
//! force, so strongly similar nodes are pulled closer together.

use super::common::GraphView;
use rand::{Rng, RngCore};

/// Layout configuration
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Number of cooling iterations
    pub iterations: usize,
    /// Minimum distance used when two nodes overlap
    pub min_distance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 500,
            min_distance: 0.01,
        }
    }
}

/// 2D position of a node
pub type Point = (f64, f64);

/// Compute a Fruchterman–Reingold layout. Coordinates are unbounded; renderers
/// rescale them to their canvas.
pub fn fruchterman_reingold(view: &GraphView, config: &LayoutConfig, rng: &mut dyn RngCore) -> Vec<Point> {
    let n = view.node_count;
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![(0.0, 0.0)];
    }

    let side = (n as f64).sqrt();
    let k = 1.0; // ideal edge length for area = n
    let mut positions: Vec<Point> = (0..n)
        .map(|_| {
            (
                rng.gen_range(-side / 2.0..side / 2.0),
                rng.gen_range(-side / 2.0..side / 2.0),
            )
        })
        .collect();

    let start_temperature = side / 10.0;
    let iterations = config.iterations.max(1);
    let mut displacement = vec![(0.0_f64, 0.0_f64); n];

    for step in 0..iterations {
        let temperature = start_temperature * (1.0 - step as f64 / iterations as f64);
        displacement.iter_mut().for_each(|d| *d = (0.0, 0.0));

        // Repulsion between every pair
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = positions[i].0 - positions[j].0;
                let dy = positions[i].1 - positions[j].1;
                let dist = (dx * dx + dy * dy).sqrt().max(config.min_distance);
                let force = k * k / dist;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                displacement[i].0 += fx;
                displacement[i].1 += fy;
                displacement[j].0 -= fx;
                displacement[j].1 -= fy;
            }
        }

        // Attraction along edges
        for &(u, v, w) in &view.edges {
            let w = if view.weights.is_some() { w } else { 1.0 };
            let dx = positions[u].0 - positions[v].0;
            let dy = positions[u].1 - positions[v].1;
            let dist = (dx * dx + dy * dy).sqrt().max(config.min_distance);
            let force = dist * dist / k * w;
            let (fx, fy) = (dx / dist * force, dy / dist * force);
            displacement[u].0 -= fx;
            displacement[u].1 -= fy;
            displacement[v].0 += fx;
            displacement[v].1 += fy;
        }

        // Move, capped by the current temperature
        for (pos, (dx, dy)) in positions.iter_mut().zip(displacement.iter()) {
            let length = (dx * dx + dy * dy).sqrt();
            if length > 0.0 {
                let capped = length.min(temperature);
                pos.0 += dx / length * capped;
                pos.1 += dy / length * capped;
            }
        }
    }

    positions
}
