//! Node centrality measures
//!
//! Eigenvector centrality (per-component power iteration) and degree
//! centrality, plus the [`NodeCentrality`] strategy trait.

use super::common::GraphView;
use thiserror::Error;

/// Centrality errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CentralityError {
    /// Graph has no edges, so the measure is undefined
    #[error("graph has no edges")]
    NoEdges,

    /// Iteration produced NaN or infinity
    #[error("non-finite value during iteration")]
    NonFinite,
}

pub type CentralityResult<T> = Result<T, CentralityError>;

/// A per-node centrality strategy (graph -> one scalar per node index).
pub trait NodeCentrality {
    fn name(&self) -> &'static str;

    fn compute(&self, view: &GraphView) -> CentralityResult<Vec<f64>>;
}

/// Eigenvector centrality configuration
#[derive(Debug, Clone)]
pub struct EigenvectorConfig {
    /// Maximum number of power iterations
    pub max_iterations: usize,
    /// Convergence tolerance on the mean absolute change per node
    pub tolerance: f64,
}

impl Default for EigenvectorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-10,
        }
    }
}

/// Weighted eigenvector centrality, scaled so the maximum is 1.0
#[derive(Debug, Clone, Default)]
pub struct EigenvectorCentrality {
    pub config: EigenvectorConfig,
}

impl NodeCentrality for EigenvectorCentrality {
    fn name(&self) -> &'static str {
        "eigenvector"
    }

    fn compute(&self, view: &GraphView) -> CentralityResult<Vec<f64>> {
        eigenvector_centrality(view, &self.config)
    }
}

/// Connected components as node index lists, ordered by smallest member
fn components(view: &GraphView) -> Vec<Vec<usize>> {
    let mut seen = vec![false; view.node_count];
    let mut out = Vec::new();
    for start in 0..view.node_count {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut members = vec![start];
        let mut cursor = 0;
        while cursor < members.len() {
            let u = members[cursor];
            cursor += 1;
            for &v in view.neighbors(u) {
                if !seen[v] {
                    seen[v] = true;
                    members.push(v);
                }
            }
        }
        out.push(members);
    }
    out
}

/// Power iteration of `x ← (A + I)·x` restricted to one connected component.
///
/// Returns the max-scaled vector (aligned with `members`) and the spectral
/// radius of `A` on the component. Stops once the change per node falls below
/// the tolerance; an exhausted budget keeps the last iterate.
fn component_eigenvector(
    view: &GraphView,
    members: &[usize],
    local: &[usize],
    config: &EigenvectorConfig,
) -> CentralityResult<(Vec<f64>, f64)> {
    let size = members.len();
    let mut scores = vec![1.0; size];
    let mut next_scores = vec![0.0; size];
    let mut shifted_radius = 1.0;

    for _ in 0..config.max_iterations {
        for (slot, next) in next_scores.iter_mut().enumerate() {
            let mut sum = scores[slot];
            for (j, w, _) in view.incident(members[slot]) {
                sum += w * scores[local[j]];
            }
            *next = sum;
        }

        let max = next_scores.iter().cloned().fold(0.0_f64, f64::max);
        if !max.is_finite() || max <= 0.0 {
            return Err(CentralityError::NonFinite);
        }
        // With `scores` max-scaled, the max of `(A + I)·x` tends to the shifted radius
        shifted_radius = max;

        let mut total_diff = 0.0;
        for (next, current) in next_scores.iter_mut().zip(scores.iter()) {
            *next /= max;
            total_diff += (*next - *current).abs();
        }

        std::mem::swap(&mut scores, &mut next_scores);

        if total_diff < config.tolerance * size as f64 {
            break;
        }
    }

    Ok((scores, shifted_radius - 1.0))
}

/// Calculate eigenvector centrality for the graph view
///
/// Each connected component is iterated on its own; the identity shift leaves
/// the principal eigenvector unchanged but prevents oscillation on bipartite
/// components. Component vectors are scaled by their spectral radius relative
/// to the largest one, so the dominant component peaks at 1.0 and components
/// of nearly equal radius keep nearly equal scores. Isolated nodes score 0.0.
pub fn eigenvector_centrality(view: &GraphView, config: &EigenvectorConfig) -> CentralityResult<Vec<f64>> {
    let n = view.node_count;
    if n == 0 {
        return Ok(Vec::new());
    }
    if view.edge_count() == 0 {
        return Err(CentralityError::NoEdges);
    }

    let groups = components(view);
    let mut local = vec![0usize; n];
    for members in &groups {
        for (slot, &node) in members.iter().enumerate() {
            local[node] = slot;
        }
    }

    let mut solved = Vec::with_capacity(groups.len());
    for members in groups.iter().filter(|m| m.len() > 1) {
        let (vector, radius) = component_eigenvector(view, members, &local, config)?;
        solved.push((members, vector, radius));
    }

    let max_radius = solved.iter().map(|(_, _, r)| *r).fold(0.0_f64, f64::max);
    if !max_radius.is_finite() || max_radius <= 0.0 {
        return Err(CentralityError::NonFinite);
    }

    let mut scores = vec![0.0; n];
    for (members, vector, radius) in solved {
        let scale = radius.max(0.0) / max_radius;
        for (&node, value) in members.iter().zip(vector) {
            scores[node] = value * scale;
        }
    }
    Ok(scores)
}

/// Degree centrality: raw degree divided by `n - 1`
#[derive(Debug, Clone, Copy, Default)]
pub struct DegreeCentrality;

impl NodeCentrality for DegreeCentrality {
    fn name(&self) -> &'static str {
        "degree"
    }

    fn compute(&self, view: &GraphView) -> CentralityResult<Vec<f64>> {
        Ok(degree_centrality(view))
    }
}

pub fn degree_centrality(view: &GraphView) -> Vec<f64> {
    let n = view.node_count;
    if n < 2 {
        return vec![0.0; n];
    }
    let denom = (n - 1) as f64;
    (0..n).map(|i| view.degree(i) as f64 / denom).collect()
}

/// Divide by the observed maximum; all zeros when the maximum is not positive.
pub fn normalize_by_max(values: &[f64]) -> Vec<f64> {
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    if max > 0.0 {
        values.iter().map(|v| v / max).collect()
    } else {
        vec![0.0; values.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_center_is_most_central() {
        // 0 is the hub of a star with 4 leaves
        let view = GraphView::from_edges(5, &[(0, 1, 1.0), (0, 2, 1.0), (0, 3, 1.0), (0, 4, 1.0)], true);
        let scores = eigenvector_centrality(&view, &EigenvectorConfig::default()).unwrap();

        assert!((scores[0] - 1.0).abs() < 1e-9);
        for leaf in 1..5 {
            // Principal eigenvector of a star: leaves = hub / sqrt(4)
            assert!((scores[leaf] - 0.5).abs() < 1e-6, "leaf {} = {}", leaf, scores[leaf]);
        }
    }

    #[test]
    fn test_weights_shift_centrality() {
        // Path 0-1-2 where 1-2 is much heavier than 0-1
        let view = GraphView::from_edges(3, &[(0, 1, 0.1), (1, 2, 1.0)], true);
        let scores = EigenvectorCentrality::default().compute(&view).unwrap();
        assert!(scores[2] > scores[0]);
        assert!((scores[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_edgeless_is_an_error() {
        let view = GraphView::from_edges(3, &[], true);
        assert_eq!(
            eigenvector_centrality(&view, &EigenvectorConfig::default()),
            Err(CentralityError::NoEdges)
        );
    }

    #[test]
    fn test_exhausted_budget_keeps_last_iterate() {
        let view = GraphView::from_edges(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)], true);
        let config = EigenvectorConfig { max_iterations: 1, tolerance: 1e-15 };
        let scores = eigenvector_centrality(&view, &config).unwrap();

        // One step from the uniform start: (A + I)·1 = [2, 3, 3, 2]
        assert!((scores[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((scores[1] - 1.0).abs() < 1e-12);
        assert!(scores.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_disconnected_cliques_of_nearly_equal_weight() {
        // Two K4s, weights 0.90 and 0.89, plus an isolated node 8
        let mut edges = Vec::new();
        for (base, w) in [(0, 0.90), (4, 0.89)] {
            for i in base..base + 4 {
                for j in (i + 1)..base + 4 {
                    edges.push((i, j, w));
                }
            }
        }
        let view = GraphView::from_edges(9, &edges, true);
        let scores = eigenvector_centrality(&view, &EigenvectorConfig::default()).unwrap();

        for node in 0..4 {
            assert!((scores[node] - 1.0).abs() < 1e-9, "node {} = {}", node, scores[node]);
        }
        // Spectral radius 3 * 0.89 against 3 * 0.90
        for node in 4..8 {
            assert!((scores[node] - 0.89 / 0.90).abs() < 1e-9, "node {} = {}", node, scores[node]);
        }
        assert_eq!(scores[8], 0.0);
    }

    #[test]
    fn test_degree_centrality() {
        let view = GraphView::from_edges(4, &[(0, 1, 1.0), (0, 2, 1.0), (0, 3, 1.0)], false);
        assert_eq!(degree_centrality(&view), vec![1.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]);
        assert_eq!(DegreeCentrality.name(), "degree");
    }

    #[test]
    fn test_normalize_by_max() {
        assert_eq!(normalize_by_max(&[0.0, 2.0, 4.0]), vec![0.0, 0.5, 1.0]);
        assert_eq!(normalize_by_max(&[0.0, 0.0]), vec![0.0, 0.0]);
    }
}
