//! Perceptual similarity network
//!
//! Nodes are respondents; an edge joins two respondents whose cosine
//! similarity reaches the calibrated threshold, weighted by that similarity.
//! The graph is built once per campaign and never mutated afterwards.

pub mod similarity;
pub mod threshold;

pub use similarity::{cosine_similarity_matrix, upper_triangle};
pub use threshold::{calibrate_threshold, Calibration};

use crate::config::ThresholdConfig;
use crate::error::{OnaError, OnaResult};
use crate::vectorize::VectorSet;
use percepta_graph_algorithms::GraphView;
use tracing::info;

/// Node payload
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub respondent_id: String,
    pub department: String,
}

/// Weighted undirected similarity graph
#[derive(Debug, Clone)]
pub struct PerceptualGraph {
    /// Node payloads, indexed like `view`
    pub nodes: Vec<NodeInfo>,
    /// CSR view consumed by the algorithms
    pub view: GraphView,
    pub calibration: Calibration,
}

impl PerceptualGraph {
    pub fn node_count(&self) -> usize {
        self.view.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.view.edge_count()
    }

    pub fn density(&self) -> f64 {
        self.view.density()
    }

    pub fn threshold(&self) -> f64 {
        self.calibration.threshold
    }
}

/// Build the similarity graph for a vector set.
///
/// Returns [`OnaError::DegenerateGraph`] when no pair reaches the threshold.
pub fn build_graph(vectors: &VectorSet, config: &ThresholdConfig) -> OnaResult<PerceptualGraph> {
    let n = vectors.len();
    let sim = cosine_similarity_matrix(&vectors.matrix());
    let pairs = upper_triangle(&sim);
    let calibration = calibrate_threshold(&pairs, config);

    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let s = sim[[i, j]];
            if s >= calibration.threshold {
                edges.push((i, j, s));
            }
        }
    }

    let view = GraphView::from_edges(n, &edges, true);
    let nodes = vectors
        .vectors
        .iter()
        .map(|v| NodeInfo {
            respondent_id: v.respondent_id.clone(),
            department: v.department.clone(),
        })
        .collect();

    let graph = PerceptualGraph {
        nodes,
        view,
        calibration,
    };
    info!(
        "Graph: {} nodes, {} edges, threshold={:.3}, density={:.3}",
        graph.node_count(),
        graph.edge_count(),
        graph.threshold(),
        graph.density()
    );

    if graph.edge_count() == 0 {
        return Err(OnaError::DegenerateGraph {
            threshold: calibration.threshold,
        });
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::DimensionCode;
    use crate::vectorize::RespondentVector;
    use ndarray::array;

    fn set(rows: &[[f64; 2]]) -> VectorSet {
        VectorSet {
            dimensions: vec![DimensionCode::new("COM"), DimensionCode::new("LID")],
            vectors: rows
                .iter()
                .enumerate()
                .map(|(i, r)| RespondentVector {
                    respondent_id: format!("resp-{:02}", i),
                    department: if i % 2 == 0 { "A" } else { "B" }.to_string(),
                    tenure: None,
                    gender: None,
                    values: array![r[0], r[1]],
                })
                .collect(),
        }
    }

    #[test]
    fn test_edges_follow_threshold() {
        // Vectors fanned out over the first quadrant
        let rows: Vec<[f64; 2]> = (0..12)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::FRAC_PI_2 / 11.0;
                [angle.cos() * 3.0, angle.sin() * 3.0]
            })
            .collect();
        let graph = build_graph(&set(&rows), &ThresholdConfig::default()).unwrap();

        assert_eq!(graph.node_count(), 12);
        assert!(graph.edge_count() > 0);
        assert!(graph.calibration.in_band);
        let density = graph.density();
        assert!((0.10..=0.30).contains(&density), "density {}", density);
        for &(_, _, w) in &graph.view.edges {
            assert!(w >= graph.threshold());
        }
        assert_eq!(graph.nodes[1].department, "B");
    }

    #[test]
    fn test_zero_vectors_connect_everything() {
        let rows = vec![[0.0, 0.0]; 10];
        // Every pair has similarity 0.0, so the threshold is 0.0 and all pairs connect
        let graph = build_graph(&set(&rows), &ThresholdConfig::default()).unwrap();
        assert_eq!(graph.edge_count(), 45);
    }

    #[test]
    fn test_single_node_degenerate() {
        let rows = vec![[1.0, 0.0]];
        let err = build_graph(&set(&rows), &ThresholdConfig::default()).unwrap_err();
        assert!(matches!(err, OnaError::DegenerateGraph { .. }));
    }
}
