//! Node and edge centrality for the similarity graph

use percepta_graph_algorithms::{
    betweenness, normalize_by_max, DegreeCentrality, EigenvectorCentrality, GraphView, NodeCentrality,
};
use tracing::warn;

/// Centrality scores, indexed by node (and by edge for `edge_betweenness`)
#[derive(Debug, Clone, PartialEq)]
pub struct CentralityScores {
    /// Weighted eigenvector centrality, max-scaled to 1.0
    pub eigenvector: Vec<f64>,
    /// Weighted betweenness divided by its maximum
    pub betweenness: Vec<f64>,
    /// Degree over `n - 1`
    pub degree: Vec<f64>,
    /// Weighted edge betweenness divided by its maximum
    pub edge_betweenness: Vec<f64>,
}

/// Evaluate a strategy, substituting zeros when it fails numerically.
fn score_or_zero(strategy: &dyn NodeCentrality, view: &GraphView) -> Vec<f64> {
    match strategy.compute(view) {
        Ok(scores) => scores,
        Err(e) => {
            warn!("{} centrality failed ({}); using 0.0 for every node", strategy.name(), e);
            vec![0.0; view.node_count]
        }
    }
}

pub fn compute_centrality(view: &GraphView) -> CentralityScores {
    let raw = betweenness(view);
    CentralityScores {
        eigenvector: score_or_zero(&EigenvectorCentrality::default(), view),
        betweenness: normalize_by_max(&raw.nodes),
        degree: score_or_zero(&DegreeCentrality, view),
        edge_betweenness: normalize_by_max(&raw.edges),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_scores() {
        // 0 - 1 - 2
        let view = GraphView::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0)], true);
        let scores = compute_centrality(&view);

        assert_eq!(scores.betweenness, vec![0.0, 1.0, 0.0]);
        assert_eq!(scores.degree, vec![0.5, 1.0, 0.5]);
        assert_eq!(scores.edge_betweenness, vec![1.0, 1.0]);
        assert!((scores.eigenvector[1] - 1.0).abs() < 1e-9);
        assert!(scores.eigenvector[0] < 1.0);
    }

    #[test]
    fn test_separate_subcultures_keep_eigenvector_scores() {
        // Two disconnected triangles of almost the same similarity
        let view = GraphView::from_edges(
            6,
            &[(0, 1, 0.92), (1, 2, 0.92), (0, 2, 0.92), (3, 4, 0.91), (4, 5, 0.91), (3, 5, 0.91)],
            true,
        );
        let scores = compute_centrality(&view);

        assert!(scores.eigenvector[..3].iter().all(|&s| (s - 1.0).abs() < 1e-9));
        assert!(scores.eigenvector[3..].iter().all(|&s| (s - 0.91 / 0.92).abs() < 1e-9));
    }

    #[test]
    fn test_edgeless_graph_falls_back_to_zero() {
        let view = GraphView::from_edges(4, &[], true);
        let scores = compute_centrality(&view);
        assert_eq!(scores.eigenvector, vec![0.0; 4]);
        assert_eq!(scores.betweenness, vec![0.0; 4]);
        assert!(scores.edge_betweenness.is_empty());
    }
}
