//! Metrics engine
//!
//! Derives everything the report says about a partitioned similarity graph:
//! summary statistics, centralities, community profiles, discriminant
//! dimensions, department density, bridge nodes and critical edges.
//!
//! Lists are kept complete here; [`crate::report::Report::assemble`] applies
//! the report limits.

pub mod centrality;
pub mod profiles;
pub mod stats;
pub mod structure;

pub use centrality::{compute_centrality, CentralityScores};
pub use profiles::{community_profiles, discriminants};
pub use structure::{bridges, critical_edges, department_density, node_metrics, short_id};

use crate::narrative::NarrativeInput;
use crate::network::PerceptualGraph;
use crate::partition::{PartitionOutcome, StabilityScore};
use crate::report::{
    Bridge, CommunityProfile, CriticalEdge, DepartmentDensity, Discriminant, NodeMetric, StabilityInfo, Summary,
};
use crate::survey::DimensionCode;
use crate::vectorize::VectorSet;
use indexmap::IndexMap;
use percepta_graph_algorithms::{average_clustering, count_triangles};
use stats::round_to;
use tracing::{debug, warn, Level};

/// Everything computed for one campaign, before report limits
#[derive(Debug, Clone)]
pub struct NetworkMetrics {
    pub summary: Summary,
    pub node_metrics: Vec<NodeMetric>,
    pub communities: Vec<CommunityProfile>,
    pub discriminants: Vec<Discriminant>,
    pub department_density: DepartmentDensity,
    pub bridges: Vec<Bridge>,
    pub critical_edges: Vec<CriticalEdge>,
    pub global_means: IndexMap<DimensionCode, f64>,
    pub stability: StabilityInfo,
    /// Unrounded stability, used by the narrative
    pub stability_score: StabilityScore,
}

impl NetworkMetrics {
    pub fn narrative_input(&self) -> NarrativeInput<'_> {
        NarrativeInput {
            community_count: self.summary.communities,
            modularity: self.summary.modularity,
            profiles: &self.communities,
            discriminants: &self.discriminants,
            bridge_count: self.bridges.len(),
            stability: self.stability_score,
        }
    }
}

/// Compute all metrics for a partitioned graph.
///
/// `vectors` must be the set the graph was built from (same node order).
pub fn compute_metrics(graph: &PerceptualGraph, outcome: &PartitionOutcome, vectors: &VectorSet) -> NetworkMetrics {
    let partition = &outcome.partition;
    let membership = partition.membership.as_slice();

    let mut clustering = average_clustering(&graph.view);
    if clustering.is_nan() {
        warn!("Average clustering undefined (nodes with fewer than two neighbors); reporting 0.0");
        clustering = 0.0;
    }
    if tracing::enabled!(Level::DEBUG) {
        debug!("{} triangles in similarity graph", count_triangles(&graph.view));
    }

    let scores = compute_centrality(&graph.view);

    let means = vectors.global_means();
    let communities = community_profiles(vectors, membership, partition.community_count, &means);
    let discriminants = discriminants(&communities, vectors);
    let global_means = vectors
        .dimensions
        .iter()
        .zip(means.iter())
        .map(|(code, &m)| (code.clone(), round_to(m, 3)))
        .collect();

    NetworkMetrics {
        summary: Summary {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            density: round_to(graph.density(), 4),
            communities: partition.community_count,
            modularity: round_to(partition.modularity, 4),
            avg_clustering: round_to(clustering, 4),
            threshold: round_to(graph.threshold(), 4),
        },
        node_metrics: node_metrics(graph, membership, &scores),
        communities,
        discriminants,
        department_density: department_density(graph),
        bridges: bridges(graph, membership, &scores),
        critical_edges: critical_edges(graph, membership, &scores),
        global_means,
        stability: StabilityInfo {
            nmi: round_to(outcome.stability.nmi, 4),
            label: outcome.stability.label,
            iterations: outcome.runs,
            method: outcome.method.to_string(),
        },
        stability_score: outcome.stability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Calibration, NodeInfo};
    use crate::partition::StabilityLabel;
    use crate::vectorize::RespondentVector;
    use ndarray::array;
    use percepta_graph_algorithms::{GraphView, Partition};

    #[test]
    fn test_path_graph_metrics() {
        // 0 - 1 - 2 - 3, split between the middle nodes
        let view = GraphView::from_edges(4, &[(0, 1, 0.9), (1, 2, 0.8), (2, 3, 0.9)], true);
        let partition = Partition::from_labels(&view, &[0, 0, 1, 1], 1.0);
        let graph = PerceptualGraph {
            nodes: (0..4)
                .map(|i| NodeInfo {
                    respondent_id: format!("respondent-{}", i),
                    department: if i < 2 { "Ventas" } else { "Finanzas" }.to_string(),
                })
                .collect(),
            view,
            calibration: Calibration {
                threshold: 0.8,
                density: 0.5,
                steps: 1,
                in_band: false,
            },
        };
        let outcome = PartitionOutcome {
            partition,
            best_run: 0,
            runs: 3,
            stability: StabilityScore {
                nmi: 1.0,
                label: StabilityLabel::Robust,
                pairs: 3,
            },
            method: "leiden",
        };
        let rows = [[5.0, 1.0], [4.0, 1.0], [1.0, 4.0], [1.0, 5.0]];
        let vectors = VectorSet {
            dimensions: vec![DimensionCode::new("COM"), DimensionCode::new("LID")],
            vectors: rows
                .iter()
                .enumerate()
                .map(|(i, r)| RespondentVector {
                    respondent_id: format!("respondent-{}", i),
                    department: if i < 2 { "Ventas" } else { "Finanzas" }.to_string(),
                    tenure: None,
                    gender: None,
                    values: array![r[0], r[1]],
                })
                .collect(),
        };

        let metrics = compute_metrics(&graph, &outcome, &vectors);

        assert_eq!(metrics.summary.nodes, 4);
        assert_eq!(metrics.summary.edges, 3);
        assert_eq!(metrics.summary.density, 0.5);
        assert_eq!(metrics.summary.communities, 2);
        // End nodes have one neighbor, so the average is undefined
        assert_eq!(metrics.summary.avg_clustering, 0.0);
        assert_eq!(metrics.node_metrics.len(), 4);
        assert_eq!(metrics.critical_edges.len(), 1);
        assert_eq!(metrics.stability.iterations, 3);
        assert_eq!(metrics.global_means[&DimensionCode::new("COM")], 2.75);
        assert_eq!(metrics.narrative_input().community_count, 2);
    }
}
