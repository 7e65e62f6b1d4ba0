//! Community structure primitives
//!
//! Partition bookkeeping and modularity. The randomized optimizer itself
//! lives in [`crate::leiden`].

use super::common::GraphView;
use rand::RngCore;
use std::collections::HashMap;

/// A partition of the nodes of a graph into communities.
///
/// `membership[i]` is the community of node index `i`. Communities are
/// zero-indexed and contiguous.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Partition {
    pub membership: Vec<usize>,
    pub community_count: usize,
    pub modularity: f64,
}

impl Partition {
    /// Build a partition from a raw label vector, renumbering labels to `0..k`
    /// in order of first appearance and scoring it against `view`.
    pub fn from_labels(view: &GraphView, labels: &[usize], resolution: f64) -> Self {
        let membership = compact_membership(labels);
        let community_count = membership.iter().max().map(|&m| m + 1).unwrap_or(0);
        let modularity = modularity(view, &membership, resolution);
        Partition {
            membership,
            community_count,
            modularity,
        }
    }

    /// Node indices of each community, in community order
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.community_count];
        for (node, &c) in self.membership.iter().enumerate() {
            members[c].push(node);
        }
        members
    }

    /// Size of each community
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.community_count];
        for &c in &self.membership {
            sizes[c] += 1;
        }
        sizes
    }
}

/// A randomized community detection strategy.
///
/// Implementations must return a total partition of `view`'s nodes.
pub trait CommunityDetector: Send + Sync {
    /// Short algorithm name recorded in reports
    fn name(&self) -> &'static str;

    /// Detect communities using `rng` as the only source of randomness.
    fn detect(&self, view: &GraphView, rng: &mut dyn RngCore) -> Partition;
}

/// Renumber labels to `0..k` in order of first appearance.
pub fn compact_membership(labels: &[usize]) -> Vec<usize> {
    let mut renumber: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|label| {
            let next = renumber.len();
            *renumber.entry(*label).or_insert(next)
        })
        .collect()
}

/// Newman–Girvan modularity of `membership` on a weighted undirected graph.
///
/// `Q = Σ_c [ L_c / m − γ (K_c / 2m)² ]` where `L_c` is the internal edge
/// weight and `K_c` the summed strength of community `c`. Returns 0.0 for an
/// edgeless graph.
pub fn modularity(view: &GraphView, membership: &[usize], resolution: f64) -> f64 {
    let m = view.total_weight();
    if m <= 0.0 {
        return 0.0;
    }

    let k = membership.iter().max().map(|&c| c + 1).unwrap_or(0);
    let mut internal = vec![0.0; k];
    let mut totals = vec![0.0; k];

    for &(u, v, _) in &view.edges {
        if membership[u] == membership[v] {
            // Unweighted views report 1.0 per edge through edge_weight
            internal[membership[u]] += view.edge_weight(u, v).unwrap_or(0.0);
        }
    }
    for node in 0..view.node_count {
        totals[membership[node]] += view.strength(node);
    }

    let two_m = 2.0 * m;
    internal
        .iter()
        .zip(totals.iter())
        .map(|(l, t)| l / m - resolution * (t / two_m).powi(2))
        .sum()
}
