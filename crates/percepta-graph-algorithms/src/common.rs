//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of an undirected weighted graph for
//! algorithm execution.

use std::collections::HashMap;

/// Node Identifier type (u64)
pub type NodeId = u64;

/// Undirected edge as stored in the edge list: `(u, v, weight)` with `u < v`.
pub type WeightedEdge = (usize, usize, f64);

/// A dense, integer-indexed view of an undirected graph using Compressed Sparse Row (CSR) format.
///
/// Every undirected edge appears twice in the adjacency arrays (once per
/// endpoint) and once in `edges`. `edge_ids` maps each adjacency slot back to
/// its position in `edges`, which is what edge-level algorithms report on.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    pub node_to_index: HashMap<NodeId, usize>,

    /// Offsets into `targets`. Size = node_count + 1
    pub offsets: Vec<usize>,
    /// Contiguous array of neighbor indices
    pub targets: Vec<usize>,
    /// Edge weights: aligned with `targets`. `None` means every edge weighs 1.0
    pub weights: Option<Vec<f64>>,
    /// Undirected edge id for each adjacency slot, aligned with `targets`
    pub edge_ids: Vec<usize>,

    /// Canonical undirected edge list
    pub edges: Vec<WeightedEdge>,
}

impl GraphView {
    /// Build a view over nodes `0..node_count` from an undirected edge list.
    ///
    /// Self loops are dropped and `(v, u)` is normalized to `(u, v)` with `u < v`.
    /// Duplicate pairs are kept as given; callers are expected to pass a simple graph.
    pub fn from_edges(node_count: usize, edges: &[WeightedEdge], weighted: bool) -> Self {
        let index_to_node: Vec<NodeId> = (0..node_count as NodeId).collect();
        let node_to_index = index_to_node
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();
        Self::from_edges_with_ids(index_to_node, node_to_index, edges, weighted)
    }

    /// Build a view with explicit node identifiers.
    pub fn from_edges_with_ids(
        index_to_node: Vec<NodeId>,
        node_to_index: HashMap<NodeId, usize>,
        edges: &[WeightedEdge],
        weighted: bool,
    ) -> Self {
        let node_count = index_to_node.len();

        let canonical: Vec<WeightedEdge> = edges
            .iter()
            .filter(|(u, v, _)| u != v && *u < node_count && *v < node_count)
            .map(|&(u, v, w)| if u < v { (u, v, w) } else { (v, u, w) })
            .collect();

        // Adjacency lists (intermediate step)
        let mut adjacency: Vec<Vec<(usize, f64, usize)>> = vec![Vec::new(); node_count];
        for (eid, &(u, v, w)) in canonical.iter().enumerate() {
            adjacency[u].push((v, w, eid));
            adjacency[v].push((u, w, eid));
        }

        // Convert to CSR
        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::with_capacity(canonical.len() * 2);
        let mut edge_ids = Vec::with_capacity(canonical.len() * 2);
        let mut flat_weights = if weighted { Some(Vec::with_capacity(canonical.len() * 2)) } else { None };

        offsets.push(0);
        for mut neighbors in adjacency {
            neighbors.sort_by_key(|&(v, _, _)| v);
            for (v, w, eid) in neighbors {
                targets.push(v);
                edge_ids.push(eid);
                if let Some(ref mut w_flat) = flat_weights {
                    w_flat.push(w);
                }
            }
            offsets.push(targets.len());
        }

        GraphView {
            node_count,
            index_to_node,
            node_to_index,
            offsets,
            targets,
            weights: flat_weights,
            edge_ids,
            edges: canonical,
        }
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get the degree of a node (by index)
    pub fn degree(&self, idx: usize) -> usize {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    /// Get neighbors of a node
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        &self.targets[start..end]
    }

    /// Get weights of the edges incident to a node, aligned with `neighbors`
    pub fn weights(&self, idx: usize) -> Option<&[f64]> {
        self.weights.as_ref().map(|w| {
            let start = self.offsets[idx];
            let end = self.offsets[idx + 1];
            &w[start..end]
        })
    }

    /// Iterate `(neighbor, weight, edge_id)` for a node. Unweighted views yield 1.0.
    pub fn incident(&self, idx: usize) -> impl Iterator<Item = (usize, f64, usize)> + '_ {
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        (start..end).map(move |slot| {
            let w = self.weights.as_ref().map(|w| w[slot]).unwrap_or(1.0);
            (self.targets[slot], w, self.edge_ids[slot])
        })
    }

    /// Weighted degree (sum of incident edge weights)
    pub fn strength(&self, idx: usize) -> f64 {
        match self.weights(idx) {
            Some(w) => w.iter().sum(),
            None => self.degree(idx) as f64,
        }
    }

    /// Sum of all edge weights (each undirected edge counted once)
    pub fn total_weight(&self) -> f64 {
        if self.weights.is_some() {
            self.edges.iter().map(|&(_, _, w)| w).sum()
        } else {
            self.edges.len() as f64
        }
    }

    /// Whether `u` and `v` are adjacent. Neighbor slices are sorted, so this is a binary search.
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.neighbors(u).binary_search(&v).is_ok()
    }

    /// Edge weight between `u` and `v`, if adjacent
    pub fn edge_weight(&self, u: usize, v: usize) -> Option<f64> {
        let slot = self.neighbors(u).binary_search(&v).ok()?;
        Some(self.weights(u).map(|w| w[slot]).unwrap_or(1.0))
    }

    /// Edge density `2E / (n(n-1))`
    pub fn density(&self) -> f64 {
        let n = self.node_count as f64;
        if self.node_count < 2 {
            return 0.0;
        }
        2.0 * self.edges.len() as f64 / (n * (n - 1.0))
    }
}
