//! Betweenness centrality
//!
//! Brandes' algorithm over weighted shortest paths. Edge weights are read as
//! path lengths. Node and edge scores come out of the same pass.

use super::common::GraphView;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Relative tolerance when comparing path lengths
const PATH_EPSILON: f64 = 1e-10;

/// Result of a betweenness computation
#[derive(Debug, Clone)]
pub struct BetweennessResult {
    /// Raw node betweenness, indexed by node
    pub nodes: Vec<f64>,
    /// Raw edge betweenness, indexed by `GraphView::edges` position
    pub edges: Vec<f64>,
}

/// State for Dijkstra priority queue
#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node_idx: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Compare costs reversed for min-heap
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node_idx.cmp(&self.node_idx))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn same_length(a: f64, b: f64) -> bool {
    a.is_finite() && b.is_finite() && (a - b).abs() <= PATH_EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Single-source dependency accumulation. Adds this source's contribution into
/// `node_acc` / `edge_acc`.
fn accumulate_from(view: &GraphView, source: usize, node_acc: &mut [f64], edge_acc: &mut [f64]) {
    let n = view.node_count;
    let mut dist = vec![f64::INFINITY; n];
    let mut sigma = vec![0.0_f64; n];
    let mut settled = vec![false; n];
    // predecessor node and the edge used to reach it
    let mut preds: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    let mut stack: Vec<usize> = Vec::with_capacity(n);
    let mut heap = BinaryHeap::new();

    dist[source] = 0.0;
    sigma[source] = 1.0;
    heap.push(State { cost: 0.0, node_idx: source });

    while let Some(State { cost, node_idx }) = heap.pop() {
        if settled[node_idx] || cost > dist[node_idx] {
            continue;
        }
        settled[node_idx] = true;
        stack.push(node_idx);

        for (next_idx, weight, edge_id) in view.incident(node_idx) {
            if settled[next_idx] || weight < 0.0 {
                continue;
            }
            let next_cost = cost + weight;

            if same_length(next_cost, dist[next_idx]) {
                sigma[next_idx] += sigma[node_idx];
                preds[next_idx].push((node_idx, edge_id));
            } else if next_cost < dist[next_idx] {
                dist[next_idx] = next_cost;
                sigma[next_idx] = sigma[node_idx];
                preds[next_idx].clear();
                preds[next_idx].push((node_idx, edge_id));
                heap.push(State { cost: next_cost, node_idx: next_idx });
            }
        }
    }

    let mut delta = vec![0.0_f64; n];
    while let Some(w) = stack.pop() {
        for &(v, edge_id) in &preds[w] {
            let share = sigma[v] / sigma[w] * (1.0 + delta[w]);
            delta[v] += share;
            edge_acc[edge_id] += share;
        }
        if w != source {
            node_acc[w] += delta[w];
        }
    }
}

/// Weighted node and edge betweenness for an undirected graph.
///
/// Every unordered pair is counted once, matching the usual undirected
/// convention. Sources are processed in parallel.
pub fn betweenness(view: &GraphView) -> BetweennessResult {
    let n = view.node_count;
    let m = view.edge_count();

    let (nodes, edges) = (0..n)
        .into_par_iter()
        .fold(
            || (vec![0.0; n], vec![0.0; m]),
            |(mut node_acc, mut edge_acc), source| {
                accumulate_from(view, source, &mut node_acc, &mut edge_acc);
                (node_acc, edge_acc)
            },
        )
        .reduce(
            || (vec![0.0; n], vec![0.0; m]),
            |(mut na, mut ea), (nb, eb)| {
                na.iter_mut().zip(nb).for_each(|(a, b)| *a += b);
                ea.iter_mut().zip(eb).for_each(|(a, b)| *a += b);
                (na, ea)
            },
        );

    BetweennessResult {
        nodes: nodes.into_iter().map(|b| b / 2.0).collect(),
        edges: edges.into_iter().map(|b| b / 2.0).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_betweenness() {
        // 0-1-2-3 path, unit weights
        let view = GraphView::from_edges(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)], true);
        let result = betweenness(&view);

        // Node 1 lies on 0-2 and 0-3; node 2 on 0-3 and 1-3
        assert_eq!(result.nodes, vec![0.0, 2.0, 2.0, 0.0]);
        // Edge 1-2 carries 0-2, 0-3, 1-2, 1-3
        assert_eq!(result.edges, vec![3.0, 4.0, 3.0]);
    }

    #[test]
    fn test_weights_are_lengths() {
        // Triangle where the direct 0-2 edge is longer than going through 1
        let view = GraphView::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0), (0, 2, 5.0)], true);
        let result = betweenness(&view);
        assert_eq!(result.nodes[1], 1.0);
        assert_eq!(result.edges[2], 0.0);
    }

    #[test]
    fn test_equal_paths_split_credit() {
        // Square 0-1-3, 0-2-3: two shortest paths between 0 and 3
        let view = GraphView::from_edges(4, &[(0, 1, 1.0), (0, 2, 1.0), (1, 3, 1.0), (2, 3, 1.0)], true);
        let result = betweenness(&view);
        assert!((result.nodes[1] - 0.5).abs() < 1e-12);
        assert!((result.nodes[2] - 0.5).abs() < 1e-12);
        assert!(result.nodes[0] > 0.0);
    }

    #[test]
    fn test_disconnected_components() {
        let view = GraphView::from_edges(5, &[(0, 1, 1.0), (1, 2, 1.0), (3, 4, 1.0)], true);
        let result = betweenness(&view).nodes;
        assert_eq!(result, vec![0.0, 1.0, 0.0, 0.0, 0.0]);
    }
}
