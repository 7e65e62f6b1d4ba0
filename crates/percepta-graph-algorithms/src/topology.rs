//! Graph topology analysis algorithms
//!
//! Triangle counting and weighted local clustering (Barrat et al., 2004).

use super::common::GraphView;

/// Triangle Counting
///
/// Returns total number of triangles in the graph, each counted once.
pub fn count_triangles(view: &GraphView) -> usize {
    let mut triangle_count = 0;

    // For each edge (u, v), find common neighbors w with u < v < w
    for u in 0..view.node_count {
        for &v in view.neighbors(u) {
            if v <= u {
                continue;
            }
            for &w in view.neighbors(v) {
                if w <= v {
                    continue;
                }
                if view.has_edge(u, w) {
                    triangle_count += 1;
                }
            }
        }
    }

    triangle_count
}

/// Weighted local clustering coefficient of every node.
///
/// `C_i = Σ_{j,h} (w_ij + w_ih) / 2 · a_ij a_ih a_jh / (s_i (k_i − 1))` over
/// ordered neighbor pairs, where `s_i` is the strength and `k_i` the degree.
/// Nodes with degree below two are undefined and yield NaN.
pub fn local_clustering(view: &GraphView) -> Vec<f64> {
    (0..view.node_count)
        .map(|i| {
            let k = view.degree(i);
            if k < 2 {
                return f64::NAN;
            }

            let incident: Vec<(usize, f64)> = view.incident(i).map(|(j, w, _)| (j, w)).collect();
            let mut numerator = 0.0;
            for (a, &(j, w_ij)) in incident.iter().enumerate() {
                for &(h, w_ih) in &incident[a + 1..] {
                    if view.has_edge(j, h) {
                        // Unordered pair stands for both orderings: 2 · (w_ij + w_ih) / 2
                        numerator += w_ij + w_ih;
                    }
                }
            }

            let strength = view.strength(i);
            if strength <= 0.0 {
                return f64::NAN;
            }
            numerator / (strength * (k - 1) as f64)
        })
        .collect()
}

/// Mean of the local clustering coefficients over all nodes.
///
/// Undefined nodes propagate NaN into the mean; callers decide how to
/// normalize it.
pub fn average_clustering(view: &GraphView) -> f64 {
    if view.node_count == 0 {
        return f64::NAN;
    }
    let values = local_clustering(view);
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k4() -> GraphView {
        let mut edges = Vec::new();
        for i in 0..4 {
            for j in (i + 1)..4 {
                edges.push((i, j, 1.0));
            }
        }
        GraphView::from_edges(4, &edges, true)
    }

    #[test]
    fn test_triangle_counting() {
        // Complete graph K4: 4 triangles
        assert_eq!(count_triangles(&k4()), 4);
    }

    #[test]
    fn test_complete_graph_clustering_is_one() {
        let values = local_clustering(&k4());
        assert!(values.iter().all(|c| (c - 1.0).abs() < 1e-12));
        assert!((average_clustering(&k4()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_clustering() {
        // Node 0 connects to 1 (w=1), 2 (w=3), 3 (w=2); only 1-2 closes a triangle
        let view = GraphView::from_edges(4, &[(0, 1, 1.0), (0, 2, 3.0), (0, 3, 2.0), (1, 2, 1.0)], true);
        let values = local_clustering(&view);
        // (1 + 3) / (6 * 2)
        assert!((values[0] - 4.0 / 12.0).abs() < 1e-12);
        assert!(values[3].is_nan());
    }

    #[test]
    fn test_low_degree_nodes_make_average_nan() {
        let view = GraphView::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0)], true);
        assert!(average_clustering(&view).is_nan());
    }
}
