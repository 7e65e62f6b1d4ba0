//! Structural metrics: node table, department density, bridges, critical edges

use super::centrality::CentralityScores;
use super::stats::{percentile, round_to};
use crate::network::PerceptualGraph;
use crate::report::{Bridge, CriticalEdge, DepartmentDensity, NodeMetric};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};

/// Percentile of normalized betweenness a node must reach to count as a bridge
const BRIDGE_PERCENTILE: f64 = 75.0;

/// Respondent ids are shortened in reports
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

pub fn node_metrics(graph: &PerceptualGraph, membership: &[usize], scores: &CentralityScores) -> Vec<NodeMetric> {
    graph
        .nodes
        .iter()
        .enumerate()
        .map(|(v, node)| NodeMetric {
            id: short_id(&node.respondent_id),
            department: node.department.clone(),
            community: membership[v],
            eigenvector: round_to(scores.eigenvector[v], 4),
            betweenness: round_to(scores.betweenness[v], 4),
            degree: round_to(scores.degree[v], 4),
            connections: graph.view.degree(v),
        })
        .collect()
}

/// Edge density inside and between departments.
///
/// Self pairs divide by `k(k-1)/2`, cross pairs by `|A|·|B|`. Entries with no
/// possible pair are `None`.
pub fn department_density(graph: &PerceptualGraph) -> DepartmentDensity {
    let mut by_department: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (v, node) in graph.nodes.iter().enumerate() {
        by_department.entry(node.department.as_str()).or_default().push(v);
    }

    let mut matrix = IndexMap::with_capacity(by_department.len());
    for (&da, va) in &by_department {
        let mut row = IndexMap::with_capacity(by_department.len());
        for (&db, vb) in &by_department {
            let (realized, possible) = if da == db {
                let k = va.len();
                let realized = va
                    .iter()
                    .enumerate()
                    .map(|(i, &a)| va[i + 1..].iter().filter(|&&b| graph.view.has_edge(a, b)).count())
                    .sum::<usize>();
                (realized, k * k.saturating_sub(1) / 2)
            } else {
                let realized = va
                    .iter()
                    .map(|&a| vb.iter().filter(|&&b| graph.view.has_edge(a, b)).count())
                    .sum::<usize>();
                (realized, va.len() * vb.len())
            };
            let density = if possible > 0 {
                Some(round_to(realized as f64 / possible as f64, 3))
            } else {
                None
            };
            row.insert(db.to_string(), density);
        }
        matrix.insert(da.to_string(), row);
    }
    matrix
}

/// Nodes with high betweenness whose neighbors span at least two communities,
/// sorted by betweenness (descending).
pub fn bridges(graph: &PerceptualGraph, membership: &[usize], scores: &CentralityScores) -> Vec<Bridge> {
    let cutoff = percentile(&scores.betweenness, BRIDGE_PERCENTILE);

    let mut found: Vec<Bridge> = (0..graph.node_count())
        .filter(|&v| scores.betweenness[v] >= cutoff)
        .filter_map(|v| {
            let bridged: BTreeSet<usize> = graph.view.neighbors(v).iter().map(|&u| membership[u]).collect();
            if bridged.len() < 2 {
                return None;
            }
            let node = &graph.nodes[v];
            Some(Bridge {
                id: short_id(&node.respondent_id),
                department: node.department.clone(),
                community: membership[v],
                betweenness: round_to(scores.betweenness[v], 4),
                communities_bridged: bridged.len(),
                connections: graph.view.degree(v),
            })
        })
        .collect();

    found.sort_by(|a, b| b.betweenness.total_cmp(&a.betweenness));
    found
}

/// Edges joining different communities, sorted by edge betweenness (descending)
pub fn critical_edges(graph: &PerceptualGraph, membership: &[usize], scores: &CentralityScores) -> Vec<CriticalEdge> {
    let mut edges: Vec<CriticalEdge> = graph
        .view
        .edges
        .iter()
        .enumerate()
        .filter(|(_, e)| membership[e.0] != membership[e.1])
        .map(|(eid, &(u, v, w))| CriticalEdge {
            source_dept: graph.nodes[u].department.clone(),
            target_dept: graph.nodes[v].department.clone(),
            source_community: membership[u],
            target_community: membership[v],
            edge_betweenness: round_to(scores.edge_betweenness[eid], 4),
            weight: round_to(w, 4),
        })
        .collect();

    edges.sort_by(|a, b| b.edge_betweenness.total_cmp(&a.edge_betweenness));
    edges
}
