//! Leiden community detection
//!
//! Modularity-optimizing Leiden algorithm (Traag, Waltman & van Eck, 2019)
//! for weighted undirected graphs:
//!
//! 1. fast local moving of nodes between communities (queue based),
//! 2. refinement of every community into well-connected sub-communities,
//! 3. aggregation of the refined partition into a smaller graph whose nodes
//!    start in the community of their members.
//!
//! The steps repeat until refinement no longer merges anything. Node visiting
//! order and refinement merges are randomized; callers own the RNG.

use super::common::GraphView;
use super::community::{compact_membership, CommunityDetector, Partition};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Gains below this are treated as ties
const GAIN_EPSILON: f64 = 1e-12;

/// Leiden configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LeidenConfig {
    /// Resolution parameter γ of the modularity objective (1.0 = classic modularity)
    pub resolution: f64,
    /// Number of full Leiden iterations; each one starts from the previous result
    pub iterations: usize,
    /// Randomness θ used when choosing a merge during refinement
    pub randomness: f64,
}

impl Default for LeidenConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            iterations: 2,
            randomness: 0.01,
        }
    }
}

/// Leiden detector, see module docs
#[derive(Debug, Clone, Default)]
pub struct Leiden {
    pub config: LeidenConfig,
}

/// Weighted graph at one aggregation level
struct LevelGraph {
    /// Neighbor lists without self loops, sorted by neighbor
    adj: Vec<Vec<(usize, f64)>>,
    /// Weighted degree, including the weight folded into the node by aggregation
    strength: Vec<f64>,
    /// Sum of strengths (= 2m)
    two_m: f64,
}

impl LevelGraph {
    fn from_view(view: &GraphView) -> Self {
        let adj: Vec<Vec<(usize, f64)>> = (0..view.node_count)
            .map(|i| view.incident(i).map(|(j, w, _)| (j, w)).collect())
            .collect();
        let strength: Vec<f64> = (0..view.node_count).map(|i| view.strength(i)).collect();
        let two_m = strength.iter().sum();
        LevelGraph { adj, strength, two_m }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    /// Collapse every group of `groups` (labels `0..k`) into one node.
    fn aggregate(&self, groups: &[usize], k: usize) -> LevelGraph {
        let mut rows: Vec<FxHashMap<usize, f64>> = vec![FxHashMap::default(); k];
        let mut strength = vec![0.0; k];

        for i in 0..self.len() {
            let ci = groups[i];
            strength[ci] += self.strength[i];
            for &(j, w) in &self.adj[i] {
                let cj = groups[j];
                if ci != cj {
                    *rows[ci].entry(cj).or_insert(0.0) += w;
                }
            }
        }

        let adj = rows
            .into_iter()
            .map(|row| {
                let mut neighbors: Vec<(usize, f64)> = row.into_iter().collect();
                neighbors.sort_by_key(|&(j, _)| j);
                neighbors
            })
            .collect();

        LevelGraph {
            adj,
            strength,
            two_m: self.two_m,
        }
    }
}

impl Leiden {
    pub fn new(config: LeidenConfig) -> Self {
        Self { config }
    }

    /// Run Leiden and return raw community labels (compacted to `0..k`).
    ///
    /// Isolated nodes end up in singleton communities. An edgeless graph
    /// yields the all-singletons partition.
    pub fn run(&self, view: &GraphView, rng: &mut dyn RngCore) -> Vec<usize> {
        let n = view.node_count;
        if n == 0 {
            return Vec::new();
        }

        let base = LevelGraph::from_view(view);
        if base.two_m <= 0.0 {
            return (0..n).collect();
        }

        let mut membership: Vec<usize> = (0..n).collect();
        for _ in 0..self.config.iterations.max(1) {
            membership = self.iterate(&base, membership, rng);
        }
        compact_membership(&membership)
    }

    /// One Leiden iteration starting from `initial` on the base graph.
    fn iterate(&self, base: &LevelGraph, initial: Vec<usize>, rng: &mut dyn RngCore) -> Vec<usize> {
        // original node -> node of the current level
        let mut node_map: Vec<usize> = (0..base.len()).collect();
        let mut owned: Option<LevelGraph> = None;
        let mut membership = compact_membership(&initial);

        loop {
            let graph = owned.as_ref().unwrap_or(base);
            self.move_nodes(graph, &mut membership, rng);

            let refined = compact_membership(&self.refine(graph, &membership, rng));
            let k = refined.iter().max().map_or(0, |&m| m + 1);
            if k == graph.len() {
                break;
            }

            // Aggregate nodes start in the (unrefined) community of their members
            let mut next_membership = vec![0; k];
            for (node, &sub) in refined.iter().enumerate() {
                next_membership[sub] = membership[node];
            }
            for slot in node_map.iter_mut() {
                *slot = refined[*slot];
            }

            let next = graph.aggregate(&refined, k);
            owned = Some(next);
            membership = compact_membership(&next_membership);
        }

        node_map.iter().map(|&node| membership[node]).collect()
    }

    /// Fast local moving. Returns whether any node changed community.
    fn move_nodes(&self, graph: &LevelGraph, membership: &mut [usize], rng: &mut dyn RngCore) -> bool {
        let n = graph.len();
        let gamma = self.config.resolution;

        let mut totals = vec![0.0; n];
        let mut sizes = vec![0usize; n];
        for node in 0..n {
            totals[membership[node]] += graph.strength[node];
            sizes[membership[node]] += 1;
        }
        let mut empty: Vec<usize> = (0..n).rev().filter(|&c| sizes[c] == 0).collect();

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);
        let mut queue: VecDeque<usize> = order.into();
        let mut queued = vec![true; n];

        let mut weight_to: FxHashMap<usize, f64> = FxHashMap::default();
        let mut candidates: Vec<usize> = Vec::new();
        let mut moved = false;

        while let Some(v) = queue.pop_front() {
            queued[v] = false;
            let current = membership[v];
            let k_v = graph.strength[v];

            weight_to.clear();
            candidates.clear();
            for &(u, w) in &graph.adj[v] {
                let c = membership[u];
                *weight_to.entry(c).or_insert_with(|| {
                    candidates.push(c);
                    0.0
                }) += w;
            }

            // Take v out of its community before scoring
            totals[current] -= k_v;
            sizes[current] -= 1;

            let score = |c: usize, w: f64| w - gamma * k_v * totals[c] / graph.two_m;
            let mut best = current;
            let mut best_gain = score(current, weight_to.get(&current).copied().unwrap_or(0.0));
            for &c in &candidates {
                if c == current {
                    continue;
                }
                let gain = score(c, weight_to[&c]);
                if gain > best_gain + GAIN_EPSILON {
                    best = c;
                    best_gain = gain;
                }
            }

            // Being alone scores 0; only reachable when v's community still has other members
            if best_gain < -GAIN_EPSILON && sizes[current] > 0 {
                if let Some(fresh) = empty.pop() {
                    best = fresh;
                }
            }

            totals[best] += k_v;
            sizes[best] += 1;
            if sizes[current] == 0 && best != current {
                empty.push(current);
            }

            if best != current {
                membership[v] = best;
                moved = true;
                for &(u, _) in &graph.adj[v] {
                    if !queued[u] && membership[u] != best {
                        queued[u] = true;
                        queue.push_back(u);
                    }
                }
            }
        }

        moved
    }

    /// Split every community of `membership` into well-connected sub-communities.
    fn refine(&self, graph: &LevelGraph, membership: &[usize], rng: &mut dyn RngCore) -> Vec<usize> {
        let n = graph.len();
        let gamma = self.config.resolution;
        let theta = self.config.randomness.max(f64::MIN_POSITIVE);

        let k = membership.iter().max().map_or(0, |&m| m + 1);
        let mut community_total = vec![0.0; k];
        for node in 0..n {
            community_total[membership[node]] += graph.strength[node];
        }

        // Weight from each node to the rest of its community
        let node_external: Vec<f64> = (0..n)
            .map(|v| {
                graph.adj[v]
                    .iter()
                    .filter(|&&(u, _)| membership[u] == membership[v])
                    .map(|&(_, w)| w)
                    .sum()
            })
            .collect();

        let mut refined: Vec<usize> = (0..n).collect();
        let mut sub_total = graph.strength.clone();
        let mut sub_size = vec![1usize; n];
        // Weight between a sub-community and the rest of its community
        let mut sub_external = node_external.clone();

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        let mut weight_to: FxHashMap<usize, f64> = FxHashMap::default();
        let mut candidates: Vec<usize> = Vec::new();
        let mut options: Vec<(usize, f64)> = Vec::new();

        for v in order {
            // Only nodes still on their own are moved
            if refined[v] != v || sub_size[v] != 1 {
                continue;
            }

            let c = membership[v];
            let k_v = graph.strength[v];
            let c_total = community_total[c];
            if node_external[v] < gamma * k_v * (c_total - k_v) / graph.two_m {
                continue;
            }

            weight_to.clear();
            candidates.clear();
            for &(u, w) in &graph.adj[v] {
                if membership[u] != c || refined[u] == v {
                    continue;
                }
                let sub = refined[u];
                *weight_to.entry(sub).or_insert_with(|| {
                    candidates.push(sub);
                    0.0
                }) += w;
            }

            options.clear();
            for &sub in &candidates {
                let well_connected = sub_external[sub]
                    >= gamma * sub_total[sub] * (c_total - sub_total[sub]) / graph.two_m;
                if !well_connected {
                    continue;
                }
                let gain = weight_to[&sub] - gamma * k_v * sub_total[sub] / graph.two_m;
                if gain >= 0.0 {
                    options.push((sub, gain));
                }
            }
            if options.is_empty() {
                continue;
            }

            let target = choose_weighted(&options, theta, rng);
            let w_vt = weight_to[&target];

            refined[v] = target;
            sub_size[v] = 0;
            sub_size[target] += 1;
            sub_total[v] = 0.0;
            sub_total[target] += k_v;
            sub_external[target] += node_external[v] - 2.0 * w_vt;
            sub_external[v] = 0.0;
        }

        refined
    }
}

/// Pick an option with probability proportional to `exp(gain / θ)`.
fn choose_weighted(options: &[(usize, f64)], theta: f64, rng: &mut dyn RngCore) -> usize {
    let max_gain = options
        .iter()
        .map(|&(_, g)| g)
        .fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = options
        .iter()
        .map(|&(_, g)| ((g - max_gain) / theta).exp())
        .collect();
    let total: f64 = weights.iter().sum();

    let mut draw = rng.gen::<f64>() * total;
    for (&(sub, _), &w) in options.iter().zip(weights.iter()) {
        if draw < w {
            return sub;
        }
        draw -= w;
    }
    options[options.len() - 1].0
}

impl CommunityDetector for Leiden {
    fn name(&self) -> &'static str {
        "leiden"
    }

    fn detect(&self, view: &GraphView, rng: &mut dyn RngCore) -> Partition {
        let labels = self.run(view, rng);
        Partition::from_labels(view, &labels, self.config.resolution)
    }
}
