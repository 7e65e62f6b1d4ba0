//! Community partitioning with stability analysis
//!
//! The detector runs K times without a fixed seed. The run with the highest
//! modularity is kept (first run wins ties) and the mean pairwise NMI across
//! runs measures how reproducible the structure is.

use crate::config::StabilityConfig;
use percepta_graph_algorithms::{normalized_mutual_information, CommunityDetector, GraphView, Leiden, Partition};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Qualitative reading of the NMI stability score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilityLabel {
    Robust,
    Moderate,
    Weak,
}

impl StabilityLabel {
    pub fn from_score(nmi: f64) -> Self {
        if nmi >= 0.80 {
            StabilityLabel::Robust
        } else if nmi >= 0.50 {
            StabilityLabel::Moderate
        } else {
            StabilityLabel::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityLabel::Robust => "robust",
            StabilityLabel::Moderate => "moderate",
            StabilityLabel::Weak => "weak",
        }
    }
}

impl fmt::Display for StabilityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityScore {
    /// Mean pairwise NMI in [0, 1]
    pub nmi: f64,
    pub label: StabilityLabel,
    /// Number of run pairs compared
    pub pairs: usize,
}

/// Selected partition plus the evidence behind it
#[derive(Debug, Clone)]
pub struct PartitionOutcome {
    pub partition: Partition,
    /// Index of the selected run
    pub best_run: usize,
    pub runs: usize,
    pub stability: StabilityScore,
    /// Detector name, recorded in the report
    pub method: &'static str,
}

/// Index of the highest-modularity run; the earliest run wins ties.
pub fn select_best(runs: &[Partition]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, run) in runs.iter().enumerate() {
        match best {
            Some(b) if runs[b].modularity >= run.modularity => {}
            _ => best = Some(idx),
        }
    }
    best
}

/// Run pairs to compare: every pair up to the exhaustive limit, otherwise a
/// seeded sample of distinct-index pairs (a pair may be drawn more than once).
pub fn comparison_pairs(k: usize, config: &StabilityConfig) -> Vec<(usize, usize)> {
    if k < 2 {
        return Vec::new();
    }
    if k <= config.exhaustive_limit {
        return (0..k)
            .flat_map(|i| ((i + 1)..k).map(move |j| (i, j)))
            .collect();
    }
    let mut rng = StdRng::seed_from_u64(config.sampling_seed);
    (0..config.sampled_pairs)
        .map(|_| {
            let picked = rand::seq::index::sample(&mut rng, k, 2);
            (picked.index(0), picked.index(1))
        })
        .collect()
}

/// Mean pairwise NMI over the given membership vectors
pub fn stability_score(memberships: &[&[usize]], config: &StabilityConfig) -> StabilityScore {
    let pairs = comparison_pairs(memberships.len(), config);
    let nmi = if pairs.is_empty() {
        0.0
    } else {
        pairs
            .iter()
            .map(|&(i, j)| normalized_mutual_information(memberships[i], memberships[j]))
            .sum::<f64>()
            / pairs.len() as f64
    };
    StabilityScore {
        nmi,
        label: StabilityLabel::from_score(nmi),
        pairs: pairs.len(),
    }
}

/// Repeated community detection over one graph
pub struct Partitioner {
    detector: Box<dyn CommunityDetector>,
    config: StabilityConfig,
}

impl Partitioner {
    /// Leiden with the configured parameters
    pub fn new(config: StabilityConfig) -> Self {
        let detector = Box::new(Leiden::new(config.leiden.clone()));
        Self { detector, config }
    }

    /// Use a custom detection strategy
    pub fn with_detector(detector: Box<dyn CommunityDetector>, config: StabilityConfig) -> Self {
        Self { detector, config }
    }

    /// Run the detector K times in parallel and pick the best partition.
    ///
    /// Runs are collected in run-index order, so selection does not depend on
    /// which thread finishes first.
    pub fn run(&self, view: &GraphView) -> PartitionOutcome {
        let k = self.config.iterations.max(1);
        let detector = self.detector.as_ref();

        let runs: Vec<Partition> = (0..k)
            .into_par_iter()
            .map(|_| {
                let mut rng = rand::thread_rng();
                detector.detect(view, &mut rng)
            })
            .collect();
        for (idx, run) in runs.iter().enumerate() {
            debug!(
                "Run {}: {} communities, modularity={:.4}",
                idx, run.community_count, run.modularity
            );
        }

        let memberships: Vec<&[usize]> = runs.iter().map(|p| p.membership.as_slice()).collect();
        let stability = stability_score(&memberships, &self.config);
        let best_run = select_best(&runs).unwrap_or(0);
        let partition = runs.into_iter().nth(best_run).unwrap_or_else(|| Partition {
            membership: vec![0; view.node_count],
            community_count: usize::from(view.node_count > 0),
            modularity: 0.0,
        });

        info!(
            "{}: {} communities, modularity={:.3}, stability={:.3} ({})",
            self.detector.name(),
            partition.community_count,
            partition.modularity,
            stability.nmi,
            stability.label
        );

        PartitionOutcome {
            partition,
            best_run,
            runs: k,
            stability,
            method: self.detector.name(),
        }
    }
}
