//! Report model
//!
//! The JSON document stored per campaign. Field names are the stable contract
//! consumed by dashboards; maps keep insertion order so the serialized report
//! reads in dimension and department order.

use crate::metrics::NetworkMetrics;
use crate::partition::StabilityLabel;
use crate::survey::DimensionCode;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Report list limits
pub const MAX_DISCRIMINANTS: usize = 10;
pub const MAX_BRIDGES: usize = 20;
pub const MAX_CRITICAL_EDGES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub nodes: usize,
    pub edges: usize,
    pub density: f64,
    pub communities: usize,
    pub modularity: f64,
    pub avg_clustering: f64,
    /// Calibrated similarity threshold
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetric {
    /// Respondent id prefix
    pub id: String,
    pub department: String,
    pub community: usize,
    pub eigenvector: f64,
    pub betweenness: f64,
    pub degree: f64,
    pub connections: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentShare {
    pub count: usize,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDifference {
    pub code: DimensionCode,
    /// Community mean minus global mean
    pub diff: f64,
    pub cluster_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityProfile {
    pub id: usize,
    pub size: usize,
    pub pct: f64,
    pub avg_score: f64,
    pub dominant_department: String,
    pub department_distribution: IndexMap<String, DepartmentShare>,
    pub dimension_scores: IndexMap<DimensionCode, f64>,
    pub top_differences: Vec<DimensionDifference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discriminant {
    pub code: DimensionCode,
    pub spread: f64,
    pub max_cluster: usize,
    pub max_value: f64,
    pub min_cluster: usize,
    pub min_value: f64,
}

/// Realized / possible edge ratio per department pair; `None` when undefined
pub type DepartmentDensity = IndexMap<String, IndexMap<String, Option<f64>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bridge {
    pub id: String,
    pub department: String,
    pub community: usize,
    pub betweenness: f64,
    pub communities_bridged: usize,
    pub connections: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalEdge {
    pub source_dept: String,
    pub target_dept: String,
    pub source_community: usize,
    pub target_community: usize,
    pub edge_betweenness: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityInfo {
    pub nmi: f64,
    pub label: StabilityLabel,
    pub iterations: usize,
    pub method: String,
}

/// Complete analysis result for one campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    pub node_metrics: Vec<NodeMetric>,
    pub communities: Vec<CommunityProfile>,
    pub discriminants: Vec<Discriminant>,
    pub department_density: DepartmentDensity,
    pub bridges: Vec<Bridge>,
    pub global_means: IndexMap<DimensionCode, f64>,
    pub narrative: String,
    pub generated_at: DateTime<Utc>,
    pub stability: StabilityInfo,
    pub critical_edges: Vec<CriticalEdge>,
    /// Base64 encoded image, absent when rendering is disabled or failed
    pub graph_image: Option<String>,
    pub graph_image_format: Option<String>,
}

impl Report {
    /// Build the stored report from complete metrics, applying list limits
    pub fn assemble(metrics: NetworkMetrics, narrative: String, generated_at: DateTime<Utc>) -> Self {
        let NetworkMetrics {
            summary,
            node_metrics,
            communities,
            mut discriminants,
            department_density,
            mut bridges,
            mut critical_edges,
            global_means,
            stability,
            ..
        } = metrics;
        discriminants.truncate(MAX_DISCRIMINANTS);
        bridges.truncate(MAX_BRIDGES);
        critical_edges.truncate(MAX_CRITICAL_EDGES);

        Report {
            summary,
            node_metrics,
            communities,
            discriminants,
            department_density,
            bridges,
            global_means,
            narrative,
            generated_at,
            stability,
            critical_edges,
            graph_image: None,
            graph_image_format: None,
        }
    }

    /// Attach an encoded graph image
    pub fn with_image(mut self, encoded: String, format: &str) -> Self {
        self.graph_image = Some(encoded);
        self.graph_image_format = Some(format.to_string());
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
