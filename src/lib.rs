//! Percepta: perceptual network analysis
//!
//! Turns organizational climate survey results into a network of respondents
//! who perceive the organization alike, finds the sub-cultures in it and
//! describes them.
//!
//! # Pipeline
//!
//! 1. [`vectorize`]: item scores to one dimension vector per respondent
//! 2. [`network`]: cosine similarity graph with an adaptively chosen density
//! 3. [`partition`]: repeated Leiden detection, best partition, NMI stability
//! 4. [`metrics`]: centralities, community profiles, discriminant dimensions,
//!    department density, bridges, critical edges
//! 5. [`narrative`]: templated Spanish summary
//!
//! [`pipeline::Analyzer`] wires the stages to a [`source::CampaignSource`],
//! a [`persistence::ReportSink`] and an optional [`visualize::GraphRenderer`].
//! Graph algorithms live in the `percepta-graph-algorithms` crate.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use percepta::{AnalysisConfig, Analyzer, DatasetSource, MemoryReportSink};
//!
//! let source = DatasetSource::from_file("export.json").unwrap();
//! let sink = MemoryReportSink::new();
//! let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
//!
//! let summary = analyzer.process_all(&source, &sink).unwrap();
//! println!("{} campaigns analyzed", summary.completed());
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod narrative;
pub mod network;
pub mod partition;
pub mod persistence;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod survey;
pub mod vectorize;
pub mod visualize;

// Re-export main types for convenience
pub use config::{AnalysisConfig, ConfigError, ConfigResult, StabilityConfig, ThresholdConfig};
pub use error::{InsufficientData, OnaError, OnaResult};
pub use metrics::{compute_metrics, NetworkMetrics};
pub use narrative::{synthesize, NarrativeInput};
pub use network::{build_graph, Calibration, NodeInfo, PerceptualGraph};
pub use partition::{PartitionOutcome, Partitioner, StabilityLabel, StabilityScore};
pub use persistence::{AnalyticsRecord, MemoryReportSink, ReportSink, ReportStore, StorageError, StorageResult};
pub use pipeline::{Analyzer, BatchSummary, CampaignOutcome};
pub use report::Report;
pub use source::{fetch_campaign, CampaignSource, Dataset, DatasetSource, SourceError, SourceResult};
pub use survey::{CampaignData, CampaignStatus, DimensionCode, RespondentStatus};
pub use vectorize::{reverse_score, vectorize, RespondentVector, VectorSet};
pub use visualize::{GraphRenderer, RenderError, SvgRenderer};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
