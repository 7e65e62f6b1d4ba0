//! Campaign analysis pipeline
//!
//! fetch -> vectorize -> similarity graph -> partition -> metrics ->
//! narrative -> image -> save. A campaign either yields one stored report or
//! an [`OnaError`]; batch runs record the outcome and move on.

use crate::config::AnalysisConfig;
use crate::error::{OnaError, OnaResult};
use crate::metrics::compute_metrics;
use crate::narrative::synthesize;
use crate::network::build_graph;
use crate::partition::Partitioner;
use crate::persistence::ReportSink;
use crate::report::Report;
use crate::source::{fetch_campaign, CampaignSource};
use crate::survey::CampaignData;
use crate::vectorize::vectorize;
use crate::visualize::{GraphRenderer, SvgRenderer};
use chrono::Utc;
use tracing::{error, info, warn};

/// How one campaign of a batch ended
#[derive(Debug, Clone, PartialEq)]
pub enum CampaignOutcome {
    Completed,
    /// Not analyzable; the message says why
    Skipped(String),
    /// Upstream failure; the message says what broke
    Failed(String),
}

/// Per-campaign outcomes of a batch run, in processing order
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<(String, CampaignOutcome)>,
}

impl BatchSummary {
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, CampaignOutcome::Completed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CampaignOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CampaignOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&CampaignOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Runs the analysis for campaigns
pub struct Analyzer {
    config: AnalysisConfig,
    partitioner: Partitioner,
    renderer: Option<Box<dyn GraphRenderer>>,
}

impl Analyzer {
    /// Analyzer with Leiden partitioning and, when enabled, SVG rendering
    pub fn new(config: AnalysisConfig) -> OnaResult<Self> {
        config.validate()?;
        let partitioner = Partitioner::new(config.stability.clone());
        let renderer: Option<Box<dyn GraphRenderer>> = if config.render_image {
            Some(Box::new(SvgRenderer::default()))
        } else {
            None
        };
        Ok(Self {
            config,
            partitioner,
            renderer,
        })
    }

    pub fn with_partitioner(mut self, partitioner: Partitioner) -> Self {
        self.partitioner = partitioner;
        self
    }

    pub fn with_renderer(mut self, renderer: Option<Box<dyn GraphRenderer>>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze an already fetched campaign
    pub fn analyze(&self, data: &CampaignData) -> OnaResult<Report> {
        let vectors = vectorize(data, &self.config)?;
        let graph = build_graph(&vectors, &self.config.threshold)?;
        let outcome = self.partitioner.run(&graph.view);

        let metrics = compute_metrics(&graph, &outcome, &vectors);
        let narrative = synthesize(&metrics.narrative_input());
        let report = Report::assemble(metrics, narrative, Utc::now());

        let Some(renderer) = &self.renderer else {
            return Ok(report);
        };
        match renderer.render(&graph, &outcome.partition.membership) {
            Ok(image) => {
                info!("Graph image: {} KB", image.len() / 1024);
                Ok(report.with_image(image, renderer.format()))
            }
            Err(e) => {
                warn!("Graph image rendering failed for campaign {}: {}", data.campaign_id, e);
                Ok(report)
            }
        }
    }

    /// Fetch, analyze and store one campaign
    pub fn process_campaign(
        &self,
        source: &dyn CampaignSource,
        sink: &dyn ReportSink,
        campaign_id: &str,
    ) -> OnaResult<Report> {
        info!("=== ONA Analysis: {} ===", campaign_id);
        let data = fetch_campaign(source, campaign_id, &self.config)?;
        let report = self.analyze(&data)?;
        sink.save(campaign_id, &self.config.analysis_type, &report)?;
        Ok(report)
    }

    /// Process every closed or archived campaign, oldest first.
    ///
    /// Only a failure to list campaigns aborts the batch.
    pub fn process_all(&self, source: &dyn CampaignSource, sink: &dyn ReportSink) -> OnaResult<BatchSummary> {
        let campaigns = source.terminal_campaigns().map_err(OnaError::from)?;
        if campaigns.is_empty() {
            info!("No closed campaigns found");
            return Ok(BatchSummary::default());
        }
        info!("Found {} campaigns to process", campaigns.len());

        let mut summary = BatchSummary::default();
        for campaign in campaigns {
            let outcome = match self.process_campaign(source, sink, &campaign.id) {
                Ok(_) => CampaignOutcome::Completed,
                Err(e) if e.is_skip() => {
                    warn!("Skipping campaign {}: {}", campaign.id, e);
                    CampaignOutcome::Skipped(e.to_string())
                }
                Err(e) => {
                    error!("Campaign {} failed: {}", campaign.id, e);
                    CampaignOutcome::Failed(e.to_string())
                }
            };
            summary.outcomes.push((campaign.id, outcome));
        }

        info!(
            "ONA analysis complete: {} completed, {} skipped, {} failed",
            summary.completed(),
            summary.skipped(),
            summary.failed()
        );
        Ok(summary)
    }
}
