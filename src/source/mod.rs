//! Survey data sources
//!
//! [`CampaignSource`] is the read-only query surface the pipeline needs.
//! [`fetch_campaign`] runs the query sequence for one campaign and returns a
//! [`CampaignData`] bundle ready for vectorization.

pub mod dataset;

pub use dataset::{Dataset, DatasetSource};

use crate::config::AnalysisConfig;
use crate::error::{InsufficientData, OnaError, OnaResult};
use crate::survey::{
    CampaignData, CampaignRecord, DimensionRecord, ItemRecord, RespondentRecord, ResponseRecord,
};
use thiserror::Error;
use tracing::{debug, info};

/// Data source errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Read-only access to campaigns and their questionnaire data
pub trait CampaignSource {
    fn campaign(&self, campaign_id: &str) -> SourceResult<Option<CampaignRecord>>;

    /// Dimensions of the given instruments, outcome dimension included
    fn dimensions(&self, instrument_ids: &[String]) -> SourceResult<Vec<DimensionRecord>>;

    fn items(&self, dimension_ids: &[String]) -> SourceResult<Vec<ItemRecord>>;

    /// Respondents of a campaign whose status is `completed`
    fn completed_respondents(&self, campaign_id: &str) -> SourceResult<Vec<RespondentRecord>>;

    fn responses(&self, respondent_ids: &[String]) -> SourceResult<Vec<ResponseRecord>>;

    /// Closed and archived campaigns, oldest first
    fn terminal_campaigns(&self) -> SourceResult<Vec<CampaignRecord>>;
}

/// Load everything needed to analyze one campaign.
///
/// Stops early with a skip when the campaign is missing, has no usable
/// dimension, or has fewer completed respondents than required.
pub fn fetch_campaign(
    source: &dyn CampaignSource,
    campaign_id: &str,
    config: &AnalysisConfig,
) -> OnaResult<CampaignData> {
    let campaign = source
        .campaign(campaign_id)?
        .ok_or_else(|| OnaError::CampaignNotFound(campaign_id.to_string()))?;

    let dimensions: Vec<DimensionRecord> = source
        .dimensions(&campaign.instrument_ids())?
        .into_iter()
        .filter(|d| d.code != config.excluded_dimension)
        .collect();
    if dimensions.is_empty() {
        return Err(InsufficientData::NoDimensions {
            excluded: config.excluded_dimension.to_string(),
        }
        .into());
    }

    let dimension_ids: Vec<String> = dimensions.iter().map(|d| d.id.clone()).collect();
    let items: Vec<ItemRecord> = source
        .items(&dimension_ids)?
        .into_iter()
        .filter(|it| !it.is_attention_check)
        .collect();

    let respondents = source.completed_respondents(campaign_id)?;
    if respondents.len() < config.min_respondents {
        return Err(InsufficientData::TooFewRespondents {
            found: respondents.len(),
            required: config.min_respondents,
        }
        .into());
    }

    let respondent_ids: Vec<String> = respondents.iter().map(|r| r.id.clone()).collect();
    let mut responses = Vec::new();
    for (batch_no, batch) in respondent_ids.chunks(config.response_batch_size.max(1)).enumerate() {
        let fetched = source.responses(batch)?;
        debug!("Response batch {}: {} rows", batch_no, fetched.len());
        responses.extend(fetched);
    }

    info!(
        "Fetched campaign {}: {} dimensions, {} items, {} respondents, {} responses",
        campaign_id,
        dimensions.len(),
        items.len(),
        respondents.len(),
        responses.len()
    );

    Ok(CampaignData {
        campaign_id: campaign_id.to_string(),
        dimensions,
        items,
        respondents,
        responses,
    })
}
