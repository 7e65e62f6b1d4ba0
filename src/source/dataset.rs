//! In-memory data source loaded from a JSON export

use super::{CampaignSource, SourceResult};
use crate::survey::{
    CampaignRecord, DimensionRecord, ItemRecord, RespondentRecord, RespondentStatus, ResponseRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Table dump of the survey database
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub campaigns: Vec<CampaignRecord>,
    pub dimensions: Vec<DimensionRecord>,
    pub items: Vec<ItemRecord>,
    pub respondents: Vec<RespondentRecord>,
    pub responses: Vec<ResponseRecord>,
}

/// [`CampaignSource`] over a [`Dataset`]
#[derive(Debug, Default)]
pub struct DatasetSource {
    data: Dataset,
    response_queries: AtomicUsize,
}

impl DatasetSource {
    pub fn new(data: Dataset) -> Self {
        Self {
            data,
            response_queries: AtomicUsize::new(0),
        }
    }

    pub fn from_json(text: &str) -> SourceResult<Self> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn from_file(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let source = Self::from_json(&text)?;
        info!(
            "Loaded dataset {}: {} campaigns, {} respondents, {} responses",
            path.display(),
            source.data.campaigns.len(),
            source.data.respondents.len(),
            source.data.responses.len()
        );
        Ok(source)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    /// Number of response queries served so far
    pub fn response_queries(&self) -> usize {
        self.response_queries.load(Ordering::Relaxed)
    }
}

impl CampaignSource for DatasetSource {
    fn campaign(&self, campaign_id: &str) -> SourceResult<Option<CampaignRecord>> {
        Ok(self.data.campaigns.iter().find(|c| c.id == campaign_id).cloned())
    }

    fn dimensions(&self, instrument_ids: &[String]) -> SourceResult<Vec<DimensionRecord>> {
        let wanted: HashSet<&str> = instrument_ids.iter().map(String::as_str).collect();
        Ok(self
            .data
            .dimensions
            .iter()
            .filter(|d| wanted.contains(d.instrument_id.as_str()))
            .cloned()
            .collect())
    }

    fn items(&self, dimension_ids: &[String]) -> SourceResult<Vec<ItemRecord>> {
        let wanted: HashSet<&str> = dimension_ids.iter().map(String::as_str).collect();
        Ok(self
            .data
            .items
            .iter()
            .filter(|it| wanted.contains(it.dimension_id.as_str()))
            .cloned()
            .collect())
    }

    fn completed_respondents(&self, campaign_id: &str) -> SourceResult<Vec<RespondentRecord>> {
        Ok(self
            .data
            .respondents
            .iter()
            .filter(|r| r.campaign_id == campaign_id && r.status == RespondentStatus::Completed)
            .cloned()
            .collect())
    }

    fn responses(&self, respondent_ids: &[String]) -> SourceResult<Vec<ResponseRecord>> {
        self.response_queries.fetch_add(1, Ordering::Relaxed);
        let wanted: HashSet<&str> = respondent_ids.iter().map(String::as_str).collect();
        Ok(self
            .data
            .responses
            .iter()
            .filter(|r| wanted.contains(r.respondent_id.as_str()))
            .cloned()
            .collect())
    }

    fn terminal_campaigns(&self) -> SourceResult<Vec<CampaignRecord>> {
        let mut campaigns: Vec<CampaignRecord> = self
            .data
            .campaigns
            .iter()
            .filter(|c| c.status.is_terminal())
            .cloned()
            .collect();
        campaigns.sort_by_key(|c| c.created_at);
        Ok(campaigns)
    }
}
