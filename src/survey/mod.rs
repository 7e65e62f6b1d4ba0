//! Survey data model
//!
//! Records exactly as the data source delivers them for one campaign:
//! dimensions, items, respondents and item responses. The vectorizer turns a
//! [`CampaignData`] bundle into respondent vectors.

pub mod types;

pub use types::{
    CampaignRecord, CampaignStatus, DimensionCode, DimensionRecord, ItemRecord, RespondentRecord,
    RespondentStatus, ResponseRecord,
};

/// Everything the vectorizer needs for one campaign.
///
/// `dimensions` already excludes the outcome dimension, `items` already
/// excludes attention checks and `respondents` only holds completed ones when
/// assembled by [`crate::source::fetch_campaign`]. The vectorizer re-applies
/// those filters, so hand-built bundles behave the same.
#[derive(Debug, Clone, Default)]
pub struct CampaignData {
    pub campaign_id: String,
    pub dimensions: Vec<DimensionRecord>,
    pub items: Vec<ItemRecord>,
    pub respondents: Vec<RespondentRecord>,
    pub responses: Vec<ResponseRecord>,
}

impl CampaignData {
    pub fn new(campaign_id: impl Into<String>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            ..Default::default()
        }
    }
}
