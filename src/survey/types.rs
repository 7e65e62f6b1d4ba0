//! Core record types for questionnaire data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Questionnaire dimension code (e.g., "LID", "COM", "ENG")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DimensionCode(String);

impl DimensionCode {
    pub fn new(code: impl Into<String>) -> Self {
        DimensionCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DimensionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DimensionCode {
    fn from(s: String) -> Self {
        DimensionCode(s)
    }
}

impl From<&str> for DimensionCode {
    fn from(s: &str) -> Self {
        DimensionCode(s.to_string())
    }
}

/// Campaign lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Closed,
    Archived,
}

impl CampaignStatus {
    /// Closed and archived campaigns are eligible for batch analysis
    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Closed | CampaignStatus::Archived)
    }
}

/// Respondent progress through the questionnaire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespondentStatus {
    Pending,
    InProgress,
    Completed,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: String,
    pub instrument_id: String,
    #[serde(default)]
    pub module_instrument_ids: Vec<String>,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
}

impl CampaignRecord {
    /// Primary instrument followed by module instruments
    pub fn instrument_ids(&self) -> Vec<String> {
        std::iter::once(self.instrument_id.clone())
            .chain(self.module_instrument_ids.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionRecord {
    pub id: String,
    pub code: DimensionCode,
    pub instrument_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    pub dimension_id: String,
    #[serde(default)]
    pub is_reverse: bool,
    #[serde(default)]
    pub is_attention_check: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondentRecord {
    pub id: String,
    pub campaign_id: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub tenure: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    pub status: RespondentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub respondent_id: String,
    pub item_id: String,
    pub score: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_code() {
        let code = DimensionCode::new("LID");
        assert_eq!(code.as_str(), "LID");
        assert_eq!(format!("{}", code), "LID");
        let other: DimensionCode = "COM".into();
        assert!(other < code);
    }

    #[test]
    fn test_status_parsing() {
        let closed: CampaignStatus = serde_json::from_str("\"closed\"").unwrap();
        assert!(closed.is_terminal());
        assert!(!CampaignStatus::Active.is_terminal());

        let done: RespondentStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(done, RespondentStatus::Completed);
        let odd: RespondentStatus = serde_json::from_str("\"disqualified\"").unwrap();
        assert_eq!(odd, RespondentStatus::Other);
    }

    #[test]
    fn test_instrument_ids_order() {
        let campaign: CampaignRecord = serde_json::from_str(
            r#"{"id":"c1","instrument_id":"core","module_instrument_ids":["m1","m2"],
                "status":"archived","created_at":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(campaign.instrument_ids(), vec!["core", "m1", "m2"]);
    }
}
