//! Pipeline error taxonomy
//!
//! Every failure of a campaign analysis is an [`OnaError`]. Variants split into
//! skips (the campaign cannot be analyzed, nothing is wrong with the system)
//! and failures (an upstream collaborator misbehaved). Batch runs log both and
//! move on to the next campaign.

use crate::config::ConfigError;
use crate::persistence::StorageError;
use crate::source::SourceError;
use thiserror::Error;

/// Why a campaign did not yield enough data for a network
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsufficientData {
    #[error("only {found} completed respondents (minimum {required})")]
    TooFewRespondents { found: usize, required: usize },

    #[error("no dimensions left after excluding {excluded}")]
    NoDimensions { excluded: String },

    #[error("only {found} respondents with complete vectors (minimum {required})")]
    TooFewCompleteVectors { found: usize, required: usize },
}

/// Pipeline errors
#[derive(Error, Debug)]
pub enum OnaError {
    #[error("insufficient data: {0}")]
    InsufficientData(#[from] InsufficientData),

    #[error("similarity graph has no edges at threshold {threshold:.4}")]
    DegenerateGraph { threshold: f64 },

    #[error("campaign not found: {0}")]
    CampaignNotFound(String),

    #[error("data source error: {0}")]
    Source(#[from] SourceError),

    #[error("report store error: {0}")]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl OnaError {
    /// Skips are expected outcomes for campaigns without analyzable structure
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            OnaError::InsufficientData(_) | OnaError::DegenerateGraph { .. } | OnaError::CampaignNotFound(_)
        )
    }
}

pub type OnaResult<T> = Result<T, OnaError>;
