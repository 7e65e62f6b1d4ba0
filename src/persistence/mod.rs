//! Report persistence
//!
//! One stored report per (campaign, analysis type). Saving replaces whatever
//! was stored for that pair: existing rows are deleted and the new row is
//! inserted in one step.

pub mod memory;
pub mod store;

pub use memory::MemoryReportSink;
pub use store::ReportStore;

use crate::report::Report;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// RocksDB error
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Column family error
    #[error("Column family error: {0}")]
    ColumnFamily(String),

    /// Backend unusable (e.g. poisoned lock, unreachable service)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Stored analytics row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub campaign_id: String,
    pub analysis_type: String,
    pub data: Report,
    pub stored_at: DateTime<Utc>,
}

/// Destination for finished reports
pub trait ReportSink {
    /// Replace the stored report for `(campaign_id, analysis_type)`
    fn save(&self, campaign_id: &str, analysis_type: &str, report: &Report) -> StorageResult<()>;

    /// Latest stored report for the pair, if any
    fn get(&self, campaign_id: &str, analysis_type: &str) -> StorageResult<Option<Report>>;

    /// Number of stored rows for the pair
    fn count(&self, campaign_id: &str, analysis_type: &str) -> StorageResult<usize>;
}
