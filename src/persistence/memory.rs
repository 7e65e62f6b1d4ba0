//! In-memory report sink for tests and dry runs

use super::{AnalyticsRecord, ReportSink, StorageError, StorageResult};
use crate::report::Report;
use chrono::Utc;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryReportSink {
    rows: Mutex<Vec<AnalyticsRecord>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored row, in insertion order
    pub fn records(&self) -> StorageResult<Vec<AnalyticsRecord>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, Vec<AnalyticsRecord>>> {
        self.rows
            .lock()
            .map_err(|_| StorageError::Unavailable("report sink lock poisoned".to_string()))
    }
}

impl ReportSink for MemoryReportSink {
    fn save(&self, campaign_id: &str, analysis_type: &str, report: &Report) -> StorageResult<()> {
        let mut rows = self.lock()?;
        rows.retain(|r| !(r.campaign_id == campaign_id && r.analysis_type == analysis_type));
        rows.push(AnalyticsRecord {
            campaign_id: campaign_id.to_string(),
            analysis_type: analysis_type.to_string(),
            data: report.clone(),
            stored_at: Utc::now(),
        });
        Ok(())
    }

    fn get(&self, campaign_id: &str, analysis_type: &str) -> StorageResult<Option<Report>> {
        Ok(self
            .lock()?
            .iter()
            .rev()
            .find(|r| r.campaign_id == campaign_id && r.analysis_type == analysis_type)
            .map(|r| r.data.clone()))
    }

    fn count(&self, campaign_id: &str, analysis_type: &str) -> StorageResult<usize> {
        Ok(self
            .lock()?
            .iter()
            .filter(|r| r.campaign_id == campaign_id && r.analysis_type == analysis_type)
            .count())
    }
}
