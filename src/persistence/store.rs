//! RocksDB report store
//!
//! Rows live in the `campaign_analytics` column family under
//! `{campaign}:{analysis_type}:{stored_at}` keys, JSON encoded.

use super::{AnalyticsRecord, ReportSink, StorageError, StorageResult};
use crate::report::Report;
use chrono::Utc;
use rocksdb::{ColumnFamilyDescriptor, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const ANALYTICS_CF: &str = "campaign_analytics";

/// RocksDB-backed [`ReportSink`]
pub struct ReportStore {
    db: Arc<DB>,
}

impl ReportStore {
    /// Open or create a store
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        info!("Opening report store at: {}", path.display());

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_wal_recovery_mode(rocksdb::DBRecoveryMode::PointInTime);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new(ANALYTICS_CF, Self::analytics_cf_options()),
        ];
        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Reports are written once and read rarely; favour size
    fn analytics_cf_options() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    fn prefix(campaign_id: &str, analysis_type: &str) -> String {
        format!("{}:{}:", campaign_id, analysis_type)
    }

    /// Key suffix sorts chronologically
    fn key(campaign_id: &str, analysis_type: &str, stored_at_nanos: i64) -> Vec<u8> {
        format!("{}{:020}", Self::prefix(campaign_id, analysis_type), stored_at_nanos).into_bytes()
    }

    /// All rows for the pair, oldest first.
    ///
    /// Campaign ids may contain ':', so a key prefix can also match another
    /// campaign's rows (`a` + `x:y` vs `a:x` + `y`); the decoded record decides.
    fn scan(&self, campaign_id: &str, analysis_type: &str) -> StorageResult<Vec<(Box<[u8]>, AnalyticsRecord)>> {
        let cf = self
            .db
            .cf_handle(ANALYTICS_CF)
            .ok_or_else(|| StorageError::ColumnFamily(ANALYTICS_CF.to_string()))?;

        let prefix = Self::prefix(campaign_id, analysis_type);
        let mut rows = Vec::new();
        for item in self.db.prefix_iterator_cf(&cf, prefix.as_bytes()) {
            let (key, value) = item?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            let record: AnalyticsRecord = serde_json::from_slice(&value)?;
            if record.campaign_id != campaign_id || record.analysis_type != analysis_type {
                continue;
            }
            rows.push((key, record));
        }
        Ok(rows)
    }

    /// Flush all data to disk
    pub fn flush(&self) -> StorageResult<()> {
        self.db.flush()?;
        debug!("Flushed report store to disk");
        Ok(())
    }
}

impl ReportSink for ReportStore {
    fn save(&self, campaign_id: &str, analysis_type: &str, report: &Report) -> StorageResult<()> {
        let existing = self.scan(campaign_id, analysis_type)?;
        let cf = self
            .db
            .cf_handle(ANALYTICS_CF)
            .ok_or_else(|| StorageError::ColumnFamily(ANALYTICS_CF.to_string()))?;

        let stored_at = Utc::now();
        let record = AnalyticsRecord {
            campaign_id: campaign_id.to_string(),
            analysis_type: analysis_type.to_string(),
            data: report.clone(),
            stored_at,
        };
        let value = serde_json::to_vec(&record)?;
        let nanos = stored_at.timestamp_nanos_opt().unwrap_or_else(|| stored_at.timestamp_micros() * 1000);

        let mut batch = WriteBatch::default();
        for (key, _) in &existing {
            batch.delete_cf(&cf, key);
        }
        batch.put_cf(&cf, Self::key(campaign_id, analysis_type, nanos), value);
        self.db.write(batch)?;

        info!(
            "Saved {} results for campaign {} (replaced {} rows)",
            analysis_type,
            campaign_id,
            existing.len()
        );
        Ok(())
    }

    fn get(&self, campaign_id: &str, analysis_type: &str) -> StorageResult<Option<Report>> {
        Ok(self
            .scan(campaign_id, analysis_type)?
            .pop()
            .map(|(_, record)| record.data))
    }

    fn count(&self, campaign_id: &str, analysis_type: &str) -> StorageResult<usize> {
        Ok(self.scan(campaign_id, analysis_type)?.len())
    }
}
