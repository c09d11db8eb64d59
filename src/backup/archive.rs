//! Backup snapshots and record storage
//!
//! A backup run snapshots every known entity key into one JSON document,
//! renders it in the configured formats, optionally seals it, and stores
//! the result as [`BackupRecord`]s next to the data it protects. Records
//! past the retention window are pruned on every run.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{keys, MAX_BACKUP_HISTORY};
use crate::error::{FinReportError, FinReportResult};
use crate::export::{ExportFormat, ExportGenerator, ExportOptions};
use crate::schedule::{Clock, DataSource, StoreDataSource};
use crate::store::{load_or_default, save_best_effort, KeyValueStore};

use super::config::{BackupConfig, BackupFormat};
use super::crypto::seal_ephemeral;

/// One stored backup payload plus its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: String,
    pub filename: String,
    pub format: ExportFormat,
    /// Base64 payload; when `encrypted`, the payload is a sealed blob
    pub data: String,
    pub encrypted: bool,
    pub timestamp: DateTime<Utc>,
    pub cloud_synced: bool,
}

impl BackupRecord {
    /// Decoded payload size in bytes
    pub fn size(&self) -> usize {
        // 3 bytes per 4 base64 chars, ignoring padding slack
        self.data.len() / 4 * 3
    }
}

/// One line of the backup run history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupHistoryEntry {
    pub run_time: DateTime<Utc>,
    pub success: bool,
    pub records_written: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Creates, lists, and prunes backup records
pub struct BackupArchiver {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    generator: ExportGenerator,
}

impl BackupArchiver {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            generator: ExportGenerator::new(),
        }
    }

    /// Snapshot every known entity key into one JSON object
    ///
    /// Missing keys are omitted; unparseable values are skipped with a
    /// warning rather than poisoning the whole backup.
    pub fn snapshot(&self) -> Map<String, Value> {
        let mut snapshot = Map::new();
        for &key in keys::BACKUP_DATA_KEYS {
            match self.store.get(key) {
                Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                    Ok(value) => {
                        snapshot.insert(key.to_string(), value);
                    }
                    Err(e) => warn!(key, error = %e, "skipping unparseable value in backup"),
                },
                Ok(None) => {}
                Err(e) => warn!(key, error = %e, "skipping unreadable key in backup"),
            }
        }
        snapshot
    }

    /// Render and store the records for one backup run
    pub fn create_records(&self, config: &BackupConfig) -> FinReportResult<Vec<BackupRecord>> {
        let now = self.clock.now();
        let formats: &[ExportFormat] = match config.format {
            BackupFormat::Json => &[ExportFormat::Json],
            BackupFormat::Csv => &[ExportFormat::Csv],
            BackupFormat::All => &[ExportFormat::Json, ExportFormat::Csv],
        };

        let mut created = Vec::with_capacity(formats.len());
        for &format in formats {
            let payload = self.render_payload(format, now)?;
            let payload = if config.encryption_enabled {
                let sealed = seal_ephemeral(&payload)?;
                serde_json::to_vec(&sealed)?
            } else {
                payload
            };

            created.push(BackupRecord {
                id: Uuid::new_v4().to_string(),
                filename: format!(
                    "finreport-backup-{}.{}",
                    now.format("%Y%m%d-%H%M%S"),
                    format.extension()
                ),
                format,
                data: STANDARD.encode(&payload),
                encrypted: config.encryption_enabled,
                timestamp: now,
                cloud_synced: false,
            });
        }

        let mut records = self.list_records();
        records.extend(created.iter().cloned());
        self.persist_records(&records);
        debug!(count = created.len(), "backup records written");
        Ok(created)
    }

    fn render_payload(&self, format: ExportFormat, now: DateTime<Utc>) -> FinReportResult<Vec<u8>> {
        match format {
            ExportFormat::Json => {
                let snapshot = self.snapshot();
                Ok(serde_json::to_vec_pretty(&Value::Object(snapshot))?)
            }
            ExportFormat::Csv => {
                let bundle = StoreDataSource::new(self.store.clone()).collect()?;
                let output = self.generator.generate(
                    &bundle,
                    &ExportOptions::full(ExportFormat::Csv),
                    now.date_naive(),
                )?;
                Ok(output.payload)
            }
            other => Err(FinReportError::Validation(format!(
                "Unsupported backup format: {}",
                other
            ))),
        }
    }

    /// All stored records, oldest first
    pub fn list_records(&self) -> Vec<BackupRecord> {
        load_or_default(self.store.as_ref(), keys::BACKUP_RECORDS)
    }

    /// Look up one record
    pub fn get_record(&self, id: &str) -> Option<BackupRecord> {
        self.list_records().into_iter().find(|r| r.id == id)
    }

    /// Delete a record; returns whether anything was removed
    pub fn delete_record(&self, id: &str) -> bool {
        let mut records = self.list_records();
        let before = records.len();
        records.retain(|r| r.id != id);
        let removed = records.len() != before;
        if removed {
            self.persist_records(&records);
        }
        removed
    }

    /// Drop records older than the retention window; returns how many went
    pub fn prune(&self, retention_days: u32) -> usize {
        let cutoff = self.clock.now() - Duration::days(i64::from(retention_days));
        let mut records = self.list_records();
        let before = records.len();
        records.retain(|r| r.timestamp >= cutoff);
        let pruned = before - records.len();
        if pruned > 0 {
            self.persist_records(&records);
            debug!(pruned, "pruned expired backup records");
        }
        pruned
    }

    fn persist_records(&self, records: &[BackupRecord]) {
        save_best_effort(self.store.as_ref(), keys::BACKUP_RECORDS, &records);
    }

    /// Append to the run history, dropping the oldest entries past the cap
    pub fn append_history(&self, entry: BackupHistoryEntry) {
        let mut history: Vec<BackupHistoryEntry> =
            load_or_default(self.store.as_ref(), keys::BACKUP_HISTORY);
        history.push(entry);
        if history.len() > MAX_BACKUP_HISTORY {
            let excess = history.len() - MAX_BACKUP_HISTORY;
            history.drain(..excess);
        }
        save_best_effort(self.store.as_ref(), keys::BACKUP_HISTORY, &history);
    }

    /// Run history, oldest first
    pub fn history(&self) -> Vec<BackupHistoryEntry> {
        load_or_default(self.store.as_ref(), keys::BACKUP_HISTORY)
    }
}
