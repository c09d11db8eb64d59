//! Automatic backups: configuration, archives, and scheduling
//!
//! A backup run snapshots all persisted finance data, stores it in the
//! configured formats (optionally sealed), prunes expired records, and
//! records the outcome in a capped history.

pub mod archive;
pub mod config;
pub mod crypto;
pub mod scheduler;

pub use archive::{BackupArchiver, BackupHistoryEntry, BackupRecord};
pub use config::{
    load_config, save_config, update_config, BackupConfig, BackupConfigPatch, BackupFormat,
    BackupFrequency,
};
pub use scheduler::{BackupScheduler, WakeStrategy};

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::FinReportResult;
use crate::notify::{Notification, Notifier};
use crate::schedule::Clock;
use crate::store::KeyValueStore;

/// Runs backups end to end: snapshot, store, sync, prune, notify
pub struct BackupManager {
    store: Arc<dyn KeyValueStore>,
    archiver: BackupArchiver,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl BackupManager {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let archiver = BackupArchiver::new(store.clone(), clock.clone());
        Self {
            store,
            archiver,
            notifier,
            clock,
        }
    }

    /// Direct access to the record store
    pub fn archiver(&self) -> &BackupArchiver {
        &self.archiver
    }

    /// Run one backup with the stored configuration
    ///
    /// Both outcomes land in the history and surface a notification; the
    /// error is still returned so callers can report it.
    pub fn run_backup(&self) -> FinReportResult<Vec<BackupRecord>> {
        let config = config::load_config(self.store.as_ref());
        let result = self.try_run(&config);
        let now = self.clock.now();

        match &result {
            Ok(records) => {
                self.archiver.append_history(BackupHistoryEntry {
                    run_time: now,
                    success: true,
                    records_written: records.len(),
                    error: None,
                });
                self.notify(
                    "Backup complete",
                    format!("{} record(s) written", records.len()),
                );
            }
            Err(e) => {
                self.archiver.append_history(BackupHistoryEntry {
                    run_time: now,
                    success: false,
                    records_written: 0,
                    error: Some(e.to_string()),
                });
                self.notify("Backup failed", e.to_string());
            }
        }

        result
    }

    fn try_run(&self, config: &BackupConfig) -> FinReportResult<Vec<BackupRecord>> {
        let records = self.archiver.create_records(config)?;

        if let Some(provider) = &config.cloud_provider {
            // No provider integration yet; the records stay local with
            // cloud_synced = false.
            info!(provider = %provider, "cloud sync requested but not available");
        }

        self.archiver.prune(config.retention_days);
        Ok(records)
    }

    fn notify(&self, title: &str, body: String) {
        if let Err(e) = self
            .notifier
            .notify(Notification::new(title, body, "backup"))
        {
            warn!(error = %e, "failed to surface backup notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;
    use crate::schedule::FixedClock;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn manager() -> (BackupManager, Arc<MemoryStore>, Arc<MemoryNotifier>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap(),
        ));
        let notifier = Arc::new(MemoryNotifier::new());
        (
            BackupManager::new(store.clone(), clock, notifier.clone()),
            store,
            notifier,
        )
    }

    #[test]
    fn test_run_backup_records_history_and_notifies() {
        let (manager, store, notifier) = manager();
        store
            .set("money_management_accounts", "[]")
            .unwrap();

        let records = manager.run_backup().unwrap();
        assert_eq!(records.len(), 1);

        let history = manager.archiver().history();
        assert_eq!(history.len(), 1);
        assert!(history[0].success);
        assert_eq!(history[0].records_written, 1);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Backup complete");
    }

    #[test]
    fn test_cloud_provider_stub_leaves_records_unsynced() {
        let (manager, store, _) = manager();
        update_config(
            store.as_ref(),
            BackupConfigPatch {
                cloud_provider: Some(Some("drive".to_string())),
                ..Default::default()
            },
        )
        .unwrap();

        let records = manager.run_backup().unwrap();
        assert!(records.iter().all(|r| !r.cloud_synced));
    }
}
