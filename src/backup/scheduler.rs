//! Automatic backup scheduling
//!
//! The scheduler prefers a host periodic-wake capability when the
//! permissions layer grants it; otherwise it falls back to a foreground
//! hourly timer. Either way each tick compares the clock against the
//! configured next-backup instant and runs the manager when it arrives.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, error, info, warn};

use crate::config::BACKUP_POLL_INTERVAL;
use crate::error::FinReportResult;
use crate::notify::{Permission, PermissionState, PermissionsQuery};
use crate::schedule::{calculate_next_run, Clock};
use crate::store::KeyValueStore;

use super::config::{load_config, save_config};
use super::BackupManager;

/// How the scheduler gets woken up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeStrategy {
    /// Host-granted periodic wake; ticks can fire with the app in the
    /// background
    PeriodicWake,
    /// Foreground timer at [`BACKUP_POLL_INTERVAL`]
    ForegroundTimer,
}

/// Drives [`BackupManager`] runs on the configured cadence
pub struct BackupScheduler {
    manager: Arc<BackupManager>,
    store: Arc<dyn KeyValueStore>,
    permissions: Arc<dyn PermissionsQuery>,
    clock: Arc<dyn Clock>,
    worker: Mutex<Option<(Sender<()>, JoinHandle<()>)>>,
}

impl BackupScheduler {
    pub fn new(
        manager: Arc<BackupManager>,
        store: Arc<dyn KeyValueStore>,
        permissions: Arc<dyn PermissionsQuery>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            manager,
            store,
            permissions,
            clock,
            worker: Mutex::new(None),
        }
    }

    /// The wake strategy the scheduler will use, per current permissions
    pub fn strategy(&self) -> WakeStrategy {
        match self.permissions.query(Permission::PeriodicWake) {
            PermissionState::Granted => WakeStrategy::PeriodicWake,
            PermissionState::Denied | PermissionState::Unsupported => {
                WakeStrategy::ForegroundTimer
            }
        }
    }

    /// One scheduling tick
    ///
    /// Computes and persists `next_backup` when missing, runs the backup
    /// when it has arrived, and otherwise does nothing. Run failures are
    /// already recorded by the manager and never escape the tick.
    pub fn tick(&self) {
        let mut config = load_config(self.store.as_ref());
        if !config.enabled {
            return;
        }

        let now = self.clock.now();
        let due = match config.next_backup {
            Some(next) => next <= now,
            None => {
                // Freshly enabled or reconfigured: anchor the first run
                match self.next_backup_after(now, &config.frequency, &config.time) {
                    Some(next) => {
                        config.next_backup = Some(next);
                        save_config(self.store.as_ref(), &config);
                        debug!(next = %next, "first backup scheduled");
                    }
                    None => return,
                }
                false
            }
        };
        if !due {
            return;
        }

        if let Err(e) = self.manager.run_backup() {
            error!(error = %e, "automatic backup failed");
        }

        if let Some(next) = self.next_backup_after(now, &config.frequency, &config.time) {
            config.next_backup = Some(next);
            save_config(self.store.as_ref(), &config);
        }
    }

    fn next_backup_after(
        &self,
        now: chrono::DateTime<chrono::Utc>,
        frequency: &super::BackupFrequency,
        time: &str,
    ) -> Option<chrono::DateTime<chrono::Utc>> {
        match calculate_next_run(now, frequency.as_frequency(), time, None, None) {
            Ok(next) => Some(next),
            Err(e) => {
                warn!(error = %e, "cannot schedule backups with this configuration");
                None
            }
        }
    }

    /// Start ticking; idempotent
    pub fn start(&self) {
        let mut worker = self.worker.lock().unwrap();
        if worker.is_some() {
            debug!("backup scheduler already running");
            return;
        }

        let strategy = self.strategy();
        info!(?strategy, "backup scheduler started");

        let (stop_tx, stop_rx) = mpsc::channel();
        let manager = Arc::clone(&self.manager);
        let store = Arc::clone(&self.store);
        let permissions = Arc::clone(&self.permissions);
        let clock = Arc::clone(&self.clock);
        let handle = std::thread::spawn(move || {
            let scheduler = BackupScheduler::new(manager, store, permissions, clock);
            scheduler.tick();
            loop {
                match stop_rx.recv_timeout(BACKUP_POLL_INTERVAL) {
                    Err(RecvTimeoutError::Timeout) => scheduler.tick(),
                    _ => break,
                }
            }
        });

        *worker = Some((stop_tx, handle));
    }

    /// Stop ticking; safe to call repeatedly
    pub fn shutdown(&self) {
        let taken = self.worker.lock().unwrap().take();
        if let Some((stop_tx, handle)) = taken {
            let _ = stop_tx.send(());
            let _ = handle.join();
            info!("backup scheduler stopped");
        }
    }

    /// Run a backup immediately, outside the schedule
    pub fn run_now(&self) -> FinReportResult<()> {
        self.manager.run_backup().map(|_| ())
    }
}

impl Drop for BackupScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
