//! Scheduled report engine
//!
//! Polls the schedule store on a fixed interval and runs whatever has come
//! due: collect data, generate the export, deliver it, then advance the
//! schedule and record history. Failures are isolated per schedule and
//! never escape a polling tick.

use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, error, info};

use crate::config::{keys, REPORT_POLL_INTERVAL};
use crate::error::{FinReportError, FinReportResult};
use crate::export::{ExportFormat, ExportGenerator, ExportOutput};
use crate::models::ExportBundle;
use crate::notify::{Notification, Notifier};
use crate::store::{load_or_default, Delivery, KeyValueStore, ScheduleStore, ScheduledReport};

use super::Clock;

/// Where a run gets its financial data from
pub trait DataSource: Send + Sync {
    fn collect(&self) -> FinReportResult<ExportBundle>;
}

/// Data source reading the host's persisted entity keys
pub struct StoreDataSource {
    store: Arc<dyn KeyValueStore>,
}

impl StoreDataSource {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl DataSource for StoreDataSource {
    fn collect(&self) -> FinReportResult<ExportBundle> {
        let store = self.store.as_ref();
        Ok(ExportBundle {
            accounts: load_or_default(store, keys::ACCOUNTS),
            transactions: load_or_default(store, keys::TRANSACTIONS),
            investments: load_or_default(store, keys::INVESTMENTS),
            budgets: load_or_default(store, keys::BUDGETS),
            goals: load_or_default(store, keys::GOALS),
        })
    }
}

/// Fixed data source for tests and one-shot CLI exports
pub struct StaticDataSource {
    bundle: ExportBundle,
}

impl StaticDataSource {
    pub fn new(bundle: ExportBundle) -> Self {
        Self { bundle }
    }
}

impl DataSource for StaticDataSource {
    fn collect(&self) -> FinReportResult<ExportBundle> {
        Ok(self.bundle.clone())
    }
}

/// Where finished file-delivery reports go (the "download" analog)
pub trait ReportSink: Send + Sync {
    fn deliver(&self, output: &ExportOutput) -> FinReportResult<()>;
}

/// Sink writing each report into a directory
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl ReportSink for DirectorySink {
    fn deliver(&self, output: &ExportOutput) -> FinReportResult<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| FinReportError::Io(format!("Failed to create report dir: {}", e)))?;
        let path = self.dir.join(&output.filename);
        std::fs::write(&path, &output.payload)
            .map_err(|e| FinReportError::Io(format!("Failed to write report: {}", e)))?;
        info!(path = %path.display(), "report written");
        Ok(())
    }
}

/// Sink recording outputs in memory, for assertions in tests
#[derive(Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<ExportOutput>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<ExportOutput> {
        self.delivered.lock().unwrap().clone()
    }
}

impl ReportSink for MemorySink {
    fn deliver(&self, output: &ExportOutput) -> FinReportResult<()> {
        self.delivered.lock().unwrap().push(output.clone());
        Ok(())
    }
}

struct EngineInner {
    schedules: ScheduleStore,
    generator: ExportGenerator,
    data: Arc<dyn DataSource>,
    sink: Arc<dyn ReportSink>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

/// The polling engine
///
/// Holds no durable state of its own beyond the worker-thread handle; all
/// schedule state lives in the [`ScheduleStore`].
pub struct ReportEngine {
    inner: Arc<EngineInner>,
    worker: Mutex<Option<(Sender<()>, JoinHandle<()>)>>,
}

impl ReportEngine {
    pub fn new(
        schedules: ScheduleStore,
        generator: ExportGenerator,
        data: Arc<dyn DataSource>,
        sink: Arc<dyn ReportSink>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                schedules,
                generator,
                data,
                sink,
                notifier,
                clock,
            }),
            worker: Mutex::new(None),
        }
    }

    /// Run one polling tick: every due schedule, sequentially
    ///
    /// Errors are isolated per schedule — one failing report is recorded
    /// as failure history and the next one still runs.
    pub fn poll_once(&self) {
        self.inner.poll_once();
    }

    /// Start the polling thread (60-second period, immediate first check)
    ///
    /// Idempotent: a second call while running is a no-op.
    pub fn start(&self) {
        let mut worker = self.worker.lock().unwrap();
        if worker.is_some() {
            debug!("report engine already running");
            return;
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let handle = std::thread::spawn(move || {
            inner.poll_once();
            loop {
                match stop_rx.recv_timeout(REPORT_POLL_INTERVAL) {
                    Err(RecvTimeoutError::Timeout) => inner.poll_once(),
                    _ => break,
                }
            }
        });

        *worker = Some((stop_tx, handle));
        info!("report engine started");
    }

    /// Stop the polling thread; safe to call repeatedly
    pub fn shutdown(&self) {
        let taken = self.worker.lock().unwrap().take();
        if let Some((stop_tx, handle)) = taken {
            let _ = stop_tx.send(());
            let _ = handle.join();
            info!("report engine stopped");
        }
    }
}

impl Drop for ReportEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl EngineInner {
    fn poll_once(&self) {
        let now = self.clock.now();
        let due = self.schedules.due_schedules(now);
        if due.is_empty() {
            return;
        }

        debug!(count = due.len(), "running due schedules");
        for schedule in due {
            let outcome = self.run_schedule(&schedule);
            let record = match outcome {
                Ok(format) => self
                    .schedules
                    .mark_run(&schedule.id, true, Some(format), None),
                Err(e) => {
                    error!(schedule = %schedule.name, error = %e, "scheduled report failed");
                    self.schedules
                        .mark_run(&schedule.id, false, None, Some(e.to_string()))
                }
            };
            // A mark_run failure means the time string went bad mid-flight;
            // log it and keep the loop going.
            if let Err(e) = record {
                error!(schedule = %schedule.name, error = %e, "failed to record run outcome");
            }
        }
    }

    fn run_schedule(&self, schedule: &ScheduledReport) -> FinReportResult<ExportFormat> {
        let bundle = self.data.collect()?;
        let today = self.clock.now().date_naive();
        let output = self.generator.generate(&bundle, &schedule.options, today)?;

        match &schedule.delivery {
            Delivery::Email { address } => {
                // Mail transmission is out of scope; surface a local
                // notification instead.
                self.notifier.notify(Notification::new(
                    "Report ready",
                    format!("{} ({}) for {}", schedule.name, output.filename, address),
                    "scheduled-report",
                ))?;
            }
            Delivery::File => {
                self.sink.deliver(&output)?;
            }
        }

        Ok(schedule.options.format)
    }
}
