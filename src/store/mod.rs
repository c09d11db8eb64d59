//! Storage layer for finreport
//!
//! Persistence goes through the narrow [`KeyValueStore`] capability so the
//! template/schedule stores are testable without a real backing store. Three
//! implementations are provided:
//!
//! - [`FileStore`]: one JSON file per key with atomic writes
//! - [`MemoryStore`]: in-process map, used by tests and embedding hosts
//! - [`NullStore`]: the degrade-gracefully fallback when no persistent
//!   store is available — reads return empty, writes are silently dropped
//!
//! Read failures are a policy matter for callers: the typed helpers here
//! log and fall back to defaults, since persistence is best-effort.

pub mod schedules;
pub mod templates;

pub use schedules::{
    Delivery, NewSchedule, ReportHistoryEntry, SchedulePatch, ScheduleStore, ScheduledReport,
};
pub use templates::{ExportTemplate, TemplatePatch, TemplateStore};

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::{FinReportError, FinReportResult};

/// Narrow persistence capability: string keys to string values
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> FinReportResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> FinReportResult<()>;
    fn remove(&self, key: &str) -> FinReportResult<()>;
}

/// Read a JSON value under `key`, falling back to the default on any failure
///
/// Missing keys, unreadable stores, and parse failures all degrade to the
/// default; parse/store failures are logged.
pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "discarding unparseable stored value");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "storage read failed");
            T::default()
        }
    }
}

/// Write a JSON value under `key`, logging instead of propagating failure
pub fn save_best_effort<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(key, error = %e, "failed to serialize value for storage");
            return;
        }
    };
    if let Err(e) = store.set(key, &raw) {
        warn!(key, error = %e, "storage write failed");
    }
}

/// File-backed store: one `<key>.json` file per key, written atomically
///
/// Mirrors the write-temp-then-rename discipline of the data files so a
/// crash mid-write never corrupts a key.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: PathBuf) -> FinReportResult<Self> {
        fs::create_dir_all(&dir)
            .map_err(|e| FinReportError::Storage(format!("Failed to create store dir: {}", e)))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> FinReportResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| FinReportError::Storage(format!("Failed to read {}: {}", path.display(), e)))
    }

    fn set(&self, key: &str, value: &str) -> FinReportResult<()> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");

        let mut file = File::create(&temp_path)
            .map_err(|e| FinReportError::Storage(format!("Failed to create temp file: {}", e)))?;
        file.write_all(value.as_bytes())
            .map_err(|e| FinReportError::Storage(format!("Failed to write data: {}", e)))?;
        file.sync_all()
            .map_err(|e| FinReportError::Storage(format!("Failed to sync data: {}", e)))?;

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            FinReportError::Storage(format!("Failed to rename temp file: {}", e))
        })
    }

    fn remove(&self, key: &str) -> FinReportResult<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                FinReportError::Storage(format!("Failed to remove {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }
}

/// In-memory store backed by a mutex-guarded map
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> FinReportResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> FinReportResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> FinReportResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// No-op store for hosts without any persistence
///
/// Reads return empty and writes are dropped, so stores built on top keep
/// working as pure in-memory components.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl KeyValueStore for NullStore {
    fn get(&self, _key: &str) -> FinReportResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> FinReportResult<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> FinReportResult<()> {
        Ok(())
    }
}

/// Injectable id generator for templates and schedules
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Default generator: millisecond timestamp, de-duplicated within a process
pub struct TimestampIds {
    last: Mutex<(i64, u32)>,
}

impl TimestampIds {
    pub fn new() -> Self {
        Self {
            last: Mutex::new((0, 0)),
        }
    }
}

impl Default for TimestampIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for TimestampIds {
    fn next_id(&self) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let mut last = self.last.lock().unwrap();
        if last.0 == millis {
            last.1 += 1;
            format!("{}-{}", millis, last.1)
        } else {
            *last = (millis, 0);
            millis.to_string()
        }
    }
}

/// Deterministic sequence generator for tests
#[derive(Default)]
pub struct SequenceIds {
    next: AtomicU64,
}

impl SequenceIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequenceIds {
    fn next_id(&self) -> String {
        format!("id-{}", self.next.fetch_add(1, Ordering::Relaxed))
    }
}
