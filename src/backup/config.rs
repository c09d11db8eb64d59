//! Backup configuration
//!
//! A single persisted record controlling the automatic backup scheduler.
//! Updates are partial merges so callers can flip one knob without
//! knowing the rest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::keys;
use crate::error::FinReportResult;
use crate::schedule::{parse_time_of_day, Frequency};
use crate::store::{load_or_default, save_best_effort, KeyValueStore};

/// How often backups run (a subset of the report frequencies)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl BackupFrequency {
    /// The equivalent report frequency, for next-run math
    pub fn as_frequency(self) -> Frequency {
        match self {
            Self::Daily => Frequency::Daily,
            Self::Weekly => Frequency::Weekly,
            Self::Monthly => Frequency::Monthly,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

impl fmt::Display for BackupFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        write!(f, "{}", s)
    }
}

/// Which payloads each backup run writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupFormat {
    Json,
    Csv,
    /// Both a JSON and a CSV record per run
    All,
}

impl BackupFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

impl fmt::Display for BackupFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::All => "all",
        };
        write!(f, "{}", s)
    }
}

/// The persisted backup configuration singleton
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_frequency")]
    pub frequency: BackupFrequency,
    /// Time of day, `HH:MM`
    #[serde(default = "default_time")]
    pub time: String,
    #[serde(default = "default_format")]
    pub format: BackupFormat,
    #[serde(default)]
    pub encryption_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default)]
    pub include_attachments: bool,
    /// Computed by the scheduler; absent until backups are enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_backup: Option<DateTime<Utc>>,
}

fn default_frequency() -> BackupFrequency {
    BackupFrequency::Weekly
}

fn default_time() -> String {
    "02:00".to_string()
}

fn default_format() -> BackupFormat {
    BackupFormat::Json
}

fn default_retention_days() -> u32 {
    90
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: default_frequency(),
            time: default_time(),
            format: default_format(),
            encryption_enabled: false,
            cloud_provider: None,
            retention_days: default_retention_days(),
            include_attachments: false,
            next_backup: None,
        }
    }
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct BackupConfigPatch {
    pub enabled: Option<bool>,
    pub frequency: Option<BackupFrequency>,
    pub time: Option<String>,
    pub format: Option<BackupFormat>,
    pub encryption_enabled: Option<bool>,
    pub cloud_provider: Option<Option<String>>,
    pub retention_days: Option<u32>,
    pub include_attachments: Option<bool>,
}

/// Load the configuration, falling back to defaults when absent or bad
pub fn load_config(store: &dyn KeyValueStore) -> BackupConfig {
    load_or_default(store, keys::BACKUP_CONFIG)
}

/// Persist the configuration
pub fn save_config(store: &dyn KeyValueStore, config: &BackupConfig) {
    save_best_effort(store, keys::BACKUP_CONFIG, config);
}

/// Merge a patch into the stored configuration and return the result
///
/// A patched `time` is validated before anything is stored; an
/// unparseable value would silently stop the scheduler from ever
/// computing a next-backup instant. Any change clears the computed
/// `next_backup` so the scheduler recomputes it against the new
/// settings on its next tick.
pub fn update_config(
    store: &dyn KeyValueStore,
    patch: BackupConfigPatch,
) -> FinReportResult<BackupConfig> {
    if let Some(time) = &patch.time {
        parse_time_of_day(time)?;
    }

    let mut config = load_config(store);

    if let Some(enabled) = patch.enabled {
        config.enabled = enabled;
    }
    if let Some(frequency) = patch.frequency {
        config.frequency = frequency;
    }
    if let Some(time) = patch.time {
        config.time = time;
    }
    if let Some(format) = patch.format {
        config.format = format;
    }
    if let Some(encryption_enabled) = patch.encryption_enabled {
        config.encryption_enabled = encryption_enabled;
    }
    if let Some(cloud_provider) = patch.cloud_provider {
        config.cloud_provider = cloud_provider;
    }
    if let Some(retention_days) = patch.retention_days {
        config.retention_days = retention_days;
    }
    if let Some(include_attachments) = patch.include_attachments {
        config.include_attachments = include_attachments;
    }
    config.next_backup = None;

    save_config(store, &config);
    Ok(config)
}
