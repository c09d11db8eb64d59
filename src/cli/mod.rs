//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the
//! clap argument parsing with the stores and engines.

pub mod backup;
pub mod export;
pub mod history;
pub mod schedule;
pub mod template;

pub use backup::{handle_backup_command, BackupCommands};
pub use export::{handle_export_command, ExportArgs};
pub use history::{handle_history_command, HistoryArgs};
pub use schedule::{handle_schedule_command, ScheduleCommands};
pub use template::{handle_template_command, TemplateCommands};

use std::sync::Arc;

use crate::config::FinReportPaths;
use crate::notify::Notifier;
use crate::schedule::Clock;
use crate::store::{IdGenerator, KeyValueStore};

/// Shared dependencies handed to every command handler
pub struct CliContext {
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    pub notifier: Arc<dyn Notifier>,
    pub paths: FinReportPaths,
}
