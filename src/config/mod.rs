//! Configuration module for finreport
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Storage key constants (stable wire contract with the backing store)
//! - Engine tuning constants

pub mod keys;
pub mod paths;

pub use paths::FinReportPaths;

use std::time::Duration;

/// Period of the report engine polling loop
pub const REPORT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Period of the backup scheduler's foreground fallback timer
pub const BACKUP_POLL_INTERVAL: Duration = Duration::from_secs(3600);

/// Maximum retained report history entries (oldest dropped first)
pub const MAX_REPORT_HISTORY: usize = 50;

/// Maximum retained backup history entries (oldest dropped first)
pub const MAX_BACKUP_HISTORY: usize = 50;
