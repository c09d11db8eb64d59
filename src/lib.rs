//! finreport - scheduled financial reports, exports, and backups
//!
//! This library generates financial exports in six formats (CSV, PDF,
//! XLSX, JSON, QIF, OFX) from an in-memory data bundle, runs them on
//! recurring schedules, and keeps automatic backups of the backing
//! key-value store.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Paths, storage keys, and engine tuning constants
//! - `error`: Custom error types
//! - `models`: Core data models (accounts, transactions, investments, ...)
//! - `export`: Format generation behind a single [`export::ExportGenerator`]
//! - `store`: Key-value persistence plus the template and schedule stores
//! - `schedule`: Next-run math, clocks, and the polling report engine
//! - `backup`: Backup configuration, archives, and the backup scheduler
//! - `notify`: Notification and permission capabilities
//! - `cli`: Command handlers for the `finreport` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use finreport::export::{ExportGenerator, ExportOptions, ExportFormat};
//!
//! let generator = ExportGenerator::new();
//! let output = generator.generate(&bundle, &ExportOptions::full(ExportFormat::Csv), today)?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod notify;
pub mod schedule;
pub mod store;

pub use error::{FinReportError, FinReportResult};
