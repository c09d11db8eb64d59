//! Export format generation
//!
//! Turns an in-memory [`ExportBundle`] into an output payload plus a
//! suggested filename and MIME type, for each supported format. Generation
//! is pure apart from document building, which goes through an injected
//! [`DocumentEngine`] constructed lazily at most once per generator.

pub mod csv;
pub mod document;
pub mod json;
pub mod ofx;
pub mod qif;
pub mod workbook;

pub use document::{DocumentBuilder, DocumentEngine, PlainDocumentEngine};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::error::FinReportResult;
use crate::models::ExportBundle;

/// Target export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
    Xlsx,
    Json,
    Qif,
    Ofx,
}

impl ExportFormat {
    /// File extension (without the dot)
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
            Self::Json => "json",
            Self::Qif => "qif",
            Self::Ofx => "ofx",
        }
    }

    /// MIME type for download/transfer
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Pdf => "application/pdf",
            Self::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Json => "application/json",
            Self::Qif => "application/x-qif",
            Self::Ofx => "application/x-ofx",
        }
    }

    /// Default filename stem for the format
    fn slug(&self) -> &'static str {
        match self {
            Self::Csv => "transactions",
            Self::Pdf => "financial-report",
            Self::Xlsx => "financial-workbook",
            Self::Json => "finance-backup",
            Self::Qif => "transactions",
            Self::Ofx => "transactions",
        }
    }

    /// Parse a format from its lowercase name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "pdf" => Some(Self::Pdf),
            "xlsx" => Some(Self::Xlsx),
            "json" => Some(Self::Json),
            "qif" => Some(Self::Qif),
            "ofx" => Some(Self::Ofx),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Row grouping for CSV export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Category,
    Account,
    Month,
    #[default]
    None,
}

/// Options for a single export call
///
/// Immutable per call; embedded inside templates and schedules, never
/// persisted standalone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub format: ExportFormat,
    #[serde(default)]
    pub include_transactions: bool,
    #[serde(default)]
    pub include_accounts: bool,
    #[serde(default)]
    pub include_investments: bool,
    #[serde(default)]
    pub include_budgets: bool,
    #[serde(default)]
    pub include_charts: bool,
    #[serde(default)]
    pub group_by: GroupBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl ExportOptions {
    /// Options for a format with every data slice included
    pub fn full(format: ExportFormat) -> Self {
        Self {
            start_date: None,
            end_date: None,
            format,
            include_transactions: true,
            include_accounts: true,
            include_investments: true,
            include_budgets: true,
            include_charts: false,
            group_by: GroupBy::None,
            custom_title: None,
            logo_url: None,
        }
    }

    /// Options for a format with only transactions included
    pub fn transactions_only(format: ExportFormat) -> Self {
        Self {
            include_accounts: false,
            include_investments: false,
            include_budgets: false,
            ..Self::full(format)
        }
    }
}

/// A generated export: payload bytes plus download metadata
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub payload: Vec<u8>,
    pub filename: String,
    pub mime: &'static str,
}

impl ExportOutput {
    /// Payload as UTF-8 (all current formats are text)
    pub fn payload_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Suggested filename: slugged custom title, or `<slug>-<ISO date>.<ext>`
pub fn suggested_filename(options: &ExportOptions, today: NaiveDate) -> String {
    let ext = options.format.extension();
    match &options.custom_title {
        Some(title) => {
            let slug: String = title
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect();
            if slug.is_empty() {
                format!("{}-{}.{}", options.format.slug(), today, ext)
            } else {
                format!("{}.{}", slug, ext)
            }
        }
        None => format!("{}-{}.{}", options.format.slug(), today, ext),
    }
}

/// Export format generator
///
/// Holds the document-engine factory; everything else is stateless.
pub struct ExportGenerator {
    document_factory: Box<dyn Fn() -> Box<dyn DocumentEngine> + Send + Sync>,
    document_engine: OnceLock<Box<dyn DocumentEngine>>,
}

impl ExportGenerator {
    /// Generator with the built-in plain-text document engine
    pub fn new() -> Self {
        Self::with_document_factory(|| Box::new(PlainDocumentEngine))
    }

    /// Generator with a custom document engine, built lazily on first
    /// PDF-style export and reused for the generator's lifetime
    pub fn with_document_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn DocumentEngine> + Send + Sync + 'static,
    {
        Self {
            document_factory: Box::new(factory),
            document_engine: OnceLock::new(),
        }
    }

    fn document_engine(&self) -> &dyn DocumentEngine {
        self.document_engine
            .get_or_init(|| (self.document_factory)())
            .as_ref()
    }

    /// Generate an export for `options.format`
    ///
    /// `today` anchors default filenames and OFX server timestamps so
    /// output is deterministic under test.
    pub fn generate(
        &self,
        bundle: &ExportBundle,
        options: &ExportOptions,
        today: NaiveDate,
    ) -> FinReportResult<ExportOutput> {
        let payload = match options.format {
            ExportFormat::Csv => csv::generate(bundle, options)?,
            ExportFormat::Pdf => document::generate(self.document_engine(), bundle, options)?,
            ExportFormat::Xlsx => workbook::generate(bundle, options)?,
            ExportFormat::Json => json::generate(bundle)?,
            ExportFormat::Qif => qif::generate(bundle, options)?,
            ExportFormat::Ofx => ofx::generate(bundle, options, today)?,
        };

        Ok(ExportOutput {
            payload,
            filename: suggested_filename(options, today),
            mime: options.format.mime(),
        })
    }
}

impl Default for ExportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    #[test]
    fn test_suggested_filename_default() {
        let options = ExportOptions::full(ExportFormat::Qif);
        assert_eq!(suggested_filename(&options, today()), "transactions-2024-05-20.qif");
    }

    #[test]
    fn test_suggested_filename_custom_title_stripped() {
        let mut options = ExportOptions::full(ExportFormat::Pdf);
        options.custom_title = Some("Q2 Report: May & June!".to_string());
        assert_eq!(suggested_filename(&options, today()), "Q2ReportMayJune.pdf");
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ExportFormat::Csv.mime(), "text/csv");
        assert_eq!(ExportFormat::Qif.mime(), "application/x-qif");
        assert_eq!(ExportFormat::Ofx.mime(), "application/x-ofx");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("QIF"), Some(ExportFormat::Qif));
        assert_eq!(ExportFormat::parse("bogus"), None);
    }

    #[test]
    fn test_generate_json_smoke() {
        let generator = ExportGenerator::new();
        let output = generator
            .generate(
                &ExportBundle::default(),
                &ExportOptions::full(ExportFormat::Json),
                today(),
            )
            .unwrap();
        assert_eq!(output.mime, "application/json");
        assert!(output.filename.ends_with(".json"));
    }
}
