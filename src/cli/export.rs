//! CLI command for one-shot exports
//!
//! Reads a JSON bundle from disk and writes it back out in any supported
//! format.

use clap::{Args, ValueEnum};
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};

use crate::error::{FinReportError, FinReportResult};
use crate::export::{ExportFormat, ExportGenerator, ExportOptions, GroupBy};
use crate::models::ExportBundle;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Comma-separated transactions (or grouped summary rows)
    Csv,
    /// Formatted report document
    Pdf,
    /// Multi-sheet workbook
    Xlsx,
    /// Full bundle dump, lossless
    Json,
    /// Quicken interchange format
    Qif,
    /// Open financial exchange statement
    Ofx,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => Self::Csv,
            FormatArg::Pdf => Self::Pdf,
            FormatArg::Xlsx => Self::Xlsx,
            FormatArg::Json => Self::Json,
            FormatArg::Qif => Self::Qif,
            FormatArg::Ofx => Self::Ofx,
        }
    }
}

/// CSV grouping options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GroupByArg {
    Category,
    Account,
    Month,
}

impl From<GroupByArg> for GroupBy {
    fn from(arg: GroupByArg) -> Self {
        match arg {
            GroupByArg::Category => Self::Category,
            GroupByArg::Account => Self::Account,
            GroupByArg::Month => Self::Month,
        }
    }
}

/// Arguments for the `export` command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to a JSON bundle file (accounts, transactions, ...)
    pub input: PathBuf,

    /// Export format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: FormatArg,

    /// Output file path (defaults to a generated name in the current dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export only the transaction slice
    #[arg(long)]
    pub transactions_only: bool,

    /// Group CSV rows instead of listing transactions
    #[arg(long, value_enum)]
    pub group_by: Option<GroupByArg>,

    /// Only include transactions on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Only include transactions on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Custom report title (also names the output file)
    #[arg(long)]
    pub title: Option<String>,
}

/// Handle the export command
pub fn handle_export_command(args: ExportArgs) -> FinReportResult<()> {
    let raw = std::fs::read_to_string(&args.input)
        .map_err(|e| FinReportError::Io(format!("Failed to read {}: {}", args.input.display(), e)))?;
    let bundle: ExportBundle = serde_json::from_str(&raw)?;

    let format = ExportFormat::from(args.format);
    let mut options = if args.transactions_only {
        ExportOptions::transactions_only(format)
    } else {
        ExportOptions::full(format)
    };
    options.start_date = args.start;
    options.end_date = args.end;
    options.custom_title = args.title;
    if let Some(group_by) = args.group_by {
        options.group_by = group_by.into();
    }

    let generator = ExportGenerator::new();
    let output = generator.generate(&bundle, &options, Utc::now().date_naive())?;

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&output.filename));
    std::fs::write(&path, &output.payload)
        .map_err(|e| FinReportError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

    println!(
        "Exported {} bytes to {} ({})",
        output.payload.len(),
        path.display(),
        output.mime
    );
    Ok(())
}
