//! JSON export
//!
//! A lossless pretty-printed dump of the whole bundle. Intentionally does
//! no filtering: this format doubles as the full-state backup payload.

use crate::error::FinReportResult;
use crate::models::ExportBundle;

/// Serialize the bundle with 2-space indentation
pub fn generate(bundle: &ExportBundle) -> FinReportResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(bundle)?)
}
