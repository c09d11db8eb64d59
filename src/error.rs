//! Custom error types for finreport
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for finreport operations
#[derive(Error, Debug)]
pub enum FinReportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors (e.g. missing data required by a format)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Key-value storage errors (best-effort: callers log and continue)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Format-specific serialization failures
    #[error("Generation error: {0}")]
    Generation(String),

    /// A host capability (periodic wake, notifications) refused permission
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Encryption errors
    #[error("Encryption error: {0}")]
    Encryption(String),
}

impl FinReportError {
    /// Create a "not found" error for export templates
    pub fn template_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Template",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for scheduled reports
    pub fn schedule_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Schedule",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for FinReportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FinReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for FinReportError {
    fn from(err: csv::Error) -> Self {
        Self::Generation(err.to_string())
    }
}

/// Result type alias for finreport operations
pub type FinReportResult<T> = Result<T, FinReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FinReportError::Validation("missing accounts".into());
        assert_eq!(err.to_string(), "Validation error: missing accounts");
        assert!(err.is_validation());
    }

    #[test]
    fn test_not_found_error() {
        let err = FinReportError::template_not_found("monthly-summary");
        assert_eq!(err.to_string(), "Template not found: monthly-summary");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FinReportError = io_err.into();
        assert!(matches!(err, FinReportError::Io(_)));
    }
}
