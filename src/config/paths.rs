//! Path management for finreport
//!
//! Provides XDG-compliant path resolution for the key-value store directory
//! and exported report output.
//!
//! ## Path Resolution Order
//!
//! 1. `FINREPORT_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/finreport` or `~/.config/finreport`
//! 3. Windows: `%APPDATA%\finreport`

use std::path::PathBuf;

use crate::error::FinReportError;

/// Manages all paths used by finreport
#[derive(Debug, Clone)]
pub struct FinReportPaths {
    /// Base directory for all finreport data
    base_dir: PathBuf,
}

impl FinReportPaths {
    /// Create a new FinReportPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, FinReportError> {
        let base_dir = if let Ok(custom) = std::env::var("FINREPORT_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create FinReportPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/finreport/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the key-value store directory (~/.config/finreport/store/)
    pub fn store_dir(&self) -> PathBuf {
        self.base_dir.join("store")
    }

    /// Get the directory generated reports are written into
    pub fn reports_dir(&self) -> PathBuf {
        self.base_dir.join("reports")
    }

    /// Create all required directories if they don't exist
    pub fn ensure_directories(&self) -> Result<(), FinReportError> {
        std::fs::create_dir_all(self.store_dir())
            .map_err(|e| FinReportError::Io(format!("Failed to create store dir: {}", e)))?;
        std::fs::create_dir_all(self.reports_dir())
            .map_err(|e| FinReportError::Io(format!("Failed to create reports dir: {}", e)))?;
        Ok(())
    }
}

/// Resolve the default base directory for the current platform
fn resolve_default_path() -> Result<PathBuf, FinReportError> {
    directories::ProjectDirs::from("", "", "finreport")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            FinReportError::Config("Could not determine home directory".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_base_dir() {
        let temp = TempDir::new().unwrap();
        let paths = FinReportPaths::with_base_dir(temp.path().to_path_buf());

        assert_eq!(paths.base_dir(), &temp.path().to_path_buf());
        assert!(paths.store_dir().ends_with("store"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp = TempDir::new().unwrap();
        let paths = FinReportPaths::with_base_dir(temp.path().to_path_buf());

        paths.ensure_directories().unwrap();
        assert!(paths.store_dir().exists());
        assert!(paths.reports_dir().exists());
    }
}
