//! Error types for CLI operations.

use std::path::PathBuf;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Trace file not found
    #[error("Trace file not found: {}", path.display())]
    TraceNotFound { path: PathBuf },

    /// Capture file not found
    #[error("Capture file not found: {}", path.display())]
    CaptureNotFound { path: PathBuf },

    /// The capture service went away mid-run
    #[error("Capture service failed: {0}")]
    Service(#[from] fanout::ServiceError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn trace_not_found(path: impl Into<PathBuf>) -> Self {
        Self::TraceNotFound { path: path.into() }
    }

    pub fn capture_not_found(path: impl Into<PathBuf>) -> Self {
        Self::CaptureNotFound { path: path.into() }
    }
}

/// Fail early when a required input file is missing
pub fn ensure_config_exists(path: &std::path::Path) -> Result<(), CliError> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::config_not_found(path))
    }
}
