//! Layered error definitions
//!
//! Categorized by source: config / trace / capture

use std::path::PathBuf;

use thiserror::Error;

use crate::NodeId;

/// Unified error type for configuration and input handling
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Trace Errors =====
    /// A transmission trace line could not be decoded
    #[error("trace parse error at line {line}: {message}")]
    TraceParse { line: usize, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create trace parse error
    pub fn trace_parse(line: usize, message: impl Into<String>) -> Self {
        Self::TraceParse {
            line,
            message: message.into(),
        }
    }
}

/// Failures raised by capture sinks and the transmission fan-out.
///
/// None of these abort a fan-out operation: they are collected per call and
/// logged, and capture continues for every other sink.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// File creation, write, flush or close failure
    #[error("sink '{sink}' io error on {}: {source}", path.display())]
    Io {
        sink: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record written to a sink that is not open
    #[error("sink '{sink}' is not open")]
    NotOpen { sink: String },

    /// Reopen requested on a sink that never had a path
    #[error("sink '{sink}' has no configured path")]
    NotConfigured { sink: String },

    /// Destination node id outside `1..=node_count`
    #[error("destination node {node_id} is outside 1..={node_count}")]
    Resolution { node_id: NodeId, node_count: usize },
}

impl CaptureError {
    /// Create io error
    pub fn io(sink: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            sink: sink.into(),
            path: path.into(),
            source,
        }
    }

    /// Create not-open error
    pub fn not_open(sink: impl Into<String>) -> Self {
        Self::NotOpen { sink: sink.into() }
    }

    /// Create not-configured error
    pub fn not_configured(sink: impl Into<String>) -> Self {
        Self::NotConfigured { sink: sink.into() }
    }

    /// Create resolution error
    pub fn resolution(node_id: NodeId, node_count: usize) -> Self {
        Self::Resolution {
            node_id,
            node_count,
        }
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::NotOpen { .. } => "not_open",
            Self::NotConfigured { .. } => "not_configured",
            Self::Resolution { .. } => "resolution",
        }
    }
}
