//! # Config Loader
//!
//! Configuration and trace loading module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `RecorderBlueprint`
//! - Load JSON-lines transmission traces
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("recorder.toml")).unwrap();
//! println!("Nodes: {}", blueprint.simulation.node_count);
//! ```

mod parser;
mod trace;
mod validator;

pub use contracts::RecorderBlueprint;
pub use parser::ConfigFormat;
pub use trace::{load_trace, parse_line, read_trace};
pub use validator::MAX_NODE_COUNT;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RecorderBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RecorderBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an already-built blueprint (e.g. after CLI overrides)
    pub fn validate(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Serialize RecorderBlueprint to TOML string
    pub fn to_toml(blueprint: &RecorderBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize RecorderBlueprint to JSON string
    pub fn to_json(blueprint: &RecorderBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    /// Persist a blueprint, choosing the format from the file extension
    pub fn save_to_path(blueprint: &RecorderBlueprint, path: &Path) -> Result<(), ContractError> {
        let content = match Self::detect_format(path)? {
            ConfigFormat::Toml => Self::to_toml(blueprint)?,
            ConfigFormat::Json => Self::to_json(blueprint)?,
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RecorderBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}
