//! Configuration parsing
//!
//! TOML (primary) and JSON (optional) formats.

use contracts::{ContractError, RecorderBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration.
///
/// Errors name the offending key as `table.key` (e.g. `capture.snaplen`)
/// when the parser reports a location.
pub fn parse_toml(content: &str) -> Result<RecorderBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| {
        let message = match toml_field_path(content, &e) {
            Some(field) => format!("TOML parse error at {field}: {}", e.message().trim()),
            None => format!("TOML parse error: {e}"),
        };
        ContractError::ConfigParse {
            message,
            source: Some(Box::new(e)),
        }
    })
}

/// Best-effort dotted path of the key a TOML error points at
fn toml_field_path(content: &str, err: &toml::de::Error) -> Option<String> {
    let span = err.span()?;
    let missing = missing_field(err.message());

    // A span over the whole document means a top-level key
    let whole_document = span.start == 0 && span.end >= content.trim_end().len();
    if whole_document {
        return missing.map(str::to_string);
    }

    let line_end = content
        .get(span.start..)?
        .find('\n')
        .map_or(content.len(), |off| span.start + off);
    let upto = content.get(..line_end)?;
    let current_line = upto.rsplit('\n').next().unwrap_or_default().trim();

    let table = upto
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with('['))
        .map(|line| line.trim_matches(|c: char| c == '[' || c == ']').trim());

    let key = missing.or_else(|| {
        (!current_line.starts_with('['))
            .then(|| current_line.split_once('='))
            .flatten()
            .map(|(key, _)| key.trim())
    });

    match (table, key) {
        (Some(table), Some(key)) => Some(format!("{table}.{key}")),
        (None, Some(key)) => Some(key.to_string()),
        (Some(table), None) => Some(table.to_string()),
        (None, None) => None,
    }
}

/// Field name from serde's "missing field `x`" message
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.split_once("missing field `")?.1;
    rest.split_once('`').map(|(field, _)| field)
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<RecorderBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<RecorderBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}
