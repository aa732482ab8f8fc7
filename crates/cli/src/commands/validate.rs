//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::RecorderBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    base_path: String,
    node_count: usize,
    link_type: u32,
    snaplen: u32,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    base_path: blueprint.capture.base_path.display().to_string(),
                    node_count: blueprint.simulation.node_count,
                    link_type: blueprint.capture.link_type,
                    snaplen: blueprint.capture.snaplen,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &RecorderBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.simulation.node_count == 0 {
        warnings.push("simulation.node_count is 0 - only the sender view is written".to_string());
    }

    if blueprint.capture.base_path.as_os_str() == contracts::PLACEHOLDER_CAPTURE_PATH {
        warnings.push("capture.base_path is still the placeholder path".to_string());
    }

    if let Some(parent) = blueprint.capture.stem().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            warnings.push(format!(
                "Output directory {} does not exist - capture files will fail to open",
                parent.display()
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Base path: {}", summary.base_path);
            println!("  Nodes: {}", summary.node_count);
            println!("  Link type: {}", summary.link_type);
            println!("  Snaplen: {}", summary.snaplen);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
