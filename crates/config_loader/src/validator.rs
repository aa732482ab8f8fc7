//! Configuration validation
//!
//! Rules:
//! - capture.base_path is non-empty after stripping `.pcap`
//! - capture.snaplen > 0
//! - simulation.node_count fits the 16-bit node address space

use contracts::{ContractError, RecorderBlueprint};

/// Largest node count accepted
pub const MAX_NODE_COUNT: usize = 65535;

/// Validate a RecorderBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    validate_capture(blueprint)?;
    validate_simulation(blueprint)?;
    Ok(())
}

fn validate_capture(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    let capture = &blueprint.capture;

    if capture.stem().as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "capture.base_path",
            "base_path cannot be empty",
        ));
    }

    if capture.snaplen == 0 {
        return Err(ContractError::config_validation(
            "capture.snaplen",
            "snaplen must be > 0",
        ));
    }

    Ok(())
}

fn validate_simulation(blueprint: &RecorderBlueprint) -> Result<(), ContractError> {
    let node_count = blueprint.simulation.node_count;
    if node_count > MAX_NODE_COUNT {
        return Err(ContractError::config_validation(
            "simulation.node_count",
            format!("node_count must be <= {MAX_NODE_COUNT}, got {node_count}"),
        ));
    }
    Ok(())
}
