//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{receiver_capture_path, sender_capture_path, NodeId, RecorderBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::ensure_config_exists;

/// Receivers listed one by one in text output before eliding
const MAX_LISTED_RECEIVERS: usize = 16;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    capture: CaptureInfo,
    simulation: SimulationInfo,
    views: Vec<ViewInfo>,
}

#[derive(Serialize)]
struct CaptureInfo {
    base_path: String,
    stem: String,
    link_type: u32,
    snaplen: u32,
}

#[derive(Serialize)]
struct SimulationInfo {
    node_count: usize,
    epoch_us: u64,
}

#[derive(Serialize)]
struct ViewInfo {
    view: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_id: Option<u32>,
    path: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");
    ensure_config_exists(&args.config)?;

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(blueprint: &RecorderBlueprint) -> ConfigInfo {
    let stem = blueprint.capture.stem();

    let mut views = Vec::with_capacity(blueprint.simulation.node_count + 1);
    views.push(ViewInfo {
        view: "sender".to_string(),
        node_id: None,
        path: sender_capture_path(&stem).display().to_string(),
    });
    views.extend((0..blueprint.simulation.node_count).map(|idx| {
        let node_id = NodeId::from_index(idx);
        ViewInfo {
            view: "receiver".to_string(),
            node_id: Some(node_id.get()),
            path: receiver_capture_path(&stem, node_id).display().to_string(),
        }
    }));

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        capture: CaptureInfo {
            base_path: blueprint.capture.base_path.display().to_string(),
            stem: stem.display().to_string(),
            link_type: blueprint.capture.link_type,
            snaplen: blueprint.capture.snaplen,
        },
        simulation: SimulationInfo {
            node_count: blueprint.simulation.node_count,
            epoch_us: blueprint.simulation.epoch_us,
        },
        views,
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("=== Radio Logger Configuration ===\n");

    println!("Capture");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Base path: {}", info.capture.base_path);
    println!("   ├─ Link type: {}", info.capture.link_type);
    println!("   └─ Snaplen: {}", info.capture.snaplen);

    println!("\nSimulation");
    println!("   ├─ Nodes: {}", info.simulation.node_count);
    if info.simulation.epoch_us == 0 {
        println!("   └─ Epoch: start of run");
    } else {
        println!("   └─ Epoch: {} us", info.simulation.epoch_us);
    }

    println!("\nCapture files ({})", info.views.len());
    let shown = info.views.len().min(MAX_LISTED_RECEIVERS + 1);
    for (i, view) in info.views.iter().take(shown).enumerate() {
        let is_last = i + 1 == shown && shown == info.views.len();
        let prefix = if is_last { "└─" } else { "├─" };
        match view.node_id {
            Some(id) => println!("   {} node {}: {}", prefix, id, view.path),
            None => println!("   {} {}: {}", prefix, view.view, view.path),
        }
    }
    if shown < info.views.len() {
        println!("   └─ ... {} more", info.views.len() - shown);
    }

    println!();
}
