//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{RecorderBlueprint, SimTime};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::{ensure_config_exists, CliError};
use crate::pipeline::{Recorder, RecorderConfig};

/// Execute the `run` command
pub async fn run_recorder(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");
    ensure_config_exists(&args.config)?;

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref output) = args.output {
        info!(output = %output.display(), "Overriding capture base path from CLI");
        blueprint.capture.base_path = output.clone();
    }
    if let Some(nodes) = args.nodes {
        info!(nodes, "Overriding node count from CLI");
        blueprint.simulation.node_count = nodes;
    }
    config_loader::ConfigLoader::validate(&blueprint)
        .context("Configuration invalid after CLI overrides")?;

    if !args.trace.exists() {
        return Err(CliError::trace_not_found(&args.trace).into());
    }
    let trace = config_loader::load_trace(&args.trace)
        .with_context(|| format!("Failed to load trace from {}", args.trace.display()))?;

    info!(
        base_path = %blueprint.capture.base_path.display(),
        nodes = blueprint.simulation.node_count,
        transmissions = trace.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration and trace are valid, exiting");
        print_run_plan(&blueprint, trace.len());
        return Ok(());
    }

    let recorder = Recorder::new(RecorderConfig {
        blueprint: blueprint.clone(),
        trace,
        restart_at: args.restart_at.map(SimTime::from_micros),
        queue_size: args.queue_size,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    });

    info!("Starting capture...");

    // The recorder stops replaying on a signal and still tears the service down
    let stats = recorder
        .run(setup_shutdown_signal())
        .await
        .context("Capture run failed")?;

    info!(
        transmissions = stats.transmissions,
        records = stats.records_written,
        errors = stats.total_errors(),
        interrupted = stats.interrupted,
        duration_secs = stats.duration.as_secs_f64(),
        "Capture completed"
    );
    stats.print_summary();

    if let Some(ref path) = args.save_config {
        blueprint.capture.base_path = stats.persisted_path.clone();
        config_loader::ConfigLoader::save_to_path(&blueprint, path)
            .with_context(|| format!("Failed to save config to {}", path.display()))?;
        info!(path = %path.display(), "Configuration saved");
    }

    info!("Radio logger finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print the run plan for dry-run mode
fn print_run_plan(blueprint: &RecorderBlueprint, transmissions: usize) {
    let stem = blueprint.capture.stem();
    println!("\n=== Run Plan ===\n");
    println!("Sender view: {}", contracts::sender_capture_path(&stem).display());
    println!(
        "Receiver views: {} files ({}_<id>.pcap)",
        blueprint.simulation.node_count,
        stem.display()
    );
    println!("Transmissions: {}", transmissions);
    println!();
}
