//! Recorder - drives one capture run.
//!
//! Builds the fan-out from the blueprint, hands it to a capture service task
//! and replays the trace through a [`fanout::CaptureHandle`], the same path a
//! live medium would use.

use std::future::Future;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{RecorderBlueprint, SimTime, SimulationClock, TransmissionEvent};
use fanout::{CaptureService, OperationReport, TransmissionFanout};
use tracing::{info, warn};

use super::RunStats;
use crate::error::CliError;

/// Recorder configuration
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Validated configuration
    pub blueprint: RecorderBlueprint,

    /// Transmissions to replay, in delivery order
    pub trace: Vec<TransmissionEvent>,

    /// Restart statistics once this simulated time is reached
    pub restart_at: Option<SimTime>,

    /// Command queue capacity
    pub queue_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Replays a trace into capture files
pub struct Recorder {
    config: RecorderConfig,
}

impl Recorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self { config }
    }

    /// Run to completion and tear the capture service down.
    ///
    /// When `shutdown` resolves the replay stops early; the service still
    /// closes every file before this returns.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<RunStats> {
        let start_time = Instant::now();
        let RecorderConfig {
            blueprint,
            trace,
            restart_at,
            queue_size,
            metrics_port,
        } = self.config;

        if let Some(port) = metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let clock = SimulationClock::new(resolve_epoch(blueprint.simulation.epoch_us));
        info!(
            epoch_us = clock.epoch_us,
            nodes = blueprint.simulation.node_count,
            "Building capture fan-out"
        );

        let fanout = TransmissionFanout::from_blueprint(&blueprint, clock);
        let (service, handle) = CaptureService::new(fanout, queue_size);
        let task = service.spawn();

        let mut stats = RunStats::default();

        let report = handle
            .configure(blueprint.capture.base_path.clone())
            .await
            .map_err(CliError::from)?;
        stats.configure_errors = report_failures("configure", &report);

        tokio::pin!(shutdown);
        let mut pending_restart = restart_at;
        for event in trace {
            if let Some(at) = pending_restart {
                if event.sim_time >= at {
                    let report = handle.restart_statistics().await.map_err(CliError::from)?;
                    stats.restart_errors += report_failures("restart_statistics", &report);
                    stats.restarts += 1;
                    pending_restart = None;
                    info!(sim_time_us = at.as_micros(), "Statistics restarted");
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Shutdown requested, stopping replay");
                    stats.interrupted = true;
                    break;
                }
                result = handle.transmit(event) => result.map_err(CliError::from)?,
            }
        }

        handle.shutdown().await.map_err(CliError::from)?;
        let summary = task.await.context("Capture service task panicked")?;
        report_failures("teardown", &summary.teardown);

        stats.absorb(summary);
        stats.duration = start_time.elapsed();
        Ok(stats)
    }
}

/// Zero means "the simulation starts now"
fn resolve_epoch(configured_us: u64) -> u64 {
    if configured_us != 0 {
        return configured_us;
    }
    u64::try_from(chrono::Utc::now().timestamp_micros()).unwrap_or_default()
}

fn report_failures(operation: &str, report: &OperationReport) -> usize {
    for error in &report.errors {
        warn!(operation, kind = error.kind(), error = %error, "Capture operation reported an error");
    }
    report.errors.len()
}
