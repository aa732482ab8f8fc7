//! CaptureService - serializes every fan-out call behind one task
//!
//! The service task exclusively owns the [`TransmissionFanout`]; the medium and
//! the host talk to it through cloneable [`CaptureHandle`]s. Dropping every
//! handle (or calling [`CaptureHandle::shutdown`]) revokes the subscription and
//! the task tears the fan-out down.

use std::path::PathBuf;

use contracts::{TimeSource, TransmissionEvent};
use observability::{CaptureMetricsAggregator, MetricsSummary};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::error::ServiceError;
use crate::fanout::TransmissionFanout;
use crate::metrics::MetricsSnapshot;
use crate::report::OperationReport;

/// Request processed by the service task
pub enum CaptureCommand {
    /// One radio transmission
    Transmit(TransmissionEvent),
    /// Derive paths from a new base and open every file
    Configure {
        base_path: PathBuf,
        reply: oneshot::Sender<OperationReport>,
    },
    /// Reopen every file with a fresh header
    RestartStatistics {
        reply: oneshot::Sender<OperationReport>,
    },
    /// Per-sink metrics
    Metrics {
        reply: oneshot::Sender<Vec<(String, MetricsSnapshot)>>,
    },
    /// Stop after the commands already queued
    Shutdown,
}

/// Totals accumulated by a service run
#[derive(Debug, Default)]
pub struct ServiceSummary {
    /// Transmissions processed
    pub transmissions: u64,
    /// Records appended across every sink
    pub records_written: u64,
    /// Failures reported by transmissions
    pub transmission_errors: u64,
    /// Per-sink metrics taken just before teardown
    pub sinks: Vec<(String, MetricsSnapshot)>,
    /// Outcome of the final teardown
    pub teardown: OperationReport,
    /// Run-wide aggregate, not reset by restarts
    pub aggregate: MetricsSummary,
    /// Sender-view path to persist in the host configuration
    pub persisted_path: PathBuf,
}

/// Task owning the fan-out
pub struct CaptureService<C> {
    fanout: TransmissionFanout<C>,
    rx: mpsc::Receiver<CaptureCommand>,
}

impl<C> CaptureService<C>
where
    C: TimeSource + Send + 'static,
{
    /// Create the service and its first handle
    pub fn new(fanout: TransmissionFanout<C>, queue_capacity: usize) -> (Self, CaptureHandle) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        (Self { fanout, rx }, CaptureHandle { tx })
    }

    /// Run the command loop until shutdown or until every handle is dropped
    #[instrument(name = "capture_service_run", skip(self), fields(nodes = self.fanout.node_count()))]
    pub async fn run(mut self) -> ServiceSummary {
        info!("Capture service started");
        let mut summary = ServiceSummary::default();
        let mut aggregator = CaptureMetricsAggregator::new();

        while let Some(command) = self.rx.recv().await {
            match command {
                CaptureCommand::Transmit(event) => {
                    let report = self.fanout.on_transmission(&event);
                    summary.transmissions += 1;
                    summary.records_written += report.succeeded as u64;
                    summary.transmission_errors += report.errors.len() as u64;
                    aggregator.update(
                        event.destinations.len(),
                        event.payload.len(),
                        report.succeeded,
                        report.errors.iter().map(|e| e.kind()),
                    );

                    if summary.transmissions % 100 == 0 {
                        debug!(transmissions = summary.transmissions, "Capture progress");
                    }
                }
                CaptureCommand::Configure { base_path, reply } => {
                    let report = self.fanout.configure(&base_path);
                    let _ = reply.send(report);
                }
                CaptureCommand::RestartStatistics { reply } => {
                    let report = self.fanout.restart_statistics();
                    let _ = reply.send(report);
                }
                CaptureCommand::Metrics { reply } => {
                    let _ = reply.send(self.fanout.metrics());
                }
                CaptureCommand::Shutdown => break,
            }
        }

        info!(
            transmissions = summary.transmissions,
            records = summary.records_written,
            "Capture service input closed, shutting down"
        );

        summary.sinks = self.fanout.metrics();
        summary.persisted_path = self.fanout.persisted_path();
        summary.teardown = self.fanout.teardown();
        summary.aggregate = aggregator.summary();
        summary
    }

    /// Spawn the service as a background task
    pub fn spawn(self) -> JoinHandle<ServiceSummary> {
        tokio::spawn(self.run())
    }
}

/// Subscription handle held by the medium and the host
#[derive(Clone)]
pub struct CaptureHandle {
    tx: mpsc::Sender<CaptureCommand>,
}

impl CaptureHandle {
    /// Deliver one transmission, waiting for queue space
    pub async fn transmit(&self, event: TransmissionEvent) -> Result<(), ServiceError> {
        self.send(CaptureCommand::Transmit(event)).await
    }

    /// Configure output paths and wait for the open results
    pub async fn configure(&self, base_path: impl Into<PathBuf>) -> Result<OperationReport, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(CaptureCommand::Configure {
            base_path: base_path.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| ServiceError::NoReply {
            operation: "configure",
        })
    }

    /// Reset every capture file and wait for the reopen results
    pub async fn restart_statistics(&self) -> Result<OperationReport, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(CaptureCommand::RestartStatistics { reply }).await?;
        rx.await.map_err(|_| ServiceError::NoReply {
            operation: "restart_statistics",
        })
    }

    /// Current per-sink metrics
    pub async fn metrics(&self) -> Result<Vec<(String, MetricsSnapshot)>, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(CaptureCommand::Metrics { reply }).await?;
        rx.await.map_err(|_| ServiceError::NoReply {
            operation: "metrics",
        })
    }

    /// Ask the service to stop once queued commands are processed
    pub async fn shutdown(self) -> Result<(), ServiceError> {
        self.send(CaptureCommand::Shutdown).await
    }

    /// True once the service task has exited
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, command: CaptureCommand) -> Result<(), ServiceError> {
        self.tx.send(command).await.map_err(|_| ServiceError::Stopped)
    }
}
