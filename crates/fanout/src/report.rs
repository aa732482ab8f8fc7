//! Aggregated outcome of one fan-out operation

use contracts::CaptureError;

/// Outcome of a single `configure`, `on_transmission`, `restart_statistics`
/// or `teardown` call.
///
/// Every sink is attempted; failures are collected here instead of stopping
/// at the first one.
#[derive(Debug, Default)]
pub struct OperationReport {
    /// Sinks that completed the operation (records appended, files opened, ...)
    pub succeeded: usize,
    /// Every failure encountered, in the order sinks were visited
    pub errors: Vec<CaptureError>,
}

impl OperationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sink-level result into the report
    pub fn record(&mut self, result: Result<(), CaptureError>) {
        match result {
            Ok(()) => self.succeeded += 1,
            Err(e) => self.errors.push(e),
        }
    }

    pub fn push_error(&mut self, error: CaptureError) {
        self.errors.push(error);
    }

    /// Append another report's counts and errors
    pub fn merge(&mut self, other: OperationReport) {
        self.succeeded += other.succeeded;
        self.errors.extend(other.errors);
    }

    /// True when no sink failed
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failures of the given kind (see [`CaptureError::kind`])
    pub fn count_kind(&self, kind: &str) -> usize {
        self.errors.iter().filter(|e| e.kind() == kind).count()
    }
}
