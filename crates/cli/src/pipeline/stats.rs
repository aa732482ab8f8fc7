//! Run statistics.

use std::path::PathBuf;
use std::time::Duration;

use fanout::{MetricsSnapshot, ServiceSummary};
use observability::MetricsSummary;

/// Statistics from a recorder run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Transmissions replayed
    pub transmissions: u64,

    /// Records appended across every capture file
    pub records_written: u64,

    /// Errors reported while fanning out transmissions
    pub transmission_errors: u64,

    /// Files that failed to open during configure
    pub configure_errors: usize,

    /// Statistics restarts performed
    pub restarts: u64,

    /// Files that failed to reopen during restarts
    pub restart_errors: usize,

    /// Files that failed to close at teardown
    pub teardown_errors: usize,

    /// Per-sink counters at teardown
    pub sinks: Vec<(String, MetricsSnapshot)>,

    /// Aggregate over the whole run
    pub aggregate: MetricsSummary,

    /// Sender-view path actually used
    pub persisted_path: PathBuf,

    /// Wall time of the run
    pub duration: Duration,

    /// Replay stopped early on a shutdown signal
    pub interrupted: bool,
}

impl RunStats {
    /// Fold in the service's final summary
    pub fn absorb(&mut self, summary: ServiceSummary) {
        self.transmissions = summary.transmissions;
        self.records_written = summary.records_written;
        self.transmission_errors = summary.transmission_errors;
        self.teardown_errors = summary.teardown.errors.len();
        self.sinks = summary.sinks;
        self.aggregate = summary.aggregate;
        self.persisted_path = summary.persisted_path;
    }

    /// Transmissions per second of wall time
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.transmissions as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Errors of any kind during the run
    pub fn total_errors(&self) -> u64 {
        self.transmission_errors
            + (self.configure_errors + self.restart_errors + self.teardown_errors) as u64
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Capture Run ===\n");
        println!("Output: {}", self.persisted_path.display());
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Throughput: {:.2} transmissions/s", self.throughput());
        println!("Restarts: {}", self.restarts);
        if self.interrupted {
            println!("Replay interrupted by shutdown signal");
        }
        println!(
            "Errors: configure={}, transmit={}, restart={}, teardown={}",
            self.configure_errors,
            self.transmission_errors,
            self.restart_errors,
            self.teardown_errors
        );

        println!("\n{}", self.aggregate);

        if !self.sinks.is_empty() {
            println!("Per-file records (current / lifetime / failures / reopens):");
            for (name, snapshot) in &self.sinks {
                println!(
                    "  {:<14} {} / {} / {} / {}",
                    name,
                    snapshot.records,
                    snapshot.total_records,
                    snapshot.failure_count,
                    snapshot.reopen_count
                );
            }
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput_and_errors() {
        let stats = RunStats {
            transmissions: 50,
            transmission_errors: 2,
            configure_errors: 1,
            duration: Duration::from_secs(2),
            ..Default::default()
        };

        assert!((stats.throughput() - 25.0).abs() < 1e-10);
        assert_eq!(stats.total_errors(), 3);
        assert_eq!(RunStats::default().throughput(), 0.0);
    }
}
