//! Capture metrics
//!
//! Prometheus-style counters emitted by the fan-out, plus an in-memory
//! aggregator used for end-of-run summaries.

use std::collections::BTreeMap;

use metrics::{counter, histogram};

/// Record one transmission entering the fan-out
pub fn record_transmission(destinations: usize) {
    counter!("radio_logger_transmissions_total").increment(1);
    histogram!("radio_logger_destinations_per_transmission").record(destinations as f64);
}

/// Record one append attempt on a sender or receiver view.
///
/// `failure` carries the error kind when the append failed.
pub fn record_capture_write(view: &'static str, failure: Option<&'static str>) {
    match failure {
        None => counter!("radio_logger_records_written_total", "view" => view).increment(1),
        Some(kind) => counter!(
            "radio_logger_record_failures_total",
            "view" => view,
            "kind" => kind
        )
        .increment(1),
    }
}

/// Record a destination id that did not map to any node
pub fn record_resolution_error() {
    counter!("radio_logger_resolution_errors_total").increment(1);
}

/// Record a capture file reopened with a fresh header
pub fn record_sink_reopen() {
    counter!("radio_logger_sink_reopens_total").increment(1);
}

/// Capture metrics aggregator
///
/// Aggregates in memory for summaries printed at the end of a run.
#[derive(Debug, Clone, Default)]
pub struct CaptureMetricsAggregator {
    /// Transmissions seen
    pub total_transmissions: u64,

    /// Records appended across every view
    pub total_records: u64,

    /// Failures by error kind
    pub failures: BTreeMap<String, u64>,

    /// Receivers per transmission
    pub destination_stats: RunningStats,

    /// Payload size in bytes
    pub payload_stats: RunningStats,
}

impl CaptureMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in the outcome of one transmission
    pub fn update<'a>(
        &mut self,
        destinations: usize,
        payload_len: usize,
        records: usize,
        failure_kinds: impl IntoIterator<Item = &'a str>,
    ) {
        self.total_transmissions += 1;
        self.total_records += records as u64;
        self.destination_stats.push(destinations as f64);
        self.payload_stats.push(payload_len as f64);

        for kind in failure_kinds {
            *self.failures.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    pub fn total_failures(&self) -> u64 {
        self.failures.values().sum()
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_transmissions: self.total_transmissions,
            total_records: self.total_records,
            total_failures: self.total_failures(),
            failures: self.failures.clone(),
            destinations: StatsSummary::from(&self.destination_stats),
            payload_bytes: StatsSummary::from(&self.payload_stats),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_transmissions: u64,
    pub total_records: u64,
    pub total_failures: u64,
    pub failures: BTreeMap<String, u64>,
    pub destinations: StatsSummary,
    pub payload_bytes: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Capture Metrics Summary ===")?;
        writeln!(f, "Transmissions: {}", self.total_transmissions)?;
        writeln!(f, "Records written: {}", self.total_records)?;
        writeln!(f, "Failures: {}", self.total_failures)?;
        writeln!(f, "Destinations per transmission: {}", self.destinations)?;
        writeln!(f, "Payload bytes: {}", self.payload_bytes)?;

        if !self.failures.is_empty() {
            writeln!(f, "Failures by kind:")?;
            for (kind, count) in &self.failures {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
