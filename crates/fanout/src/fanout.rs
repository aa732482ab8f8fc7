//! TransmissionFanout - replicates each transmission into every viewpoint file

use std::path::{Path, PathBuf};

use capture_format::GlobalHeader;
use contracts::{
    receiver_capture_path, sender_capture_path, strip_capture_extension, CaptureError, NodeId,
    RecorderBlueprint, SimulationClock, TimeSource, TransmissionEvent, PLACEHOLDER_CAPTURE_PATH,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::metrics::MetricsSnapshot;
use crate::report::OperationReport;
use crate::sink::CaptureSink;

const SENDER_VIEW: &str = "sender";
const RECEIVER_VIEW: &str = "receiver";

/// Fans a transmission out to the sender view and every receiving node's view.
///
/// Receiver sinks are indexed by node id: `receivers[i]` belongs to node `i + 1`.
/// Every operation visits every sink and collects failures into an
/// [`OperationReport`]; one broken file never stops writes to the others.
pub struct TransmissionFanout<C = SimulationClock> {
    clock: C,
    base: Option<PathBuf>,
    sender: CaptureSink,
    receivers: Vec<CaptureSink>,
}

impl<C: TimeSource> TransmissionFanout<C> {
    /// Create an unconfigured fan-out with default capture headers
    pub fn new(node_count: usize, clock: C) -> Self {
        Self::with_header(node_count, clock, GlobalHeader::default())
    }

    /// Create an unconfigured fan-out writing `header` into every file
    pub fn with_header(node_count: usize, clock: C, header: GlobalHeader) -> Self {
        let receivers = (0..node_count)
            .map(|idx| CaptureSink::new(receiver_name(NodeId::from_index(idx)), header))
            .collect();

        Self {
            clock,
            base: None,
            sender: CaptureSink::new(SENDER_VIEW, header),
            receivers,
        }
    }

    /// Create from a loaded configuration; files are not opened yet
    pub fn from_blueprint(blueprint: &RecorderBlueprint, clock: C) -> Self {
        let header =
            GlobalHeader::new(blueprint.capture.link_type).with_snaplen(blueprint.capture.snaplen);
        Self::with_header(blueprint.simulation.node_count, clock, header)
    }

    pub fn node_count(&self) -> usize {
        self.receivers.len()
    }

    /// True once `configure` has been called
    pub fn is_configured(&self) -> bool {
        self.base.is_some()
    }

    pub fn sender(&self) -> &CaptureSink {
        &self.sender
    }

    /// Receiver sink for a node, if the id is in range
    pub fn receiver(&self, node_id: NodeId) -> Option<&CaptureSink> {
        node_id
            .index(self.receivers.len())
            .map(|idx| &self.receivers[idx])
    }

    /// Sender view path, if configured
    pub fn sender_path(&self) -> Option<&Path> {
        self.sender.path()
    }

    /// Path to persist in the host configuration.
    ///
    /// Falls back to a placeholder when no output was ever configured.
    pub fn persisted_path(&self) -> PathBuf {
        self.sender_path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(PLACEHOLDER_CAPTURE_PATH))
    }

    /// Derive every view path from `base_path` and open all of them.
    ///
    /// The sender view goes to `<base>.pcap`, node `n` to `<base>_<n>.pcap`.
    /// Calling again with another base closes the previous files (they are
    /// left on disk) and opens the new set.
    #[instrument(name = "fanout_configure", skip(self, base_path), fields(nodes = self.receivers.len()))]
    pub fn configure(&mut self, base_path: &Path) -> OperationReport {
        let stem = strip_capture_extension(base_path);
        let mut report = OperationReport::new();

        if self.base.is_some() {
            for error in self.close_all().errors {
                report.push_error(error);
            }
        }

        report.record(self.sender.open(sender_capture_path(&stem)));
        for (idx, sink) in self.receivers.iter_mut().enumerate() {
            let path = receiver_capture_path(&stem, NodeId::from_index(idx));
            report.record(sink.open(path));
        }

        log_errors("configure", &report);
        info!(
            base = %stem.display(),
            opened = report.succeeded,
            failed = report.errors.len(),
            "Capture files configured"
        );

        self.base = Some(stem);
        report
    }

    /// Write one transmission to the sender view and each destination's view.
    ///
    /// Destinations outside `1..=node_count` yield a `Resolution` error and
    /// are skipped; every other destination is still written. Before
    /// `configure` the event is ignored.
    pub fn on_transmission(&mut self, event: &TransmissionEvent) -> OperationReport {
        let mut report = OperationReport::new();
        if !self.is_configured() {
            trace!(sender = %event.sender, "Fan-out not configured, transmission ignored");
            return report;
        }

        observability::record_transmission(event.destinations.len());
        let ts_us = self.clock.to_wall_clock(event.sim_time);

        let result = self.sender.append(&event.payload, ts_us);
        observability::record_capture_write(SENDER_VIEW, result.as_ref().err().map(CaptureError::kind));
        report.record(result);

        let node_count = self.receivers.len();
        for &node_id in &event.destinations {
            let Some(idx) = node_id.index(node_count) else {
                observability::record_resolution_error();
                report.push_error(CaptureError::resolution(node_id, node_count));
                continue;
            };

            let result = self.receivers[idx].append(&event.payload, ts_us);
            observability::record_capture_write(
                RECEIVER_VIEW,
                result.as_ref().err().map(CaptureError::kind),
            );
            report.record(result);
        }

        log_errors("transmission", &report);
        report
    }

    /// Reopen every sink: fresh headers, zero records, same paths
    #[instrument(name = "fanout_restart_statistics", skip(self))]
    pub fn restart_statistics(&mut self) -> OperationReport {
        let mut report = OperationReport::new();
        for sink in std::iter::once(&mut self.sender).chain(self.receivers.iter_mut()) {
            let result = sink.reopen();
            if result.is_ok() {
                observability::record_sink_reopen();
            }
            report.record(result);
        }

        log_errors("restart_statistics", &report);
        debug!(
            reopened = report.succeeded,
            failed = report.errors.len(),
            "Statistics restarted"
        );
        report
    }

    /// Metrics for every sink, sender first
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        std::iter::once(&self.sender)
            .chain(self.receivers.iter())
            .map(|s| (s.name().to_string(), s.metrics().snapshot()))
            .collect()
    }

    /// Close every sink, sender first, and consume the fan-out
    #[instrument(name = "fanout_teardown", skip(self))]
    pub fn teardown(mut self) -> OperationReport {
        let report = self.close_all();
        log_errors("teardown", &report);
        info!(closed = report.succeeded, "Fan-out torn down");
        report
    }

    fn close_all(&mut self) -> OperationReport {
        let mut report = OperationReport::new();
        report.record(self.sender.close());
        for sink in &mut self.receivers {
            report.record(sink.close());
        }
        report
    }
}

fn receiver_name(node_id: NodeId) -> String {
    format!("{RECEIVER_VIEW}-{node_id}")
}

fn log_errors(operation: &str, report: &OperationReport) {
    for error in &report.errors {
        warn!(operation, kind = error.kind(), error = %error, "Capture degraded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture_format::PcapReader;
    use contracts::SimTime;
    use std::fs::File;
    use tempfile::tempdir;

    fn event(t: u64, sender: u32, dests: &[u32], payload: &[u8]) -> TransmissionEvent {
        TransmissionEvent::new(
            SimTime::from_micros(t),
            NodeId::new(sender),
            dests.iter().copied().map(NodeId::new),
            payload.to_vec(),
        )
    }

    fn payloads(path: &Path) -> Vec<Vec<u8>> {
        let file = File::open(path).unwrap();
        PcapReader::new(file)
            .unwrap()
            .map(|r| r.unwrap().payload)
            .collect()
    }

    #[test]
    fn test_construct_allocates_inactive_sinks() {
        let fanout = TransmissionFanout::new(3, SimulationClock::default());
        assert_eq!(fanout.node_count(), 3);
        assert!(!fanout.is_configured());
        assert!(!fanout.sender().is_active());
        assert_eq!(
            fanout.receiver(NodeId::new(3)).map(CaptureSink::name),
            Some("receiver-3")
        );
        assert!(fanout.receiver(NodeId::new(4)).is_none());
        assert!(fanout.receiver(NodeId::new(0)).is_none());
    }

    #[test]
    fn test_configure_derives_paths() {
        let dir = tempdir().unwrap();
        let mut fanout = TransmissionFanout::new(2, SimulationClock::default());

        let report = fanout.configure(&dir.path().join("radio.pcap"));
        assert!(report.is_clean(), "{:?}", report.errors);
        assert_eq!(report.succeeded, 3);

        assert_eq!(fanout.sender_path(), Some(dir.path().join("radio.pcap").as_path()));
        assert_eq!(
            fanout.receiver(NodeId::new(2)).and_then(CaptureSink::path),
            Some(dir.path().join("radio_2.pcap").as_path())
        );
        assert!(dir.path().join("radio_1.pcap").exists());
    }

    #[test]
    fn test_transmission_reaches_only_destinations() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("radio");
        let mut fanout = TransmissionFanout::new(3, SimulationClock::default());
        fanout.configure(&base);

        let report = fanout.on_transmission(&event(10, 1, &[2, 3], &[0x61, 0x88]));
        assert!(report.is_clean());
        assert_eq!(report.succeeded, 3);

        assert_eq!(payloads(&dir.path().join("radio.pcap")), vec![vec![0x61, 0x88]]);
        assert!(payloads(&dir.path().join("radio_1.pcap")).is_empty());
        assert_eq!(payloads(&dir.path().join("radio_2.pcap")), vec![vec![0x61, 0x88]]);
        assert_eq!(payloads(&dir.path().join("radio_3.pcap")), vec![vec![0x61, 0x88]]);
    }

    #[test]
    fn test_clock_converts_timestamps() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("radio");
        let mut fanout = TransmissionFanout::new(1, SimulationClock::new(5_000_000));
        fanout.configure(&base);
        fanout.on_transmission(&event(250, 1, &[1], &[0x01]));

        let file = File::open(dir.path().join("radio_1.pcap")).unwrap();
        let record = PcapReader::new(file).unwrap().next_record().unwrap().unwrap();
        assert_eq!(record.ts_us, 5_000_250);
    }

    #[test]
    fn test_out_of_range_destinations_are_reported() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("radio");
        let mut fanout = TransmissionFanout::new(2, SimulationClock::default());
        fanout.configure(&base);

        let report = fanout.on_transmission(&event(1, 1, &[0, 2, 3, 99], &[0x07]));
        assert_eq!(report.count_kind("resolution"), 3);
        assert_eq!(report.succeeded, 2);

        assert_eq!(payloads(&dir.path().join("radio.pcap")).len(), 1);
        assert!(payloads(&dir.path().join("radio_1.pcap")).is_empty());
        assert_eq!(payloads(&dir.path().join("radio_2.pcap")).len(), 1);
    }

    #[test]
    fn test_unconfigured_is_noop() {
        let mut fanout = TransmissionFanout::new(2, SimulationClock::default());
        let report = fanout.on_transmission(&event(1, 1, &[2], &[0x01]));
        assert!(report.is_clean());
        assert_eq!(report.succeeded, 0);
    }

    #[test]
    fn test_zero_nodes_writes_sender_only() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("radio");
        let mut fanout = TransmissionFanout::new(0, SimulationClock::default());
        assert_eq!(fanout.configure(&base).succeeded, 1);

        let report = fanout.on_transmission(&event(1, 1, &[1], &[0x01]));
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.count_kind("resolution"), 1);
        assert_eq!(payloads(&dir.path().join("radio.pcap")).len(), 1);
    }

    #[test]
    fn test_restart_statistics_resets_files() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("radio");
        let mut fanout = TransmissionFanout::new(2, SimulationClock::default());
        fanout.configure(&base);
        fanout.on_transmission(&event(1, 1, &[2], &[0x01]));
        fanout.on_transmission(&event(2, 2, &[1], &[0x02]));

        let report = fanout.restart_statistics();
        assert!(report.is_clean());
        assert_eq!(report.succeeded, 3);

        for name in ["radio.pcap", "radio_1.pcap", "radio_2.pcap"] {
            assert!(payloads(&dir.path().join(name)).is_empty(), "{name}");
        }
        assert_eq!(fanout.sender_path(), Some(dir.path().join("radio.pcap").as_path()));

        fanout.on_transmission(&event(3, 1, &[2], &[0x03]));
        assert_eq!(payloads(&dir.path().join("radio_2.pcap")), vec![vec![0x03]]);
    }

    #[test]
    fn test_restart_statistics_before_configure() {
        let mut fanout = TransmissionFanout::new(2, SimulationClock::default());
        let report = fanout.restart_statistics();
        assert_eq!(report.count_kind("not_configured"), 3);
    }

    #[test]
    fn test_reconfigure_switches_files() {
        let dir = tempdir().unwrap();
        let mut fanout = TransmissionFanout::new(1, SimulationClock::default());
        fanout.configure(&dir.path().join("first"));
        fanout.on_transmission(&event(1, 1, &[1], &[0x01]));

        let report = fanout.configure(&dir.path().join("second"));
        assert!(report.is_clean());
        fanout.on_transmission(&event(2, 1, &[1], &[0x02]));

        assert_eq!(payloads(&dir.path().join("first_1.pcap")), vec![vec![0x01]]);
        assert_eq!(payloads(&dir.path().join("second_1.pcap")), vec![vec![0x02]]);
    }

    #[test]
    fn test_persisted_path_placeholder() {
        let fanout = TransmissionFanout::new(1, SimulationClock::default());
        assert_eq!(fanout.persisted_path(), PathBuf::from(PLACEHOLDER_CAPTURE_PATH));
    }

    #[test]
    fn test_teardown_closes_everything() {
        let dir = tempdir().unwrap();
        let mut fanout = TransmissionFanout::new(2, SimulationClock::default());
        fanout.configure(&dir.path().join("radio"));
        fanout.on_transmission(&event(1, 1, &[2], &[0x01]));

        let report = fanout.teardown();
        assert!(report.is_clean());
        assert_eq!(report.succeeded, 3);
        assert_eq!(payloads(&dir.path().join("radio_2.pcap")), vec![vec![0x01]]);
    }
}
