//! # Integration Tests
//!
//! End-to-end scenarios across crates.
//!
//! Covers:
//! - two-node exchange read back from every view
//! - degraded output directories
//! - statistics restarts
//! - trace replay through the capture service

#[cfg(test)]
mod support {
    use std::fs::File;
    use std::path::Path;

    use capture_format::{GlobalHeader, PcapReader};
    use contracts::{NodeId, SimTime, TransmissionEvent};

    pub fn event(t: u64, sender: u32, dests: &[u32], payload: &[u8]) -> TransmissionEvent {
        TransmissionEvent::new(
            SimTime::from_micros(t),
            NodeId::new(sender),
            dests.iter().copied().map(NodeId::new),
            payload.to_vec(),
        )
    }

    /// Global header plus (timestamp, payload) of every record
    pub fn read_capture(path: &Path) -> (GlobalHeader, Vec<(u64, Vec<u8>)>) {
        let file = File::open(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        let reader = PcapReader::new(file).unwrap();
        let header = *reader.header();
        let records = reader
            .map(|r| {
                let r = r.unwrap();
                (r.ts_us, r.payload)
            })
            .collect();
        (header, records)
    }
}

#[cfg(test)]
mod contract_tests {
    use contracts::{receiver_capture_path, sender_capture_path, strip_capture_extension, NodeId};
    use std::path::Path;

    #[test]
    fn test_view_paths_from_base_with_extension() {
        let stem = strip_capture_extension(Path::new("logs/radio.pcap"));
        assert_eq!(sender_capture_path(&stem), Path::new("logs/radio.pcap"));
        assert_eq!(
            receiver_capture_path(&stem, NodeId::new(12)),
            Path::new("logs/radio_12.pcap")
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use capture_format::GlobalHeader;
    use contracts::{CaptureError, NodeId, SimulationClock};
    use fanout::TransmissionFanout;
    use tempfile::tempdir;

    use crate::support::{event, read_capture};

    const EPOCH_US: u64 = 1_600_000_000_000_000;

    /// Two nodes exchange one packet each
    #[test]
    fn test_two_node_exchange() {
        let dir = tempdir().unwrap();
        let mut fanout = TransmissionFanout::new(2, SimulationClock::new(EPOCH_US));
        assert!(fanout.configure(&dir.path().join("radio")).is_clean());

        let a = fanout.on_transmission(&event(1_000, 1, &[2], &[0x01, 0x02]));
        let b = fanout.on_transmission(&event(2_500, 2, &[1], &[0xAA]));
        assert_eq!((a.succeeded, b.succeeded), (2, 2));
        assert!(fanout.teardown().is_clean());

        let (header, sender) = read_capture(&dir.path().join("radio.pcap"));
        assert_eq!(header, GlobalHeader::default());
        assert_eq!(
            sender,
            vec![
                (EPOCH_US + 1_000, vec![0x01, 0x02]),
                (EPOCH_US + 2_500, vec![0xAA]),
            ]
        );

        let (_, node1) = read_capture(&dir.path().join("radio_1.pcap"));
        assert_eq!(node1, vec![(EPOCH_US + 2_500, vec![0xAA])]);

        let (_, node2) = read_capture(&dir.path().join("radio_2.pcap"));
        assert_eq!(node2, vec![(EPOCH_US + 1_000, vec![0x01, 0x02])]);
    }

    /// Every destination gets exactly one copy, bystanders none
    #[test]
    fn test_broadcast_reaches_only_destinations() {
        let dir = tempdir().unwrap();
        let mut fanout = TransmissionFanout::new(5, SimulationClock::default());
        fanout.configure(&dir.path().join("mesh.pcap"));

        let report = fanout.on_transmission(&event(7, 3, &[1, 2, 4], b"hello"));
        assert_eq!(report.succeeded, 4);
        drop(fanout);

        for (node, expected) in [(1, 1), (2, 1), (3, 0), (4, 1), (5, 0)] {
            let path = dir.path().join(format!("mesh_{node}.pcap"));
            let (_, records) = read_capture(&path);
            assert_eq!(records.len(), expected, "node {node}");
            if expected == 1 {
                assert_eq!(records[0].1, b"hello");
            }
        }
    }

    /// Records come back in write order with their timestamps
    #[test]
    fn test_many_records_read_back_in_order() {
        let dir = tempdir().unwrap();
        let mut fanout = TransmissionFanout::new(1, SimulationClock::default());
        fanout.configure(&dir.path().join("seq"));

        // Non-monotonic on purpose: timestamps are written as given
        let times = [30u64, 10, 20, 20, 5_000_000];
        for (i, &t) in times.iter().enumerate() {
            fanout.on_transmission(&event(t, 1, &[1], &[i as u8; 3]));
        }
        fanout.teardown();

        let (_, records) = read_capture(&dir.path().join("seq_1.pcap"));
        let expected: Vec<_> = times
            .iter()
            .enumerate()
            .map(|(i, &t)| (t, vec![i as u8; 3]))
            .collect();
        assert_eq!(records, expected);
    }

    /// Unknown destinations only cost a resolution error
    #[test]
    fn test_out_of_range_destinations() {
        let dir = tempdir().unwrap();
        let mut fanout = TransmissionFanout::new(2, SimulationClock::default());
        fanout.configure(&dir.path().join("radio"));

        let report = fanout.on_transmission(&event(1, 1, &[0, 2, 3], &[0x42]));
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.count_kind("resolution"), 2);
        assert!(report.errors.iter().all(|e| matches!(
            e,
            CaptureError::Resolution { node_count: 2, node_id } if *node_id == NodeId::new(0) || *node_id == NodeId::new(3)
        )));
        drop(fanout);

        assert_eq!(read_capture(&dir.path().join("radio_2.pcap")).1.len(), 1);
        assert_eq!(read_capture(&dir.path().join("radio_1.pcap")).1.len(), 0);
    }
}

#[cfg(test)]
mod failure_tests {
    use contracts::{NodeId, SimulationClock};
    use fanout::TransmissionFanout;
    use tempfile::tempdir;

    use crate::support::{event, read_capture};

    /// Unwritable output: every file fails, nothing panics
    #[test]
    fn test_configure_into_missing_directory() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("does-not-exist").join("radio");
        let mut fanout = TransmissionFanout::new(3, SimulationClock::default());

        let report = fanout.configure(&base);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.count_kind("io"), 4);

        let report = fanout.on_transmission(&event(1, 1, &[1, 2, 3], &[0x01]));
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.errors.len(), 4);
        assert_eq!(report.count_kind("not_open"), 4);

        // Paths are remembered, so restarts retry the same files
        assert_eq!(fanout.persisted_path(), base.with_extension("pcap"));
        assert_eq!(fanout.restart_statistics().count_kind("io"), 4);
        assert!(fanout.teardown().is_clean());
    }

    /// A broken sender view does not stop receiver views
    #[test]
    fn test_sender_failure_isolated() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("radio.pcap")).unwrap();

        let mut fanout = TransmissionFanout::new(2, SimulationClock::default());
        let report = fanout.configure(&dir.path().join("radio"));
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.count_kind("io"), 1);

        let report = fanout.on_transmission(&event(5, 1, &[1, 2], &[0x10, 0x20]));
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.count_kind("not_open"), 1);
        drop(fanout);

        for node in [1, 2] {
            let (_, records) = read_capture(&dir.path().join(format!("radio_{node}.pcap")));
            assert_eq!(records, vec![(5, vec![0x10, 0x20])], "node {node}");
        }
    }

    /// One broken receiver view does not stop its neighbours
    #[test]
    fn test_receiver_failure_isolated() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("radio_2.pcap")).unwrap();

        let mut fanout = TransmissionFanout::new(3, SimulationClock::default());
        let report = fanout.configure(&dir.path().join("radio"));
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.count_kind("io"), 1);
        assert!(!fanout.receiver(NodeId::new(2)).unwrap().is_active());

        let report = fanout.on_transmission(&event(9, 2, &[1, 2, 3], &[0x33]));
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.count_kind("not_open"), 1);
        drop(fanout);

        assert_eq!(read_capture(&dir.path().join("radio.pcap")).1, vec![(9, vec![0x33])]);
        assert_eq!(read_capture(&dir.path().join("radio_1.pcap")).1, vec![(9, vec![0x33])]);
        assert_eq!(read_capture(&dir.path().join("radio_3.pcap")).1, vec![(9, vec![0x33])]);
    }

    /// Once the directory appears, restart_statistics recovers
    #[test]
    fn test_restart_recovers_after_directory_created() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("late");
        let mut fanout = TransmissionFanout::new(1, SimulationClock::default());
        assert_eq!(fanout.configure(&out.join("radio")).errors.len(), 2);

        std::fs::create_dir(&out).unwrap();
        assert!(fanout.restart_statistics().is_clean());

        let report = fanout.on_transmission(&event(1, 1, &[1], &[0x01]));
        assert!(report.is_clean());
        assert_eq!(report.succeeded, 2);
    }

    /// Transmissions before configure are dropped silently
    #[test]
    fn test_transmission_before_configure() {
        let mut fanout = TransmissionFanout::new(2, SimulationClock::default());
        let report = fanout.on_transmission(&event(1, 1, &[2], &[0x01]));
        assert!(report.is_clean());
        assert_eq!(report.succeeded, 0);
        assert_eq!(fanout.persisted_path(), std::path::Path::new(contracts::PLACEHOLDER_CAPTURE_PATH));
    }
}

#[cfg(test)]
mod restart_tests {
    use contracts::{NodeId, SimulationClock};
    use fanout::TransmissionFanout;
    use tempfile::tempdir;

    use crate::support::{event, read_capture};

    #[test]
    fn test_restart_preserves_paths_and_clears_records() {
        let dir = tempdir().unwrap();
        let mut fanout = TransmissionFanout::new(2, SimulationClock::default());
        fanout.configure(&dir.path().join("radio"));

        fanout.on_transmission(&event(1, 1, &[2], &[0x01]));
        fanout.on_transmission(&event(2, 2, &[1], &[0x02]));

        let before: Vec<_> = std::iter::once(fanout.sender_path().map(|p| p.to_path_buf()))
            .chain((1..=2).map(|id| {
                fanout
                    .receiver(NodeId::new(id))
                    .and_then(|s| s.path())
                    .map(|p| p.to_path_buf())
            }))
            .collect();

        let report = fanout.restart_statistics();
        assert_eq!(report.succeeded, 3);
        assert!(report.is_clean());

        let after: Vec<_> = std::iter::once(fanout.sender_path().map(|p| p.to_path_buf()))
            .chain((1..=2).map(|id| {
                fanout
                    .receiver(NodeId::new(id))
                    .and_then(|s| s.path())
                    .map(|p| p.to_path_buf())
            }))
            .collect();
        assert_eq!(before, after);

        for (name, snapshot) in fanout.metrics() {
            assert_eq!(snapshot.records, 0, "{name}");
            assert_eq!(snapshot.reopen_count, 1, "{name}");
        }

        fanout.on_transmission(&event(3, 1, &[1], &[0x03]));
        fanout.teardown();

        assert_eq!(read_capture(&dir.path().join("radio.pcap")).1, vec![(3, vec![0x03])]);
        assert_eq!(read_capture(&dir.path().join("radio_1.pcap")).1, vec![(3, vec![0x03])]);
        assert!(read_capture(&dir.path().join("radio_2.pcap")).1.is_empty());
    }

    #[test]
    fn test_reconfigure_switches_output() {
        let dir = tempdir().unwrap();
        let mut fanout = TransmissionFanout::new(1, SimulationClock::default());
        fanout.configure(&dir.path().join("first"));
        fanout.on_transmission(&event(1, 1, &[1], &[0x01]));

        assert!(fanout.configure(&dir.path().join("second.pcap")).is_clean());
        fanout.on_transmission(&event(2, 1, &[1], &[0x02]));
        fanout.teardown();

        assert_eq!(read_capture(&dir.path().join("first_1.pcap")).1, vec![(1, vec![0x01])]);
        assert_eq!(read_capture(&dir.path().join("second_1.pcap")).1, vec![(2, vec![0x02])]);
    }
}

#[cfg(test)]
mod service_tests {
    use std::io::Write;

    use contracts::SimulationClock;
    use fanout::{CaptureService, TransmissionFanout};
    use tempfile::{tempdir, NamedTempFile};

    use crate::support::read_capture;

    /// JSON-lines trace -> capture service -> files on disk
    #[tokio::test]
    async fn test_trace_replay_through_service() {
        let mut trace = NamedTempFile::new().unwrap();
        writeln!(trace, "# two-node exchange").unwrap();
        writeln!(trace, r#"{{"sim_time": 1000, "sender": 1, "destinations": [2], "payload": [1, 2]}}"#).unwrap();
        writeln!(trace).unwrap();
        writeln!(trace, r#"{{"sim_time": 2000, "sender": 2, "destinations": [1], "payload": [170]}}"#).unwrap();
        writeln!(trace, r#"{{"sim_time": 3000, "sender": 2, "payload": [9]}}"#).unwrap();
        trace.flush().unwrap();

        let events = config_loader::load_trace(trace.path()).unwrap();
        assert_eq!(events.len(), 3);

        let dir = tempdir().unwrap();
        let fanout = TransmissionFanout::new(2, SimulationClock::new(100));
        let (service, handle) = CaptureService::new(fanout, 2);
        let task = service.spawn();

        let producer = handle.clone();
        let report = handle.configure(dir.path().join("trace.pcap")).await.unwrap();
        assert!(report.is_clean());

        let feeder = tokio::spawn(async move {
            for event in events {
                producer.transmit(event).await.unwrap();
            }
        });
        feeder.await.unwrap();
        handle.shutdown().await.unwrap();

        let summary = task.await.unwrap();
        assert_eq!(summary.transmissions, 3);
        assert_eq!(summary.records_written, 5);
        assert_eq!(summary.transmission_errors, 0);
        assert!(summary.teardown.is_clean());

        let (_, sender) = read_capture(&dir.path().join("trace.pcap"));
        assert_eq!(
            sender,
            vec![(1100, vec![1, 2]), (2100, vec![170]), (3100, vec![9])]
        );
        assert_eq!(read_capture(&dir.path().join("trace_1.pcap")).1, vec![(2100, vec![170])]);
        assert_eq!(read_capture(&dir.path().join("trace_2.pcap")).1, vec![(1100, vec![1, 2])]);
    }

    /// Dropping every handle revokes the subscription and closes the files
    #[tokio::test]
    async fn test_dropping_handles_tears_down() {
        let dir = tempdir().unwrap();
        let fanout = TransmissionFanout::new(1, SimulationClock::default());
        let (service, handle) = CaptureService::new(fanout, 4);
        let task = service.spawn();

        handle.configure(dir.path().join("radio")).await.unwrap();
        handle
            .transmit(crate::support::event(5, 1, &[1], &[0xEE]))
            .await
            .unwrap();
        drop(handle);

        let summary = task.await.unwrap();
        assert_eq!(summary.records_written, 2);
        assert_eq!(read_capture(&dir.path().join("radio_1.pcap")).1, vec![(5, vec![0xEE])]);
    }
}
