//! TransmissionEvent - Medium output
//!
//! One radio transmission as seen by the capture engine.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{NodeId, SimTime};

/// A single radio transmission.
///
/// `destinations` only lists nodes that received the frame; interfered or
/// out-of-range receivers are filtered out by the medium before the event
/// reaches the capture engine. The payload is written to capture files
/// exactly as transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionEvent {
    /// Simulated start time of the transmission
    pub sim_time: SimTime,

    /// Transmitting node
    pub sender: NodeId,

    /// Nodes that successfully received the frame
    #[serde(default)]
    pub destinations: BTreeSet<NodeId>,

    /// Raw frame bytes
    pub payload: Bytes,
}

impl TransmissionEvent {
    /// Create a new event
    pub fn new(
        sim_time: SimTime,
        sender: NodeId,
        destinations: impl IntoIterator<Item = NodeId>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            sim_time,
            sender,
            destinations: destinations.into_iter().collect(),
            payload: payload.into(),
        }
    }
}
