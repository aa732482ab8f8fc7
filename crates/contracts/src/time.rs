//! Simulated time and its conversion to capture timestamps

use serde::{Deserialize, Serialize};

/// Simulated time in microseconds since simulation start
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(u64);

impl SimTime {
    pub const ZERO: Self = Self(0);

    /// Create from microseconds
    #[inline]
    pub const fn from_micros(us: u64) -> Self {
        Self(us)
    }

    /// Raw microseconds
    #[inline]
    pub const fn as_micros(self) -> u64 {
        self.0
    }
}

/// Time collaborator: converts simulated time to wall-clock microseconds.
///
/// Implementations are expected to be monotonic non-decreasing within a run.
/// Callers do not enforce it; out-of-order timestamps are written as given.
pub trait TimeSource {
    /// Wall-clock microseconds since the Unix epoch
    fn to_wall_clock(&self, sim_time: SimTime) -> u64;
}

/// Maps simulated time onto the wall-clock instant the simulation started at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulationClock {
    /// Wall-clock microseconds at simulated time zero
    pub epoch_us: u64,
}

impl SimulationClock {
    pub fn new(epoch_us: u64) -> Self {
        Self { epoch_us }
    }
}

impl TimeSource for SimulationClock {
    fn to_wall_clock(&self, sim_time: SimTime) -> u64 {
        self.epoch_us.saturating_add(sim_time.as_micros())
    }
}

impl<F> TimeSource for F
where
    F: Fn(SimTime) -> u64,
{
    fn to_wall_clock(&self, sim_time: SimTime) -> u64 {
        self(sim_time)
    }
}
