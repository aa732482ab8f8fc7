//! Trace replay through the capture service.

mod recorder;
mod stats;

pub use recorder::{Recorder, RecorderConfig};
pub use stats::RunStats;
