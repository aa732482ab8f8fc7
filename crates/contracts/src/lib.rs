//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Simulated time is carried as microseconds since simulation start (`SimTime`)
//! - Capture files receive wall-clock microseconds produced by a `TimeSource`

mod blueprint;
mod error;
mod node_id;
mod time;
mod transmission;

pub use blueprint::*;
pub use error::*;
pub use node_id::NodeId;
pub use time::{SimTime, SimulationClock, TimeSource};
pub use transmission::TransmissionEvent;
