//! # Fanout
//!
//! Radio capture demultiplexing.
//!
//! Responsibilities:
//! - Own one capture file per viewpoint (sender view + one per node)
//! - Replicate each transmission into the sender view and every receiver's view
//! - Isolate failing files so the rest of the capture keeps going

pub mod error;
pub mod fanout;
pub mod metrics;
pub mod report;
pub mod service;
pub mod sink;

pub use contracts::{CaptureError, TransmissionEvent};
pub use error::ServiceError;
pub use fanout::TransmissionFanout;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use report::OperationReport;
pub use service::{CaptureCommand, CaptureHandle, CaptureService, ServiceSummary};
pub use sink::CaptureSink;
