//! Capture service error types

use thiserror::Error;

/// Errors returned by [`CaptureHandle`](crate::CaptureHandle)
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service task has exited; the subscription is revoked
    #[error("capture service stopped")]
    Stopped,

    /// The service dropped a request without replying
    #[error("capture service dropped the '{operation}' request")]
    NoReply { operation: &'static str },
}
