//! Error types for CaptureCore.
//!
//! The lifecycle separates failures into three families:
//!
//! - **Hardware access** ([`CameraAccessError`], [`CameraOpenError`],
//!   [`PreviewStartError`]): reported by collaborators. States never let these
//!   escape; they resolve them into a transition to `Fatal`.
//! - **Contract violations**: using a counted reference after its count reached
//!   zero, or a runaway chain of transitions. These are programmer errors and
//!   panic immediately instead of returning an error.
//! - **Plumbing** ([`DriverError`], [`ConfigError`]): the event queue being gone,
//!   or configuration values outside their valid range.

use thiserror::Error;

use crate::config::{BacklogWarnThresholdError, MaxChainedTransitionsError};
use crate::types::{CameraIdError, Facing, PixelDimensionError};

/// Failure to query a camera device through the hardware manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraAccessError {
    /// Camera access is disabled by device policy.
    #[error("camera access disabled by policy")]
    Disabled,

    /// The camera service connection was lost.
    #[error("camera service disconnected")]
    Disconnected,

    /// No camera with the requested facing exists.
    #[error("no camera facing {0}")]
    NoSuchFacing(Facing),

    /// Device-specific failure reported by the driver.
    #[error("camera device error: {0}")]
    Device(String),
}

/// Failure reported asynchronously when opening a camera device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraOpenError {
    /// Another client holds the device.
    #[error("camera in use by another client")]
    InUse,

    /// The hardware layer could not reach the device.
    #[error(transparent)]
    Access(#[from] CameraAccessError),
}

/// Failure reported asynchronously when starting the preview stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewStartError {
    /// The capture session could not be configured for the surface.
    #[error("capture session configuration failed: {0}")]
    SessionConfiguration(String),

    /// The device disconnected while the preview was starting.
    #[error("camera disconnected while starting preview")]
    Disconnected,
}

/// Why the lifecycle entered `Fatal`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalReason {
    /// Characteristics query failed.
    #[error("camera access failed: {0}")]
    CameraAccess(#[from] CameraAccessError),

    /// The camera reported no preview size usable with the surface.
    #[error("camera facing {0} offers no preview size")]
    NoPreviewSize(Facing),

    /// Opening the camera failed.
    #[error("opening camera failed: {0}")]
    CameraOpen(#[from] CameraOpenError),

    /// Starting the preview failed.
    #[error("starting preview failed: {0}")]
    PreviewStart(#[from] PreviewStartError),
}

/// Errors from the event queue plumbing around the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The driver consuming the queue has shut down.
    #[error("event queue closed; the session driver has shut down")]
    QueueClosed,
}

/// Invalid configuration or domain value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Chained transition limit outside the valid range.
    #[error("invalid max chained transitions: {0}")]
    MaxChainedTransitions(#[from] MaxChainedTransitionsError),

    /// Backlog warning threshold outside the valid range.
    #[error("invalid backlog warning threshold: {0}")]
    BacklogWarnThreshold(#[from] BacklogWarnThresholdError),

    /// Pixel dimension outside the valid range.
    #[error("invalid pixel dimension: {0}")]
    PixelDimension(#[from] PixelDimensionError),

    /// Camera identifier empty or too long.
    #[error("invalid camera id: {0}")]
    CameraId(#[from] CameraIdError),
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_errors_convert_into_open_errors() {
        let err: CameraOpenError = CameraAccessError::Disconnected.into();
        assert_eq!(err.to_string(), "camera service disconnected");
    }

    #[test]
    fn no_such_facing_names_the_facing() {
        assert_eq!(
            CameraAccessError::NoSuchFacing(Facing::Front).to_string(),
            "no camera facing front"
        );
    }
}
