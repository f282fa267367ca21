//! `CaptureCore` - camera capture-session lifecycle
//!
//! Drives a camera module through a finite set of lifecycle states in response
//! to host lifecycle events and asynchronous hardware callbacks. Every
//! expensive resource (module services, the rendering surface, the opened
//! camera device) is owned through counted references, so it is released
//! exactly when the last state that needs it is left.
//!
//! The usual entry point is [`SessionDriver`]: build it from the host's
//! [`HostServices`], hand [`EventSender`]s to the callbacks, and run it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod driver;
pub mod errors;
pub mod event;
pub mod host;
pub mod machine;
pub mod preview;
pub mod refcount;
pub mod resource;
pub mod state;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(test)]
mod fakes;

pub use config::{BacklogWarnThreshold, LifecycleConfig, MaxChainedTransitions};
pub use driver::{
    event_queue, EventReceiver, EventSender, SessionDriver, SessionStatus, SessionSummary,
};
pub use errors::{
    CameraAccessError, CameraOpenError, ConfigError, DriverError, DriverResult, FatalReason,
    PreviewStartError,
};
pub use event::{Event, EventKind};
pub use host::{
    CameraManager, CameraOpener, FacingSetting, HostServices, ModuleUi, OpenedCamera,
    OrientationManager, RenderSurface,
};
pub use machine::{Cycle, StateMachine};
pub use preview::PreviewTransformCalculator;
pub use refcount::{RefCounted, RefProbe};
pub use resource::{
    ResourceConstructed, ResourceOpenedCamera, ResourceStats, ResourceSurface, ResourceTracker,
};
pub use state::{Outcome, State, StateKind};
pub use types::{
    CameraCharacteristics, CameraId, Facing, PixelDimension, PreviewTransform, ResourceId,
    Rotation, Size,
};
