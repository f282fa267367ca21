//! Inbound events driving the lifecycle.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{CameraOpenError, PreviewStartError};
use crate::host::{OpenedCamera, RenderSurface};
use crate::types::Size;

/// Something that happened in the host or the hardware.
pub enum Event {
    /// The module finished construction.
    Initialize,
    /// The host application moved to the foreground.
    Resume,
    /// The host application moved to the background.
    Pause,
    /// The rendering surface became available.
    SurfaceAvailable(Arc<dyn RenderSurface>),
    /// The rendering surface was destroyed by the host.
    SurfaceDestroyed,
    /// The rendering surface changed size.
    SurfaceSizeChanged(Size),
    /// The facing preference changed; characteristics for the new facing are
    /// ready to be queried.
    CameraCharacteristicsReady,
    /// An asynchronous camera open completed.
    CameraOpenSucceeded(Box<dyn OpenedCamera>),
    /// An asynchronous camera open failed.
    CameraOpenFailed(CameraOpenError),
    /// Preview frames started flowing.
    PreviewStartSucceeded,
    /// The preview stream could not be started.
    PreviewStartFailed(PreviewStartError),
}

/// Payload-free discriminant of [`Event`], for logging and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// See [`Event::Initialize`].
    Initialize,
    /// See [`Event::Resume`].
    Resume,
    /// See [`Event::Pause`].
    Pause,
    /// See [`Event::SurfaceAvailable`].
    SurfaceAvailable,
    /// See [`Event::SurfaceDestroyed`].
    SurfaceDestroyed,
    /// See [`Event::SurfaceSizeChanged`].
    SurfaceSizeChanged,
    /// See [`Event::CameraCharacteristicsReady`].
    CameraCharacteristicsReady,
    /// See [`Event::CameraOpenSucceeded`].
    CameraOpenSucceeded,
    /// See [`Event::CameraOpenFailed`].
    CameraOpenFailed,
    /// See [`Event::PreviewStartSucceeded`].
    PreviewStartSucceeded,
    /// See [`Event::PreviewStartFailed`].
    PreviewStartFailed,
}

impl Event {
    /// The event's discriminant.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Initialize => EventKind::Initialize,
            Self::Resume => EventKind::Resume,
            Self::Pause => EventKind::Pause,
            Self::SurfaceAvailable(_) => EventKind::SurfaceAvailable,
            Self::SurfaceDestroyed => EventKind::SurfaceDestroyed,
            Self::SurfaceSizeChanged(_) => EventKind::SurfaceSizeChanged,
            Self::CameraCharacteristicsReady => EventKind::CameraCharacteristicsReady,
            Self::CameraOpenSucceeded(_) => EventKind::CameraOpenSucceeded,
            Self::CameraOpenFailed(_) => EventKind::CameraOpenFailed,
            Self::PreviewStartSucceeded => EventKind::PreviewStartSucceeded,
            Self::PreviewStartFailed(_) => EventKind::PreviewStartFailed,
        }
    }

    /// Hands back the host resource an unconsumed event carries: a delivered
    /// camera is closed and a delivered surface released.
    ///
    /// Returns true if the event carried one.
    pub(crate) fn reclaim(self) -> bool {
        match self {
            Self::CameraOpenSucceeded(camera) => {
                camera.close();
                true
            }
            Self::SurfaceAvailable(surface) => {
                surface.release();
                true
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceAvailable(surface) => f
                .debug_tuple("SurfaceAvailable")
                .field(&surface.size())
                .finish(),
            Self::SurfaceSizeChanged(size) => f.debug_tuple("SurfaceSizeChanged").field(size).finish(),
            Self::CameraOpenSucceeded(camera) => f
                .debug_tuple("CameraOpenSucceeded")
                .field(&camera.facing())
                .finish(),
            Self::CameraOpenFailed(err) => f.debug_tuple("CameraOpenFailed").field(err).finish(),
            Self::PreviewStartFailed(err) => f.debug_tuple("PreviewStartFailed").field(err).finish(),
            other => fmt::Debug::fmt(&other.kind(), f),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
