//! Capability interfaces the lifecycle calls into.
//!
//! The camera driver, the rendering surface, orientation tracking and the UI
//! are owned by the host application. The lifecycle only sees them through
//! these traits. Operations that complete asynchronously on the host side
//! (opening a camera, starting a preview) are *initiated* here and report back
//! by sending an [`Event`](crate::event::Event) through the supplied
//! [`EventSender`], never by blocking the caller.

use std::fmt;
use std::sync::Arc;

use crate::driver::EventSender;
use crate::errors::{CameraAccessError, FatalReason};
use crate::types::{CameraCharacteristics, Facing, PreviewTransform, Rotation, Size};

/// Hardware manager answering characteristics queries.
pub trait CameraManager: Send + Sync {
    /// Characteristics of the camera with the given facing.
    ///
    /// Must be fast and local; it runs inside an entry hook.
    fn camera_characteristics(
        &self,
        facing: Facing,
    ) -> Result<CameraCharacteristics, CameraAccessError>;
}

/// Starts asynchronous camera opens.
pub trait CameraOpener: Send + Sync {
    /// Begins opening the described camera.
    ///
    /// Completion arrives later as `CameraOpenSucceeded` or `CameraOpenFailed`.
    fn open(&self, characteristics: &CameraCharacteristics, events: EventSender);
}

/// A camera device that finished opening.
pub trait OpenedCamera: Send + Sync {
    /// Facing of the device.
    fn facing(&self) -> Facing;

    /// Begins streaming preview frames of `preview_size` into `surface`.
    ///
    /// Completion arrives later as `PreviewStartSucceeded` or
    /// `PreviewStartFailed`.
    fn start_preview(&self, surface: &dyn RenderSurface, preview_size: Size, events: EventSender);

    /// Closes the device. Called exactly once, when the last reference to it
    /// is released.
    fn close(&self);
}

/// Rendering target handed over by the host when it becomes available.
pub trait RenderSurface: Send + Sync {
    /// Current size of the surface.
    fn size(&self) -> Size;

    /// Sets the size of the buffers the producer writes into the surface.
    fn set_default_buffer_size(&self, size: Size);

    /// Ends the lifecycle's use of the surface.
    fn release(&self);
}

/// Tracks the physical orientation of the device.
pub trait OrientationManager: Send + Sync {
    /// Current clockwise rotation of the display from its natural orientation.
    fn display_rotation(&self) -> Rotation;

    /// Starts listening for orientation changes.
    fn resume(&self);

    /// Stops listening for orientation changes.
    fn pause(&self);
}

/// The host UI layer bound to this module.
pub trait ModuleUi: Send + Sync {
    /// Applies a new preview transform to the rendering surface.
    fn update_preview_transform(&self, transform: PreviewTransform);

    /// Preview frames are flowing.
    fn on_preview_started(&self);

    /// The lifecycle reached `Fatal`; the host is expected to tear down the
    /// module.
    fn show_fatal_error(&self, reason: &FatalReason);
}

/// Persisted camera-facing preference.
pub trait FacingSetting: Send + Sync {
    /// The preferred facing, if the user expressed one.
    fn camera_facing(&self) -> Option<Facing>;

    /// Stores a new preference.
    fn set_camera_facing(&self, facing: Facing);
}

/// Every host-provided service the lifecycle needs, bundled once at module
/// construction.
#[derive(Clone)]
pub struct HostServices {
    /// Characteristics queries.
    pub camera_manager: Arc<dyn CameraManager>,
    /// Asynchronous camera opens.
    pub camera_opener: Arc<dyn CameraOpener>,
    /// Device orientation.
    pub orientation_manager: Arc<dyn OrientationManager>,
    /// UI binding.
    pub module_ui: Arc<dyn ModuleUi>,
    /// Facing preference.
    pub facing_setting: Arc<dyn FacingSetting>,
}

impl fmt::Debug for HostServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}
