use std::fmt;
use std::sync::Arc;

use crate::host::OpenedCamera;
use crate::refcount::RefCounted;
use crate::resource::tracker::ResourceTracker;
use crate::types::{CameraCharacteristics, Facing, Size};

/// An opened camera device with the parameters it was opened for.
pub struct ResourceOpenedCamera {
    camera: Box<dyn OpenedCamera>,
    characteristics: CameraCharacteristics,
    preview_size: Size,
}

impl ResourceOpenedCamera {
    /// Tracker label for this bundle.
    pub const KIND: &'static str = "opened_camera";

    /// Takes ownership of a freshly opened device.
    ///
    /// The device is closed when the last reference goes away.
    pub fn create(
        camera: Box<dyn OpenedCamera>,
        characteristics: CameraCharacteristics,
        preview_size: Size,
        tracker: &Arc<ResourceTracker>,
    ) -> RefCounted<Self> {
        RefCounted::new_tracked(
            Self::KIND,
            Self {
                camera,
                characteristics,
                preview_size,
            },
            tracker,
            |resource: &Self| {
                tracing::debug!(facing = %resource.facing(), "closing camera");
                resource.camera.close();
            },
        )
    }

    /// The device.
    pub fn camera(&self) -> &dyn OpenedCamera {
        self.camera.as_ref()
    }

    /// Facing the device was opened for.
    pub fn facing(&self) -> Facing {
        self.characteristics.facing
    }

    /// Characteristics queried before opening.
    pub const fn characteristics(&self) -> &CameraCharacteristics {
        &self.characteristics
    }

    /// Preview stream size chosen for the surface.
    pub const fn preview_size(&self) -> Size {
        self.preview_size
    }
}

impl fmt::Debug for ResourceOpenedCamera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceOpenedCamera")
            .field("camera_id", &self.characteristics.camera_id)
            .field("facing", &self.facing())
            .field("preview_size", &self.preview_size)
            .finish_non_exhaustive()
    }
}
