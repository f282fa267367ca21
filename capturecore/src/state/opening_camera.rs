use crate::event::Event;
use crate::host::OpenedCamera;
use crate::refcount::RefCounted;
use crate::resource::{ResourceConstructed, ResourceSurface};
use crate::types::{CameraCharacteristics, Facing, Size};

use super::{
    discard, resize_surface, BackgroundWithSurface, Fatal, Foreground, ForegroundWithSurface,
    Outcome, StartingPreview, StateKind,
};

/// Waiting for the hardware to finish opening the camera.
///
/// The open is started on entry; its completion arrives as a later event.
#[derive(Debug)]
pub struct OpeningCamera {
    constructed: RefCounted<ResourceConstructed>,
    surface: RefCounted<ResourceSurface>,
    characteristics: CameraCharacteristics,
    preview_size: Size,
}

impl OpeningCamera {
    /// Camera described successfully; carries both references forward.
    pub fn from_foreground_with_surface(
        previous: &ForegroundWithSurface,
        characteristics: CameraCharacteristics,
        preview_size: Size,
    ) -> Self {
        Self {
            constructed: previous.constructed().add_ref(),
            surface: previous.surface().add_ref(),
            characteristics,
            preview_size,
        }
    }

    pub(crate) fn on_enter(&mut self) -> Outcome {
        let services = self.constructed.get();
        tracing::info!(
            facing = %self.facing(),
            camera_id = %self.characteristics.camera_id,
            preview = %self.preview_size,
            "opening camera"
        );
        services
            .camera_opener()
            .open(&self.characteristics, services.events().clone());
        Outcome::Stable
    }

    pub(crate) fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::CameraOpenSucceeded(camera) => self.on_opened(camera),
            Event::CameraOpenFailed(err) => {
                tracing::error!(facing = %self.facing(), error = %err, "camera failed to open");
                Outcome::to(Fatal::from_failure(&self.constructed, err.into()))
            }
            Event::Pause => Outcome::to(BackgroundWithSurface::from_opening_camera(self)),
            Event::SurfaceDestroyed => Outcome::to(Foreground::from_opening_camera(self)),
            Event::SurfaceSizeChanged(size) => {
                resize_surface(StateKind::OpeningCamera, &self.surface, size)
            }
            other => discard(StateKind::OpeningCamera, other),
        }
    }

    fn on_opened(&self, camera: Box<dyn OpenedCamera>) -> Outcome {
        if camera.facing() != self.facing() {
            tracing::warn!(
                expected = %self.facing(),
                actual = %camera.facing(),
                "opened camera does not match the requested facing; closing it"
            );
            camera.close();
            return Outcome::Stable;
        }
        Outcome::to(StartingPreview::from_opening_camera(self, camera))
    }

    pub(crate) fn on_leave(self) {
        self.constructed.close();
        self.surface.close();
    }

    /// Module services reference.
    pub const fn constructed(&self) -> &RefCounted<ResourceConstructed> {
        &self.constructed
    }

    /// Surface reference.
    pub const fn surface(&self) -> &RefCounted<ResourceSurface> {
        &self.surface
    }

    /// Facing being opened.
    pub const fn facing(&self) -> Facing {
        self.characteristics.facing
    }

    /// Characteristics of the camera being opened.
    pub const fn characteristics(&self) -> &CameraCharacteristics {
        &self.characteristics
    }

    /// Preview size chosen for the surface.
    pub const fn preview_size(&self) -> Size {
        self.preview_size
    }
}
