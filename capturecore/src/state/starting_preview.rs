use crate::event::Event;
use crate::host::OpenedCamera;
use crate::refcount::RefCounted;
use crate::resource::{ResourceConstructed, ResourceOpenedCamera, ResourceSurface};

use super::{
    discard, resize_surface, BackgroundWithSurface, Fatal, Foreground, OpeningCamera, Outcome,
    Previewing, StateKind,
};

/// The camera is open and the preview stream is being started.
#[derive(Debug)]
pub struct StartingPreview {
    constructed: RefCounted<ResourceConstructed>,
    surface: RefCounted<ResourceSurface>,
    camera: RefCounted<ResourceOpenedCamera>,
}

impl StartingPreview {
    /// Camera finished opening; wraps the device in a new counted reference.
    pub fn from_opening_camera(previous: &OpeningCamera, camera: Box<dyn OpenedCamera>) -> Self {
        let constructed = previous.constructed().add_ref();
        let camera = ResourceOpenedCamera::create(
            camera,
            previous.characteristics().clone(),
            previous.preview_size(),
            constructed.get().tracker(),
        );
        Self {
            constructed,
            surface: previous.surface().add_ref(),
            camera,
        }
    }

    pub(crate) fn on_enter(&mut self) -> Outcome {
        let services = self.constructed.get();
        let surface = self.surface.get();
        let camera = self.camera.get();

        surface.bind_preview(
            camera.preview_size(),
            camera.characteristics().sensor_orientation,
        );
        surface.update_preview_transform();
        camera.camera().start_preview(
            surface.surface(),
            camera.preview_size(),
            services.events().clone(),
        );
        Outcome::Stable
    }

    pub(crate) fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::PreviewStartSucceeded => Outcome::to(Previewing::from_starting_preview(self)),
            Event::PreviewStartFailed(err) => {
                tracing::error!(error = %err, "preview failed to start");
                Outcome::to(Fatal::from_failure(&self.constructed, err.into()))
            }
            Event::Pause => Outcome::to(BackgroundWithSurface::from_starting_preview(self)),
            Event::SurfaceDestroyed => Outcome::to(Foreground::from_starting_preview(self)),
            Event::SurfaceSizeChanged(size) => {
                resize_surface(StateKind::StartingPreview, &self.surface, size)
            }
            other => discard(StateKind::StartingPreview, other),
        }
    }

    pub(crate) fn on_leave(self) {
        self.constructed.close();
        self.surface.close();
        self.camera.close();
    }

    /// Module services reference.
    pub const fn constructed(&self) -> &RefCounted<ResourceConstructed> {
        &self.constructed
    }

    /// Surface reference.
    pub const fn surface(&self) -> &RefCounted<ResourceSurface> {
        &self.surface
    }

    /// Opened camera reference.
    pub const fn camera(&self) -> &RefCounted<ResourceOpenedCamera> {
        &self.camera
    }
}
