use crate::event::Event;
use crate::refcount::RefCounted;
use crate::resource::{ResourceConstructed, ResourceOpenedCamera, ResourceSurface};

use super::{
    discard, resize_surface, BackgroundWithSurface, Foreground, ForegroundWithSurface, Outcome,
    StartingPreview, StateKind,
};

/// Preview frames are flowing into the surface.
#[derive(Debug)]
pub struct Previewing {
    constructed: RefCounted<ResourceConstructed>,
    surface: RefCounted<ResourceSurface>,
    camera: RefCounted<ResourceOpenedCamera>,
}

impl Previewing {
    /// Preview stream started.
    pub fn from_starting_preview(previous: &StartingPreview) -> Self {
        Self {
            constructed: previous.constructed().add_ref(),
            surface: previous.surface().add_ref(),
            camera: previous.camera().add_ref(),
        }
    }

    pub(crate) fn on_enter(&mut self) -> Outcome {
        tracing::info!(facing = %self.camera.get().facing(), "preview running");
        self.constructed.get().module_ui().on_preview_started();
        Outcome::Stable
    }

    pub(crate) fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::Pause => Outcome::to(BackgroundWithSurface::from_previewing(self)),
            Event::SurfaceDestroyed => Outcome::to(Foreground::from_previewing(self)),
            Event::SurfaceSizeChanged(size) => {
                resize_surface(StateKind::Previewing, &self.surface, size)
            }
            Event::CameraCharacteristicsReady => {
                Outcome::to(ForegroundWithSurface::from_previewing(self))
            }
            other => discard(StateKind::Previewing, other),
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
