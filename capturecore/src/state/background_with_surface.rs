use std::sync::Arc;

use crate::event::Event;
use crate::host::RenderSurface;
use crate::refcount::RefCounted;
use crate::resource::{ResourceConstructed, ResourceSurface};

use super::{
    discard, resize_surface, Background, ForegroundWithSurface, OpeningCamera, Outcome,
    Previewing, StartingPreview, StateKind,
};

/// The app is in the background while its rendering surface is kept alive.
#[derive(Debug)]
pub struct BackgroundWithSurface {
    constructed: RefCounted<ResourceConstructed>,
    surface: RefCounted<ResourceSurface>,
}

impl BackgroundWithSurface {
    /// Surface became available while in the background.
    pub fn from_background(previous: &Background, surface: Arc<dyn RenderSurface>) -> Self {
        let constructed = previous.constructed().add_ref();
        let surface = {
            let services = constructed.get();
            ResourceSurface::create(
                surface,
                services.preview_calculator(),
                Arc::clone(services.module_ui()),
                services.tracker(),
            )
        };
        Self {
            constructed,
            surface,
        }
    }

    /// App paused while the camera was opening.
    pub fn from_opening_camera(previous: &OpeningCamera) -> Self {
        Self::carrying(previous.constructed(), previous.surface())
    }

    /// App paused while the preview was starting.
    pub fn from_starting_preview(previous: &StartingPreview) -> Self {
        Self::carrying(previous.constructed(), previous.surface())
    }

    /// App paused during preview.
    pub fn from_previewing(previous: &Previewing) -> Self {
        Self::carrying(previous.constructed(), previous.surface())
    }

    fn carrying(
        constructed: &RefCounted<ResourceConstructed>,
        surface: &RefCounted<ResourceSurface>,
    ) -> Self {
        Self {
            constructed: constructed.add_ref(),
            surface: surface.add_ref(),
        }
    }

    pub(crate) fn on_enter(&mut self) -> Outcome {
        // Any camera that streamed into the surface has been left behind.
        self.surface.get().unbind_preview();
        Outcome::Stable
    }

    pub(crate) fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::Resume => Outcome::to(ForegroundWithSurface::from_background_with_surface(self)),
            Event::SurfaceDestroyed => Outcome::to(Background::from_background_with_surface(self)),
            Event::SurfaceSizeChanged(size) => {
                resize_surface(StateKind::BackgroundWithSurface, &self.surface, size)
            }
            other => discard(StateKind::BackgroundWithSurface, other),
        }
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
}
