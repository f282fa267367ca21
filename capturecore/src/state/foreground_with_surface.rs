use std::sync::Arc;

use crate::errors::FatalReason;
use crate::event::Event;
use crate::host::RenderSurface;
use crate::refcount::RefCounted;
use crate::resource::{ResourceConstructed, ResourceSurface};

use super::{
    discard, BackgroundWithSurface, Fatal, Foreground, OpeningCamera, Outcome, Previewing,
    StateKind,
};

/// The app is in the foreground and the surface is available.
///
/// Transient: entering it immediately queries the camera and moves on to
/// [`OpeningCamera`], or to [`Fatal`] if the camera cannot be described.
#[derive(Debug)]
pub struct ForegroundWithSurface {
    constructed: RefCounted<ResourceConstructed>,
    surface: RefCounted<ResourceSurface>,
}

impl ForegroundWithSurface {
    /// Surface just became available in the foreground; wraps it in a new
    /// counted reference.
    pub fn from_foreground(previous: &Foreground, surface: Arc<dyn RenderSurface>) -> Self {
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

    /// App resumed with a surface kept from before the pause; shares it.
    pub fn from_background_with_surface(previous: &BackgroundWithSurface) -> Self {
        Self::carrying(previous.constructed(), previous.surface())
    }

    /// Facing preference changed during preview; the current camera is dropped
    /// and the new one is described from scratch.
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
        self.surface.get().unbind_preview();
        let services = self.constructed.get();
        let facing = services.camera_facing();
        let characteristics = match services.camera_manager().camera_characteristics(facing) {
            Ok(characteristics) => characteristics,
            Err(err) => {
                tracing::error!(%facing, error = %err, "camera characteristics unavailable");
                return Outcome::to(Fatal::from_failure(&self.constructed, err.into()));
            }
        };

        let surface = self.surface.get();
        let Some(preview_size) = surface
            .calculator()
            .choose_preview_size(&characteristics, surface.surface_size())
        else {
            tracing::error!(%facing, "camera reports no preview sizes");
            return Outcome::to(Fatal::from_failure(
                &self.constructed,
                FatalReason::NoPreviewSize(facing),
            ));
        };

        Outcome::to(OpeningCamera::from_foreground_with_surface(
            self,
            characteristics,
            preview_size,
        ))
    }

    pub(crate) fn handle(&mut self, event: Event) -> Outcome {
        discard(StateKind::ForegroundWithSurface, event)
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
