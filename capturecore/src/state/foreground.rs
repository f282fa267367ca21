use crate::event::Event;
use crate::refcount::RefCounted;
use crate::resource::ResourceConstructed;

use super::{
    discard, Background, ForegroundWithSurface, OpeningCamera, Outcome, Previewing,
    StartingPreview, StateKind,
};

/// The app is in the foreground, waiting for its rendering surface.
#[derive(Debug)]
pub struct Foreground {
    constructed: RefCounted<ResourceConstructed>,
}

impl Foreground {
    /// App resumed without a surface.
    pub fn from_background(previous: &Background) -> Self {
        Self::carrying(previous.constructed())
    }

    /// Surface destroyed while the camera was opening.
    pub fn from_opening_camera(previous: &OpeningCamera) -> Self {
        Self::carrying(previous.constructed())
    }

    /// Surface destroyed while the preview was starting.
    pub fn from_starting_preview(previous: &StartingPreview) -> Self {
        Self::carrying(previous.constructed())
    }

    /// Surface destroyed during preview.
    pub fn from_previewing(previous: &Previewing) -> Self {
        Self::carrying(previous.constructed())
    }

    fn carrying(constructed: &RefCounted<ResourceConstructed>) -> Self {
        Self {
            constructed: constructed.add_ref(),
        }
    }

    pub(crate) fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::Pause => Outcome::to(Background::from_foreground(self)),
            Event::SurfaceAvailable(surface) => {
                Outcome::to(ForegroundWithSurface::from_foreground(self, surface))
            }
            other => discard(StateKind::Foreground, other),
        }
    }

    pub(crate) fn on_leave(self) {
        self.constructed.close();
    }

    /// Module services reference.
    pub const fn constructed(&self) -> &RefCounted<ResourceConstructed> {
        &self.constructed
    }
}
