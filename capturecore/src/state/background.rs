use crate::event::Event;
use crate::refcount::RefCounted;
use crate::resource::ResourceConstructed;

use super::{discard, BackgroundWithSurface, Foreground, Outcome, StateKind, Uninitialized};

/// The app is in the background and no surface is available.
#[derive(Debug)]
pub struct Background {
    constructed: RefCounted<ResourceConstructed>,
}

impl Background {
    /// Module finished initialization.
    pub fn from_uninitialized(previous: &Uninitialized) -> Self {
        Self::carrying(previous.constructed())
    }

    /// App paused before a surface arrived.
    pub fn from_foreground(previous: &Foreground) -> Self {
        Self::carrying(previous.constructed())
    }

    /// Surface destroyed while in the background.
    pub fn from_background_with_surface(previous: &BackgroundWithSurface) -> Self {
        Self::carrying(previous.constructed())
    }

    fn carrying(constructed: &RefCounted<ResourceConstructed>) -> Self {
        Self {
            constructed: constructed.add_ref(),
        }
    }

    pub(crate) fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::Resume => Outcome::to(Foreground::from_background(self)),
            Event::SurfaceAvailable(surface) => {
                Outcome::to(BackgroundWithSurface::from_background(self, surface))
            }
            other => discard(StateKind::Background, other),
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
