use crate::event::Event;
use crate::refcount::RefCounted;
use crate::resource::ResourceConstructed;

use super::{discard, Background, Outcome, StateKind};

/// The module exists but has not been initialized.
#[derive(Debug)]
pub struct Uninitialized {
    constructed: RefCounted<ResourceConstructed>,
}

impl Uninitialized {
    /// Initial state of a freshly constructed module.
    pub fn new(constructed: &RefCounted<ResourceConstructed>) -> Self {
        Self {
            constructed: constructed.add_ref(),
        }
    }

    pub(crate) fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::Initialize => Outcome::to(Background::from_uninitialized(self)),
            other => discard(StateKind::Uninitialized, other),
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
