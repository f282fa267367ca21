use crate::errors::FatalReason;
use crate::event::Event;
use crate::refcount::RefCounted;
use crate::resource::ResourceConstructed;

use super::{discard, Outcome, StateKind};

/// The lifecycle cannot continue; the host is expected to tear the module
/// down.
///
/// Accepts only the module services reference from the failing state: any
/// other resource stays with that state and is released when it leaves. Every
/// event is absorbed.
#[derive(Debug)]
pub struct Fatal {
    constructed: RefCounted<ResourceConstructed>,
    reason: FatalReason,
}

impl Fatal {
    /// Entered from any state whose setup or hardware operation failed.
    pub fn from_failure(constructed: &RefCounted<ResourceConstructed>, reason: FatalReason) -> Self {
        Self {
            constructed: constructed.add_ref(),
            reason,
        }
    }

    pub(crate) fn on_enter(&mut self) -> Outcome {
        tracing::error!(reason = %self.reason, "capture lifecycle entered fatal state");
        self.constructed.get().module_ui().show_fatal_error(&self.reason);
        Outcome::Stable
    }

    pub(crate) fn handle(&mut self, event: Event) -> Outcome {
        discard(StateKind::Fatal, event)
    }

    pub(crate) fn on_leave(self) {
        self.constructed.close();
    }

    /// Module services reference.
    pub const fn constructed(&self) -> &RefCounted<ResourceConstructed> {
        &self.constructed
    }

    /// Why the lifecycle failed.
    pub const fn reason(&self) -> &FatalReason {
        &self.reason
    }
}
