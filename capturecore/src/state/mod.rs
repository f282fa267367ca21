//! Lifecycle states.
//!
//! Each state is a struct owning the counted references it needs, gathered
//! into the [`State`] sum type. A state is only built through `from_*`
//! constructors on the *target* state, one per legal incoming edge, taking the
//! predecessor by reference. Constructors that carry a resource forward add a
//! reference to it; constructors that receive a raw resource wrap it in a new
//! counted reference.
//!
//! The hooks follow one contract:
//!
//! - `on_enter` establishes the state's invariants and is total: any failure
//!   becomes an [`Outcome::TransitionTo`] a `Fatal` state.
//! - `handle` reacts to an external event while the state is current.
//! - `on_leave` consumes the state, releasing every reference it holds. Since
//!   the references are guards, a state dropped on any other path releases
//!   them too.

mod background;
mod background_with_surface;
mod fatal;
mod foreground;
mod foreground_with_surface;
mod opening_camera;
mod previewing;
mod starting_preview;
mod uninitialized;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use background::Background;
pub use background_with_surface::BackgroundWithSurface;
pub use fatal::Fatal;
pub use foreground::Foreground;
pub use foreground_with_surface::ForegroundWithSurface;
pub use opening_camera::OpeningCamera;
pub use previewing::Previewing;
pub use starting_preview::StartingPreview;
pub use uninitialized::Uninitialized;

use crate::event::Event;
use crate::refcount::RefCounted;
use crate::resource::{ResourceConstructed, ResourceOpenedCamera, ResourceSurface};

/// What the driver should do after a hook or event handler ran.
#[derive(Debug)]
pub enum Outcome {
    /// The current state stays current.
    Stable,
    /// Leave the current state and enter this one.
    TransitionTo(State),
}

impl Outcome {
    /// Shorthand for a transition.
    pub fn to(state: impl Into<State>) -> Self {
        Self::TransitionTo(state.into())
    }
}

/// Payload-free discriminant of [`State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// Module constructed, not yet initialized.
    Uninitialized,
    /// App in background, no surface.
    Background,
    /// App in foreground, no surface.
    Foreground,
    /// App in background, surface available.
    BackgroundWithSurface,
    /// App in foreground, surface available; transient.
    ForegroundWithSurface,
    /// Waiting for the camera to open.
    OpeningCamera,
    /// Waiting for preview frames.
    StartingPreview,
    /// Preview running.
    Previewing,
    /// Lifecycle cannot continue.
    Fatal,
}

impl StateKind {
    /// True for the sink state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Fatal)
    }

    /// True for states owning a surface reference.
    pub const fn has_surface(self) -> bool {
        matches!(
            self,
            Self::BackgroundWithSurface
                | Self::ForegroundWithSurface
                | Self::OpeningCamera
                | Self::StartingPreview
                | Self::Previewing
        )
    }

    /// True for states owning an opened camera.
    pub const fn has_camera(self) -> bool {
        matches!(self, Self::StartingPreview | Self::Previewing)
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A node of the lifecycle graph with the resources it owns.
#[derive(Debug)]
pub enum State {
    /// See [`Uninitialized`].
    Uninitialized(Uninitialized),
    /// See [`Background`].
    Background(Background),
    /// See [`Foreground`].
    Foreground(Foreground),
    /// See [`BackgroundWithSurface`].
    BackgroundWithSurface(BackgroundWithSurface),
    /// See [`ForegroundWithSurface`].
    ForegroundWithSurface(ForegroundWithSurface),
    /// See [`OpeningCamera`].
    OpeningCamera(OpeningCamera),
    /// See [`StartingPreview`].
    StartingPreview(StartingPreview),
    /// See [`Previewing`].
    Previewing(Previewing),
    /// See [`Fatal`].
    Fatal(Fatal),
}

impl State {
    /// The state's discriminant.
    pub const fn kind(&self) -> StateKind {
        match self {
            Self::Uninitialized(_) => StateKind::Uninitialized,
            Self::Background(_) => StateKind::Background,
            Self::Foreground(_) => StateKind::Foreground,
            Self::BackgroundWithSurface(_) => StateKind::BackgroundWithSurface,
            Self::ForegroundWithSurface(_) => StateKind::ForegroundWithSurface,
            Self::OpeningCamera(_) => StateKind::OpeningCamera,
            Self::StartingPreview(_) => StateKind::StartingPreview,
            Self::Previewing(_) => StateKind::Previewing,
            Self::Fatal(_) => StateKind::Fatal,
        }
    }

    /// Runs the entry hook.
    pub fn on_enter(&mut self) -> Outcome {
        match self {
            Self::BackgroundWithSurface(state) => state.on_enter(),
            Self::ForegroundWithSurface(state) => state.on_enter(),
            Self::OpeningCamera(state) => state.on_enter(),
            Self::StartingPreview(state) => state.on_enter(),
            Self::Previewing(state) => state.on_enter(),
            Self::Fatal(state) => state.on_enter(),
            Self::Uninitialized(_) | Self::Background(_) | Self::Foreground(_) => Outcome::Stable,
        }
    }

    /// Reacts to an external event while current.
    pub fn handle(&mut self, event: Event) -> Outcome {
        match self {
            Self::Uninitialized(state) => state.handle(event),
            Self::Background(state) => state.handle(event),
            Self::Foreground(state) => state.handle(event),
            Self::BackgroundWithSurface(state) => state.handle(event),
            Self::ForegroundWithSurface(state) => state.handle(event),
            Self::OpeningCamera(state) => state.handle(event),
            Self::StartingPreview(state) => state.handle(event),
            Self::Previewing(state) => state.handle(event),
            Self::Fatal(state) => state.handle(event),
        }
    }

    /// Runs the exit hook, releasing every reference the state holds.
    pub fn on_leave(self) {
        match self {
            Self::Uninitialized(state) => state.on_leave(),
            Self::Background(state) => state.on_leave(),
            Self::Foreground(state) => state.on_leave(),
            Self::BackgroundWithSurface(state) => state.on_leave(),
            Self::ForegroundWithSurface(state) => state.on_leave(),
            Self::OpeningCamera(state) => state.on_leave(),
            Self::StartingPreview(state) => state.on_leave(),
            Self::Previewing(state) => state.on_leave(),
            Self::Fatal(state) => state.on_leave(),
        }
    }

    /// The module-scoped services reference held by this state.
    pub const fn constructed(&self) -> &RefCounted<ResourceConstructed> {
        match self {
            Self::Uninitialized(state) => state.constructed(),
            Self::Background(state) => state.constructed(),
            Self::Foreground(state) => state.constructed(),
            Self::BackgroundWithSurface(state) => state.constructed(),
            Self::ForegroundWithSurface(state) => state.constructed(),
            Self::OpeningCamera(state) => state.constructed(),
            Self::StartingPreview(state) => state.constructed(),
            Self::Previewing(state) => state.constructed(),
            Self::Fatal(state) => state.constructed(),
        }
    }

    /// The surface reference, for states that hold one.
    pub const fn surface(&self) -> Option<&RefCounted<ResourceSurface>> {
        match self {
            Self::BackgroundWithSurface(state) => Some(state.surface()),
            Self::ForegroundWithSurface(state) => Some(state.surface()),
            Self::OpeningCamera(state) => Some(state.surface()),
            Self::StartingPreview(state) => Some(state.surface()),
            Self::Previewing(state) => Some(state.surface()),
            Self::Uninitialized(_) | Self::Background(_) | Self::Foreground(_) | Self::Fatal(_) => {
                None
            }
        }
    }

    /// The opened camera reference, for states that hold one.
    pub const fn camera(&self) -> Option<&RefCounted<ResourceOpenedCamera>> {
        match self {
            Self::StartingPreview(state) => Some(state.camera()),
            Self::Previewing(state) => Some(state.camera()),
            _ => None,
        }
    }
}

macro_rules! impl_into_state {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for State {
                fn from(state: $variant) -> Self {
                    Self::$variant(state)
                }
            }
        )*
    };
}

impl_into_state!(
    Uninitialized,
    Background,
    Foreground,
    BackgroundWithSurface,
    ForegroundWithSurface,
    OpeningCamera,
    StartingPreview,
    Previewing,
    Fatal,
);

/// Handles an event the current state has no edge for.
///
/// The event is dropped with a debug log, except when it carries a host
/// resource the state will not take: a camera that finished opening after its
/// state was left is closed, and a surface delivered where no edge accepts it
/// is released.
pub(crate) fn discard(current: StateKind, event: Event) -> Outcome {
    match &event {
        Event::CameraOpenSucceeded(camera) => {
            tracing::warn!(
                state = %current,
                facing = %camera.facing(),
                "stale camera open completion; closing device"
            );
        }
        Event::SurfaceAvailable(surface) => {
            tracing::warn!(
                state = %current,
                size = %surface.size(),
                "surface not accepted in this state; releasing it"
            );
        }
        other => {
            tracing::debug!(state = %current, event = %other.kind(), "event ignored");
        }
    }
    event.reclaim();
    Outcome::Stable
}

/// Applies a surface size change to a state's surface and republishes the
/// transform when a preview is bound to it.
pub(crate) fn resize_surface(
    current: StateKind,
    surface: &RefCounted<ResourceSurface>,
    size: crate::types::Size,
) -> Outcome {
    tracing::debug!(state = %current, %size, "surface size changed");
    surface.get().set_surface_size(size);
    surface.get().update_preview_transform();
    Outcome::Stable
}
