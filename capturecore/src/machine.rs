//! The synchronous lifecycle driver.
//!
//! [`StateMachine::dispatch`] resolves one external event completely: the
//! current state handles it, and every transition requested by a handler or an
//! entry hook is applied in a loop until some state reports
//! [`Outcome::Stable`]. Nothing else can run in between, so from the outside
//! exactly one state is current at any time.
//!
//! A transition runs in this order:
//!
//! 1. the successor is constructed by its `from_*` factory, taking its own
//!    references while the predecessor still holds its references;
//! 2. the predecessor's `on_leave` releases the predecessor's references;
//! 3. the successor becomes current and its `on_enter` runs.
//!
//! Because of step 1, a resource handed from one state to the next never
//! passes through a zero count, and is released exactly when the last state
//! holding it leaves.

use serde::{Deserialize, Serialize};

use crate::config::LifecycleConfig;
use crate::event::{Event, EventKind};
use crate::refcount::RefCounted;
use crate::resource::ResourceConstructed;
use crate::state::{Outcome, State, StateKind, Uninitialized};

/// What one dispatch cycle did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    /// The event that started the cycle.
    pub event: EventKind,
    /// State current when the event arrived, followed by every state entered
    /// during the cycle. Empty if the machine was already shut down.
    pub path: Vec<StateKind>,
}

impl Cycle {
    /// State current once the cycle settled.
    pub fn settled(&self) -> Option<StateKind> {
        self.path.last().copied()
    }

    /// Number of transitions applied.
    pub fn transitions(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// True when the event left the current state in place.
    pub fn is_noop(&self) -> bool {
        self.transitions() == 0
    }
}

/// Holds the current state and applies transitions.
#[derive(Debug)]
pub struct StateMachine {
    current: Option<State>,
    module_ref: Option<RefCounted<ResourceConstructed>>,
    config: LifecycleConfig,
}

impl StateMachine {
    /// Builds a machine current in [`Uninitialized`].
    ///
    /// Takes over `constructed` as the module's own reference, which is
    /// released by [`StateMachine::shutdown`].
    pub fn new(constructed: RefCounted<ResourceConstructed>) -> Self {
        let config = *constructed.get().config();
        let mut initial = State::from(Uninitialized::new(&constructed));
        let outcome = initial.on_enter();
        debug_assert!(matches!(outcome, Outcome::Stable));
        tracing::debug!(state = %initial.kind(), "state machine created");
        Self {
            current: Some(initial),
            module_ref: Some(constructed),
            config,
        }
    }

    /// Kind of the current state, or `None` after shutdown.
    pub fn current_kind(&self) -> Option<StateKind> {
        self.current.as_ref().map(State::kind)
    }

    /// The current state, or `None` after shutdown.
    pub const fn current(&self) -> Option<&State> {
        self.current.as_ref()
    }

    /// True once the machine settled in `Fatal`.
    pub fn is_fatal(&self) -> bool {
        self.current_kind().is_some_and(StateKind::is_terminal)
    }

    /// True once [`StateMachine::shutdown`] ran.
    pub const fn is_shut_down(&self) -> bool {
        self.current.is_none()
    }

    /// The module's own reference to its services, until shutdown.
    pub const fn module_resources(&self) -> Option<&RefCounted<ResourceConstructed>> {
        self.module_ref.as_ref()
    }

    /// Resolves one event, including every transition it chains into.
    ///
    /// # Panics
    ///
    /// Panics if a cycle chains more transitions than the configured limit,
    /// which means the transition graph loops.
    pub fn dispatch(&mut self, event: Event) -> Cycle {
        let kind = event.kind();
        let Some(current) = self.current.as_mut() else {
            tracing::warn!(event = %kind, "event dispatched after shutdown; dropping");
            event.reclaim();
            return Cycle {
                event: kind,
                path: Vec::new(),
            };
        };

        let mut path = vec![current.kind()];
        let mut outcome = current.handle(event);
        let limit: usize = self.config.max_chained_transitions.into_inner();

        while let Outcome::TransitionTo(mut next) = outcome {
            assert!(
                path.len() <= limit,
                "transition chain exceeded {limit} steps: {path:?}"
            );
            let from = self.current.take();
            let to = next.kind();
            if let Some(previous) = from {
                tracing::info!(from = %previous.kind(), to = %to, event = %kind, "state transition");
                previous.on_leave();
            }
            outcome = next.on_enter();
            self.current = Some(next);
            path.push(to);
        }

        Cycle { event: kind, path }
    }

    /// Leaves the current state and releases the module's own reference.
    ///
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(state) = self.current.take() {
            tracing::info!(state = %state.kind(), "shutting down capture lifecycle");
            state.on_leave();
        }
        if let Some(module_ref) = self.module_ref.take() {
            module_ref.close();
        }
    }
}

impl Drop for StateMachine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
