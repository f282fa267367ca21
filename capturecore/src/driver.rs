//! Single-consumer event queue feeding one driver.
//!
//! Hardware callbacks and host lifecycle hooks run on arbitrary threads. They
//! never touch the state machine directly: they push events through a cloneable
//! [`EventSender`], and the [`SessionDriver`] that owns the machine takes one
//! event at a time off the queue and resolves it completely (including chained
//! transitions) before taking the next. Events arriving mid-cycle wait in the
//! queue; none are dropped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::instrument;

use crate::config::LifecycleConfig;
use crate::errors::{DriverError, DriverResult};
use crate::event::Event;
use crate::host::HostServices;
use crate::machine::{Cycle, StateMachine};
use crate::resource::{ResourceConstructed, ResourceTracker};
use crate::state::StateKind;

#[derive(Debug)]
enum Envelope {
    Event(Event),
    Shutdown,
}

/// Producer side of the event queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl EventSender {
    /// Queues an event for the driver.
    pub fn send(&self, event: Event) -> DriverResult<()> {
        self.tx.send(Envelope::Event(event)).map_err(|rejected| {
            if let Envelope::Event(event) = rejected.0 {
                tracing::warn!(event = %event.kind(), "event sent after the driver shut down");
                event.reclaim();
            }
            DriverError::QueueClosed
        })
    }

    /// Asks the driver to shut the module down once the events queued before
    /// this request are resolved.
    pub fn request_shutdown(&self) -> DriverResult<()> {
        self.tx
            .send(Envelope::Shutdown)
            .map_err(|_| DriverError::QueueClosed)
    }

    /// True once the driver is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the event queue.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<Envelope>,
}

/// Creates a connected sender and receiver.
pub fn event_queue() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

/// Externally observable state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Current state, `None` once shut down.
    pub state: Option<StateKind>,
    /// Dispatch cycles completed so far.
    pub cycles: u64,
}

impl SessionStatus {
    /// The host must tear the module down.
    pub fn must_shut_down(&self) -> bool {
        self.state.map_or(true, StateKind::is_terminal)
    }
}

/// Summary returned when a driver stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// State current when shutdown began.
    pub last_state: Option<StateKind>,
    /// Dispatch cycles completed.
    pub cycles: u64,
    /// Counted resources still alive after shutdown; zero unless something
    /// outside the lifecycle kept a reference.
    pub live_resources: usize,
}

enum Flow {
    Continue,
    Stop,
}

/// Owns a state machine and feeds it from the event queue.
#[derive(Debug)]
pub struct SessionDriver {
    machine: StateMachine,
    receiver: EventReceiver,
    sender: EventSender,
    tracker: Arc<ResourceTracker>,
    status: watch::Sender<SessionStatus>,
    config: LifecycleConfig,
    cycles: u64,
}

impl SessionDriver {
    /// Constructs the module: the event queue, the module services and a
    /// machine current in `Uninitialized`.
    pub fn new(services: HostServices, config: LifecycleConfig) -> Self {
        let (sender, receiver) = event_queue();
        let tracker = Arc::new(ResourceTracker::new());
        let constructed =
            ResourceConstructed::create(services, sender.clone(), Arc::clone(&tracker), config);
        let machine = StateMachine::new(constructed);
        let (status, _) = watch::channel(SessionStatus {
            state: machine.current_kind(),
            cycles: 0,
        });
        Self {
            machine,
            receiver,
            sender,
            tracker,
            status,
            config,
            cycles: 0,
        }
    }

    /// A sender for host and hardware callbacks.
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Watches the session status.
    pub fn status(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Registry of counted resources owned by the session.
    pub const fn tracker(&self) -> &Arc<ResourceTracker> {
        &self.tracker
    }

    /// The driven machine.
    pub const fn machine(&self) -> &StateMachine {
        &self.machine
    }

    /// Resolves one event immediately, bypassing the queue.
    ///
    /// Only callable by whoever owns the driver, so it cannot interleave with
    /// a cycle already in progress.
    pub fn dispatch(&mut self, event: Event) -> Cycle {
        let cycle = self.machine.dispatch(event);
        self.finish_cycle(&cycle);
        cycle
    }

    /// Resolves every event already queued, in order, without waiting.
    ///
    /// Returns the cycles that ran. Stops early if a shutdown request is
    /// reached.
    pub fn process_pending(&mut self) -> Vec<Cycle> {
        let mut cycles = Vec::new();
        if self.machine.is_shut_down() {
            return cycles;
        }
        while let Ok(envelope) = self.receiver.rx.try_recv() {
            match envelope {
                Envelope::Event(event) => cycles.push(self.dispatch(event)),
                Envelope::Shutdown => {
                    self.shutdown_machine();
                    break;
                }
            }
        }
        cycles
    }

    /// Runs the driver until shutdown is requested.
    pub async fn run(mut self) -> SessionSummary {
        tracing::info!("session driver started");
        loop {
            let Some(envelope) = self.receiver.rx.recv().await else {
                break;
            };
            if matches!(self.handle(envelope), Flow::Stop) {
                break;
            }
        }
        self.shutdown()
    }

    /// Shuts the module down and reports what was left.
    pub fn shutdown(mut self) -> SessionSummary {
        self.shutdown_machine()
    }

    #[instrument(skip(self, envelope), fields(cycle = self.cycles + 1))]
    fn handle(&mut self, envelope: Envelope) -> Flow {
        let backlog = self.receiver.rx.len();
        if backlog >= self.config.backlog_warn_threshold.into_inner() {
            tracing::warn!(backlog, "event backlog building up");
        }
        match envelope {
            Envelope::Event(event) => {
                self.dispatch(event);
                Flow::Continue
            }
            Envelope::Shutdown => Flow::Stop,
        }
    }

    fn finish_cycle(&mut self, cycle: &Cycle) {
        self.cycles += 1;
        tracing::debug!(
            event = %cycle.event,
            path = ?cycle.path,
            "dispatch cycle settled"
        );
        self.status.send_replace(SessionStatus {
            state: self.machine.current_kind(),
            cycles: self.cycles,
        });
    }

    fn shutdown_machine(&mut self) -> SessionSummary {
        let last_state = self.machine.current_kind();
        self.machine.shutdown();
        self.close_queue();
        self.status.send_replace(SessionStatus {
            state: None,
            cycles: self.cycles,
        });
        let live_resources = self.tracker.stats().total_live();
        if live_resources > 0 {
            tracing::warn!(live_resources, "counted resources outlived the session");
        }
        tracing::info!(cycles = self.cycles, "session driver stopped");
        SessionSummary {
            last_state,
            cycles: self.cycles,
            live_resources,
        }
    }

    /// Stops accepting events and hands back the resources carried by events
    /// still buffered behind the shutdown.
    fn close_queue(&mut self) {
        self.receiver.rx.close();
        while let Ok(envelope) = self.receiver.rx.try_recv() {
            if let Envelope::Event(event) = envelope {
                let kind = event.kind();
                if event.reclaim() {
                    tracing::warn!(event = %kind, "event queued behind shutdown; resource handed back");
                } else {
                    tracing::debug!(event = %kind, "event queued behind shutdown dropped");
                }
            }
        }
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        self.close_queue();
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::config::BacklogWarnThreshold;
    use crate::fakes::FakeHost;

    fn driver(host: &Arc<FakeHost>) -> SessionDriver {
        SessionDriver::new(host.services(), LifecycleConfig::default())
    }

    #[test]
    fn queued_events_resolve_in_order() {
        let host = FakeHost::new();
        let mut driver = driver(&host);
        let sender = driver.sender();

        sender.send(Event::Initialize).unwrap();
        sender.send(Event::Resume).unwrap();
        sender.send(host.surface_available()).unwrap();

        let cycles = driver.process_pending();
        let settled: Vec<_> = cycles.iter().filter_map(Cycle::settled).collect();
        assert_eq!(
            settled,
            vec![
                StateKind::Background,
                StateKind::Foreground,
                StateKind::OpeningCamera
            ]
        );
        assert_eq!(
            *driver.status().borrow(),
            SessionStatus {
                state: Some(StateKind::OpeningCamera),
                cycles: 3,
            }
        );
    }

    #[test]
    fn shutdown_request_stops_processing() {
        let host = FakeHost::new();
        let mut driver = driver(&host);
        let sender = driver.sender();

        sender.send(Event::Initialize).unwrap();
        sender.request_shutdown().unwrap();

        let cycles = driver.process_pending();
        assert_eq!(cycles.len(), 1);
        assert!(driver.machine().is_shut_down());
        assert!(driver.status().borrow().must_shut_down());
        assert_eq!(
            sender.send(Event::Resume),
            Err(DriverError::QueueClosed)
        );
    }

    #[test]
    fn resources_queued_behind_shutdown_are_handed_back() {
        let host = FakeHost::new();
        let mut driver = driver(&host);
        let sender = driver.sender();

        sender.send(Event::Initialize).unwrap();
        sender.send(Event::Resume).unwrap();
        sender.send(host.surface_available()).unwrap();
        sender.request_shutdown().unwrap();
        sender.send(host.camera_opened(crate::types::Facing::Back)).unwrap();
        sender.send(host.surface_available()).unwrap();

        let cycles = driver.process_pending();
        assert_eq!(cycles.len(), 3);
        assert!(driver.machine().is_shut_down());
        {
            let log = host.log.lock();
            assert_eq!(log.closes, 1);
            assert_eq!(log.surface_releases, 2);
        }

        let late = sender.send(host.camera_opened(crate::types::Facing::Front));
        assert_eq!(late, Err(DriverError::QueueClosed));
        assert_eq!(host.log.lock().closes, 2);
    }

    #[test]
    fn dropping_the_driver_hands_back_queued_resources() {
        let host = FakeHost::new();
        let driver = driver(&host);
        let sender = driver.sender();

        sender.send(host.camera_opened(crate::types::Facing::Back)).unwrap();
        sender.send(host.surface_available()).unwrap();
        drop(driver);

        let log = host.log.lock();
        assert_eq!(log.closes, 1);
        assert_eq!(log.surface_releases, 1);
    }

    #[tokio::test]
    async fn run_releases_every_resource_on_shutdown() {
        let host = FakeHost::new();
        let driver = driver(&host);
        let sender = driver.sender();
        let tracker = Arc::clone(driver.tracker());
        let mut status = driver.status();
        let task = tokio::spawn(driver.run());

        sender.send(Event::Initialize).unwrap();
        sender.send(Event::Resume).unwrap();
        sender.send(host.surface_available()).unwrap();
        sender.send(host.camera_opened(crate::types::Facing::Back)).unwrap();

        status
            .wait_for(|s| s.state == Some(StateKind::StartingPreview))
            .await
            .unwrap();
        sender.request_shutdown().unwrap();

        let summary = task.await.unwrap();
        assert_eq!(summary.last_state, Some(StateKind::StartingPreview));
        assert_eq!(summary.cycles, 4);
        assert_eq!(summary.live_resources, 0);
        assert_eq!(tracker.stats().total_live(), 0);

        let log = host.log.lock();
        assert_eq!(log.closes, 1);
        assert_eq!(log.surface_releases, 1);
        assert!(!log.orientation_active);
    }

    #[test]
    #[traced_test]
    fn warns_when_backlog_builds_up() {
        let host = FakeHost::new();
        let config = LifecycleConfig::default()
            .with_backlog_warn_threshold(BacklogWarnThreshold::try_new(2).unwrap());
        let driver = SessionDriver::new(host.services(), config);
        let sender = driver.sender();

        sender.send(Event::Initialize).unwrap();
        sender.send(Event::Resume).unwrap();
        sender.send(Event::Pause).unwrap();
        sender.request_shutdown().unwrap();

        let summary = tokio_test::block_on(driver.run());
        assert_eq!(summary.cycles, 3);
        assert!(logs_contain("event backlog building up"));
    }
}
