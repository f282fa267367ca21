//! Shared harness: a session driver wired to an in-memory host.

#![allow(dead_code)]

use capturecore::testing::Stimulus;
use capturecore::{
    Cycle, Event, Facing, FacingSetting, LifecycleConfig, ResourceConstructed,
    ResourceOpenedCamera, ResourceSurface, SessionDriver, SessionSummary, Size, StateKind,
};
use capturecore_memory::{HostStats, InMemoryHost};

/// Routes lifecycle logs to the test output; `RUST_LOG` overrides the level.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("capturecore=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn size(width: u32, height: u32) -> Size {
    Size::try_from_pixels(width, height).unwrap()
}

/// Portrait phone surface.
pub fn portrait() -> Size {
    size(1080, 1920)
}

pub struct Harness {
    pub host: InMemoryHost,
    pub driver: SessionDriver,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_host(InMemoryHost::new(), LifecycleConfig::default())
    }

    pub fn with_host(host: InMemoryHost, config: LifecycleConfig) -> Self {
        init_tracing();
        let driver = SessionDriver::new(host.services(), config);
        Self { host, driver }
    }

    pub fn send(&mut self, event: Event) -> Cycle {
        self.driver.dispatch(event)
    }

    /// Resolves completions the host queued.
    pub fn pump(&mut self) -> Vec<Cycle> {
        self.driver.process_pending()
    }

    pub fn state(&self) -> Option<StateKind> {
        self.driver.machine().current_kind()
    }

    pub fn surface_available(&mut self) -> Cycle {
        let event = self.host.surface_available(portrait());
        self.send(event)
    }

    pub fn complete_open(&mut self) -> Vec<Cycle> {
        assert!(self.host.complete_open().unwrap(), "no camera open pending");
        self.pump()
    }

    pub fn complete_preview(&mut self) -> Vec<Cycle> {
        assert!(self.host.complete_preview().unwrap(), "no preview start pending");
        self.pump()
    }

    /// Initialize, resume, attach a surface and run the camera up to preview.
    pub fn reach_previewing(&mut self) {
        self.send(Event::Initialize);
        self.send(Event::Resume);
        self.surface_available();
        self.complete_open();
        self.complete_preview();
        assert_eq!(self.state(), Some(StateKind::Previewing));
    }

    /// Reference count of the module services, or 0 after shutdown.
    pub fn constructed_refs(&self) -> usize {
        self.driver
            .machine()
            .module_resources()
            .map_or(0, |module| module.ref_count())
    }

    pub fn surface_refs(&self) -> Option<usize> {
        self.driver
            .machine()
            .current()
            .and_then(|state| state.surface())
            .map(|surface| surface.ref_count())
    }

    pub fn camera_refs(&self) -> Option<usize> {
        self.driver
            .machine()
            .current()
            .and_then(|state| state.camera())
            .map(|camera| camera.ref_count())
    }

    /// Checks that exactly the resources the current state needs are alive,
    /// each held once by the state (plus the module's own services reference).
    pub fn assert_balanced(&self) {
        let Some(kind) = self.state() else {
            return;
        };
        let stats = self.driver.tracker().stats();
        assert_eq!(self.constructed_refs(), 2, "constructed refs in {kind}");
        assert_eq!(stats.live_of(ResourceConstructed::KIND), 1);
        assert_eq!(
            stats.live_of(ResourceSurface::KIND),
            usize::from(kind.has_surface()),
            "live surfaces in {kind}"
        );
        assert_eq!(
            stats.live_of(ResourceOpenedCamera::KIND),
            usize::from(kind.has_camera()),
            "live cameras in {kind}"
        );
        if kind.has_surface() {
            assert_eq!(self.surface_refs(), Some(1), "surface refs in {kind}");
        }
        if kind.has_camera() {
            assert_eq!(self.camera_refs(), Some(1), "camera refs in {kind}");
        }
        let host = self.host.stats();
        assert_eq!(
            host.cameras_open(),
            usize::from(kind.has_camera()),
            "open devices in {kind}"
        );
        assert_eq!(
            host.surfaces_live(),
            usize::from(kind.has_surface()),
            "host surfaces in {kind}"
        );
    }

    /// Feeds one generated stimulus through the host and the queue.
    pub fn apply(&mut self, stimulus: &Stimulus) {
        match stimulus {
            Stimulus::Initialize => {
                self.send(Event::Initialize);
            }
            Stimulus::Resume => {
                self.send(Event::Resume);
            }
            Stimulus::Pause => {
                self.send(Event::Pause);
            }
            Stimulus::SurfaceAvailable(size) => {
                let event = self.host.surface_available(*size);
                self.send(event);
            }
            Stimulus::SurfaceDestroyed => {
                self.send(Event::SurfaceDestroyed);
            }
            Stimulus::SurfaceSizeChanged(size) => {
                self.send(Event::SurfaceSizeChanged(*size));
            }
            Stimulus::SwitchFacing => {
                let next = self.host.camera_facing().unwrap_or(Facing::Back).opposite();
                self.host.set_camera_facing(next);
                self.send(Event::CameraCharacteristicsReady);
            }
            Stimulus::CompleteOpen => {
                self.host.complete_open().unwrap();
            }
            Stimulus::StrayOpen(facing) => {
                let event = self.host.unsolicited_open(*facing);
                self.send(event);
            }
            Stimulus::FailOpen(error) => {
                self.host.fail_open(error.clone()).unwrap();
            }
            Stimulus::CompletePreview => {
                self.host.complete_preview().unwrap();
            }
            Stimulus::FailPreview(error) => {
                self.host.fail_preview(error.clone()).unwrap();
            }
        }
        self.pump();
    }

    pub fn finish(self) -> (SessionSummary, HostStats) {
        let summary = self.driver.shutdown();
        (summary, self.host.stats())
    }
}
