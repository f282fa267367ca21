//! In-memory camera host for `CaptureCore`
//!
//! This crate provides an implementation of every host capability trait from
//! the capturecore crate backed by plain memory, useful for testing and for
//! driving the lifecycle without camera hardware. Asynchronous operations
//! (camera opens, preview starts) are parked until the test completes or fails
//! them, unless auto-completion is switched on.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::significant_drop_tightening)]

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use capturecore::{
    CameraAccessError, CameraCharacteristics, CameraId, CameraManager, CameraOpenError,
    CameraOpener, DriverResult, Event, EventSender, Facing, FacingSetting, FatalReason,
    HostServices, ModuleUi, OpenedCamera, OrientationManager, PreviewStartError,
    PreviewTransform, RenderSurface, Rotation, Size,
};
use parking_lot::Mutex;

/// Counters and recordings of everything the lifecycle asked the host to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostStats {
    /// Camera opens requested.
    pub open_requests: usize,
    /// Cameras handed to the lifecycle as opened.
    pub cameras_opened: usize,
    /// Cameras closed.
    pub cameras_closed: usize,
    /// Close calls on a camera that was already closed.
    pub double_closes: usize,
    /// Surfaces created through [`InMemoryHost::surface`].
    pub surfaces_created: usize,
    /// Surfaces released.
    pub surfaces_released: usize,
    /// Release calls on a surface that was already released.
    pub double_releases: usize,
    /// Preview streams requested.
    pub preview_requests: usize,
    /// `on_preview_started` notifications.
    pub preview_started: usize,
    /// Transforms published to the UI, oldest first.
    pub transforms: Vec<PreviewTransform>,
    /// Fatal errors shown, oldest first.
    pub fatal_reasons: Vec<FatalReason>,
    /// Whether orientation tracking is currently running.
    pub orientation_active: bool,
}

impl HostStats {
    /// Cameras opened and not yet closed.
    pub const fn cameras_open(&self) -> usize {
        self.cameras_opened - (self.cameras_closed - self.double_closes)
    }

    /// Surfaces created and not yet released.
    pub const fn surfaces_live(&self) -> usize {
        self.surfaces_created - (self.surfaces_released - self.double_releases)
    }
}

struct PendingOpen {
    characteristics: CameraCharacteristics,
    events: EventSender,
}

struct Inner {
    characteristics: HashMap<Facing, Result<CameraCharacteristics, CameraAccessError>>,
    display_rotation: Rotation,
    facing_preference: Option<Facing>,
    auto_complete: bool,
    pending_opens: VecDeque<PendingOpen>,
    pending_previews: VecDeque<EventSender>,
    stats: HostStats,
}

/// Thread-safe in-memory host for testing.
#[derive(Clone)]
pub struct InMemoryHost {
    inner: Arc<Mutex<Inner>>,
}

fn size(width: u32, height: u32) -> Option<Size> {
    Size::try_from_pixels(width, height).ok()
}

fn default_characteristics(facing: Facing) -> Option<CameraCharacteristics> {
    let (id, sensor_orientation) = match facing {
        Facing::Back => ("0", Rotation::Deg90),
        Facing::Front => ("1", Rotation::Deg270),
    };
    Some(CameraCharacteristics {
        camera_id: CameraId::try_new(id).ok()?,
        facing,
        sensor_orientation,
        preview_sizes: vec![size(1920, 1080)?, size(1280, 720)?, size(640, 480)?],
    })
}

impl InMemoryHost {
    /// A host with a back and a front camera and the display upright.
    pub fn new() -> Self {
        let characteristics = [Facing::Back, Facing::Front]
            .into_iter()
            .filter_map(|facing| Some((facing, Ok(default_characteristics(facing)?))))
            .collect();
        Self {
            inner: Arc::new(Mutex::new(Inner {
                characteristics,
                display_rotation: Rotation::Deg0,
                facing_preference: None,
                auto_complete: false,
                pending_opens: VecDeque::new(),
                pending_previews: VecDeque::new(),
                stats: HostStats::default(),
            })),
        }
    }

    /// Completes camera opens and preview starts as soon as they are requested.
    #[must_use]
    pub fn with_auto_complete(self, enabled: bool) -> Self {
        self.inner.lock().auto_complete = enabled;
        self
    }

    /// Replaces the characteristics reported for `facing`.
    pub fn set_characteristics(&self, facing: Facing, characteristics: CameraCharacteristics) {
        self.inner
            .lock()
            .characteristics
            .insert(facing, Ok(characteristics));
    }

    /// Makes characteristics queries for `facing` fail.
    pub fn fail_characteristics(&self, facing: Facing, error: CameraAccessError) {
        self.inner.lock().characteristics.insert(facing, Err(error));
    }

    /// Rotates the display.
    pub fn set_display_rotation(&self, rotation: Rotation) {
        self.inner.lock().display_rotation = rotation;
    }

    /// The bundle of services to construct a lifecycle with.
    pub fn services(&self) -> HostServices {
        HostServices {
            camera_manager: Arc::new(self.clone()),
            camera_opener: Arc::new(self.clone()),
            orientation_manager: Arc::new(self.clone()),
            module_ui: Arc::new(self.clone()),
            facing_setting: Arc::new(self.clone()),
        }
    }

    /// Creates a fresh rendering surface.
    pub fn surface(&self, size: Size) -> Arc<InMemorySurface> {
        self.inner.lock().stats.surfaces_created += 1;
        Arc::new(InMemorySurface {
            host: self.clone(),
            state: Mutex::new(SurfaceState {
                size,
                buffer_size: None,
                released: false,
            }),
        })
    }

    /// `SurfaceAvailable` for a fresh surface of `size`.
    pub fn surface_available(&self, size: Size) -> Event {
        Event::SurfaceAvailable(self.surface(size))
    }

    /// A `CameraOpenSucceeded` nobody asked for, as delivered when an open
    /// completes after its requester moved on.
    pub fn unsolicited_open(&self, facing: Facing) -> Event {
        Event::CameraOpenSucceeded(Box::new(self.camera(facing)))
    }

    fn camera(&self, facing: Facing) -> InMemoryCamera {
        self.inner.lock().stats.cameras_opened += 1;
        InMemoryCamera {
            facing,
            host: self.clone(),
            closed: Mutex::new(false),
        }
    }

    /// Number of camera opens waiting for completion.
    pub fn pending_opens(&self) -> usize {
        self.inner.lock().pending_opens.len()
    }

    /// Number of preview starts waiting for completion.
    pub fn pending_previews(&self) -> usize {
        self.inner.lock().pending_previews.len()
    }

    /// Completes the oldest pending camera open successfully.
    ///
    /// Returns `Ok(false)` when no open is pending.
    pub fn complete_open(&self) -> DriverResult<bool> {
        let Some(pending) = self.inner.lock().pending_opens.pop_front() else {
            return Ok(false);
        };
        let camera = self.camera(pending.characteristics.facing);
        pending.events.send(Event::CameraOpenSucceeded(Box::new(camera)))?;
        Ok(true)
    }

    /// Fails the oldest pending camera open.
    pub fn fail_open(&self, error: CameraOpenError) -> DriverResult<bool> {
        let Some(pending) = self.inner.lock().pending_opens.pop_front() else {
            return Ok(false);
        };
        pending.events.send(Event::CameraOpenFailed(error))?;
        Ok(true)
    }

    /// Reports the oldest pending preview start as running.
    pub fn complete_preview(&self) -> DriverResult<bool> {
        let Some(events) = self.inner.lock().pending_previews.pop_front() else {
            return Ok(false);
        };
        events.send(Event::PreviewStartSucceeded)?;
        Ok(true)
    }

    /// Fails the oldest pending preview start.
    pub fn fail_preview(&self, error: PreviewStartError) -> DriverResult<bool> {
        let Some(events) = self.inner.lock().pending_previews.pop_front() else {
            return Ok(false);
        };
        events.send(Event::PreviewStartFailed(error))?;
        Ok(true)
    }

    /// Snapshot of the recorded activity.
    pub fn stats(&self) -> HostStats {
        self.inner.lock().stats.clone()
    }
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("InMemoryHost")
            .field("display_rotation", &inner.display_rotation)
            .field("auto_complete", &inner.auto_complete)
            .field("pending_opens", &inner.pending_opens.len())
            .field("pending_previews", &inner.pending_previews.len())
            .field("stats", &inner.stats)
            .finish()
    }
}

impl CameraManager for InMemoryHost {
    fn camera_characteristics(
        &self,
        facing: Facing,
    ) -> Result<CameraCharacteristics, CameraAccessError> {
        self.inner
            .lock()
            .characteristics
            .get(&facing)
            .cloned()
            .unwrap_or(Err(CameraAccessError::NoSuchFacing(facing)))
    }
}

impl CameraOpener for InMemoryHost {
    fn open(&self, characteristics: &CameraCharacteristics, events: EventSender) {
        let auto_complete = {
            let mut inner = self.inner.lock();
            inner.stats.open_requests += 1;
            inner.pending_opens.push_back(PendingOpen {
                characteristics: characteristics.clone(),
                events,
            });
            inner.auto_complete
        };
        if auto_complete {
            if let Err(err) = self.complete_open() {
                tracing::warn!(error = %err, "auto-completing camera open failed");
            }
        }
    }
}

impl OrientationManager for InMemoryHost {
    fn display_rotation(&self) -> Rotation {
        self.inner.lock().display_rotation
    }

    fn resume(&self) {
        self.inner.lock().stats.orientation_active = true;
    }

    fn pause(&self) {
        self.inner.lock().stats.orientation_active = false;
    }
}

impl ModuleUi for InMemoryHost {
    fn update_preview_transform(&self, transform: PreviewTransform) {
        self.inner.lock().stats.transforms.push(transform);
    }

    fn on_preview_started(&self) {
        self.inner.lock().stats.preview_started += 1;
    }

    fn show_fatal_error(&self, reason: &FatalReason) {
        self.inner.lock().stats.fatal_reasons.push(reason.clone());
    }
}

impl FacingSetting for InMemoryHost {
    fn camera_facing(&self) -> Option<Facing> {
        self.inner.lock().facing_preference
    }

    fn set_camera_facing(&self, facing: Facing) {
        self.inner.lock().facing_preference = Some(facing);
    }
}

/// A camera device handed out by [`InMemoryHost`].
pub struct InMemoryCamera {
    facing: Facing,
    host: InMemoryHost,
    closed: Mutex<bool>,
}

impl OpenedCamera for InMemoryCamera {
    fn facing(&self) -> Facing {
        self.facing
    }

    fn start_preview(&self, _surface: &dyn RenderSurface, _preview_size: Size, events: EventSender) {
        let auto_complete = {
            let mut inner = self.host.inner.lock();
            inner.stats.preview_requests += 1;
            inner.pending_previews.push_back(events);
            inner.auto_complete
        };
        if auto_complete {
            if let Err(err) = self.host.complete_preview() {
                tracing::warn!(error = %err, "auto-completing preview start failed");
            }
        }
    }

    fn close(&self) {
        let already_closed = std::mem::replace(&mut *self.closed.lock(), true);
        let mut inner = self.host.inner.lock();
        inner.stats.cameras_closed += 1;
        if already_closed {
            tracing::error!(facing = %self.facing, "camera closed twice");
            inner.stats.double_closes += 1;
        }
    }
}

#[derive(Debug)]
struct SurfaceState {
    size: Size,
    buffer_size: Option<Size>,
    released: bool,
}

/// A rendering surface handed out by [`InMemoryHost`].
pub struct InMemorySurface {
    host: InMemoryHost,
    state: Mutex<SurfaceState>,
}

impl InMemorySurface {
    /// Buffer size last requested by the lifecycle.
    pub fn buffer_size(&self) -> Option<Size> {
        self.state.lock().buffer_size
    }

    /// Whether the lifecycle released the surface.
    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }

    /// Changes the size the surface reports.
    pub fn resize(&self, size: Size) {
        self.state.lock().size = size;
    }
}

impl fmt::Debug for InMemorySurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySurface")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl RenderSurface for InMemorySurface {
    fn size(&self) -> Size {
        self.state.lock().size
    }

    fn set_default_buffer_size(&self, size: Size) {
        self.state.lock().buffer_size = Some(size);
    }

    fn release(&self) {
        let already_released = std::mem::replace(&mut self.state.lock().released, true);
        let mut inner = self.host.inner.lock();
        inner.stats.surfaces_released += 1;
        if already_released {
            tracing::error!("surface released twice");
            inner.stats.double_releases += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use capturecore::event_queue;

    use super::*;

    #[test]
    fn reports_default_characteristics_for_both_facings() {
        let host = InMemoryHost::new();
        let back = host.camera_characteristics(Facing::Back).unwrap();
        let front = host.camera_characteristics(Facing::Front).unwrap();
        assert_eq!(back.sensor_orientation, Rotation::Deg90);
        assert_eq!(front.sensor_orientation, Rotation::Deg270);
        assert_eq!(back.preview_sizes.len(), 3);
    }

    #[test]
    fn injected_characteristics_failure_is_reported() {
        let host = InMemoryHost::new();
        host.fail_characteristics(Facing::Front, CameraAccessError::Disconnected);
        assert_eq!(
            host.camera_characteristics(Facing::Front),
            Err(CameraAccessError::Disconnected)
        );
    }

    #[test]
    fn pending_open_is_delivered_on_completion() {
        let host = InMemoryHost::new();
        let (sender, _receiver) = event_queue();
        let characteristics = host.camera_characteristics(Facing::Back).unwrap();

        host.open(&characteristics, sender);
        assert_eq!(host.pending_opens(), 1);
        assert!(host.complete_open().unwrap());
        assert_eq!(host.pending_opens(), 0);
        assert!(!host.complete_open().unwrap());
        assert_eq!(host.stats().cameras_opened, 1);
    }

    #[test]
    fn double_close_is_counted() {
        let host = InMemoryHost::new();
        let camera = host.camera(Facing::Back);
        camera.close();
        camera.close();
        let stats = host.stats();
        assert_eq!(stats.double_closes, 1);
        assert_eq!(stats.cameras_open(), 0);
    }

    #[test]
    fn surface_release_is_recorded() {
        let host = InMemoryHost::new();
        let surface = host.surface(Size::try_from_pixels(720, 1280).unwrap());
        assert_eq!(host.stats().surfaces_live(), 1);
        surface.release();
        assert!(surface.is_released());
        assert_eq!(host.stats().surfaces_live(), 0);
    }
}
