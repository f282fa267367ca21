//! Minimal host for unit tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::driver::EventSender;
use crate::errors::{CameraAccessError, FatalReason};
use crate::event::Event;
use crate::host::{
    CameraManager, CameraOpener, FacingSetting, HostServices, ModuleUi, OpenedCamera,
    OrientationManager, RenderSurface,
};
use crate::types::{CameraCharacteristics, CameraId, Facing, PreviewTransform, Rotation, Size};

pub(crate) fn size(w: u32, h: u32) -> Size {
    Size::try_from_pixels(w, h).unwrap()
}

#[derive(Debug, Default)]
pub(crate) struct Log {
    pub opens: Vec<Facing>,
    pub closes: usize,
    pub previews_started: usize,
    pub surface_releases: usize,
    pub orientation_active: bool,
    pub fatal: Vec<FatalReason>,
    pub transforms: Vec<PreviewTransform>,
    pub fail_characteristics: bool,
    pub facing: Option<Facing>,
}

#[derive(Debug, Default)]
pub(crate) struct FakeHost {
    pub log: Mutex<Log>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn services(self: &Arc<Self>) -> HostServices {
        HostServices {
            camera_manager: self.clone(),
            camera_opener: self.clone(),
            orientation_manager: self.clone(),
            module_ui: self.clone(),
            facing_setting: self.clone(),
        }
    }

    pub fn surface_available(self: &Arc<Self>) -> Event {
        Event::SurfaceAvailable(Arc::new(FakeSurface {
            size: size(1080, 1920),
            host: Arc::clone(self),
        }))
    }

    pub fn camera_opened(self: &Arc<Self>, facing: Facing) -> Event {
        Event::CameraOpenSucceeded(Box::new(FakeCamera {
            facing,
            host: Arc::clone(self),
        }))
    }
}

struct FakeCamera {
    facing: Facing,
    host: Arc<FakeHost>,
}

struct FakeSurface {
    size: Size,
    host: Arc<FakeHost>,
}

impl CameraManager for FakeHost {
    fn camera_characteristics(
        &self,
        facing: Facing,
    ) -> Result<CameraCharacteristics, CameraAccessError> {
        if self.log.lock().fail_characteristics {
            return Err(CameraAccessError::Disabled);
        }
        Ok(CameraCharacteristics {
            camera_id: CameraId::try_new(facing.to_string()).unwrap(),
            facing,
            sensor_orientation: Rotation::Deg90,
            preview_sizes: vec![size(1920, 1080), size(640, 480)],
        })
    }
}

impl CameraOpener for FakeHost {
    fn open(&self, characteristics: &CameraCharacteristics, _events: EventSender) {
        self.log.lock().opens.push(characteristics.facing);
    }
}

impl OrientationManager for FakeHost {
    fn display_rotation(&self) -> Rotation {
        Rotation::Deg0
    }
    fn resume(&self) {
        self.log.lock().orientation_active = true;
    }
    fn pause(&self) {
        self.log.lock().orientation_active = false;
    }
}

impl ModuleUi for FakeHost {
    fn update_preview_transform(&self, transform: PreviewTransform) {
        self.log.lock().transforms.push(transform);
    }
    fn on_preview_started(&self) {}
    fn show_fatal_error(&self, reason: &FatalReason) {
        self.log.lock().fatal.push(reason.clone());
    }
}

impl FacingSetting for FakeHost {
    fn camera_facing(&self) -> Option<Facing> {
        self.log.lock().facing
    }
    fn set_camera_facing(&self, facing: Facing) {
        self.log.lock().facing = Some(facing);
    }
}

impl OpenedCamera for FakeCamera {
    fn facing(&self) -> Facing {
        self.facing
    }
    fn start_preview(&self, _surface: &dyn RenderSurface, _size: Size, _events: EventSender) {
        self.host.log.lock().previews_started += 1;
    }
    fn close(&self) {
        self.host.log.lock().closes += 1;
    }
}

impl RenderSurface for FakeSurface {
    fn size(&self) -> Size {
        self.size
    }
    fn set_default_buffer_size(&self, _size: Size) {}
    fn release(&self) {
        self.host.log.lock().surface_releases += 1;
    }
}
