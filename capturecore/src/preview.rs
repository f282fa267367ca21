//! Preview geometry derived from the surface, the sensor and the display.

use std::fmt;
use std::sync::Arc;

use crate::host::OrientationManager;
use crate::types::{CameraCharacteristics, PreviewTransform, Rotation, Size};

/// Computes the preview size and transform for a surface, bound to the
/// device's orientation state.
#[derive(Clone)]
pub struct PreviewTransformCalculator {
    orientation: Arc<dyn OrientationManager>,
}

impl PreviewTransformCalculator {
    /// Binds a calculator to an orientation manager.
    pub fn new(orientation: Arc<dyn OrientationManager>) -> Self {
        Self { orientation }
    }

    /// Rotation of sensor frames relative to the display right now.
    pub fn relative_rotation(&self, sensor_orientation: Rotation) -> Rotation {
        let display = self.orientation.display_rotation();
        Rotation::from_degrees(360 + sensor_orientation.degrees() - display.degrees())
    }

    /// Picks the supported preview size whose aspect ratio best matches the
    /// surface once rotated into display coordinates. Ties go to the larger
    /// size.
    pub fn choose_preview_size(
        &self,
        characteristics: &CameraCharacteristics,
        surface_size: Size,
    ) -> Option<Size> {
        let sideways = self
            .relative_rotation(characteristics.sensor_orientation)
            .is_sideways();
        let target = if sideways {
            surface_size.transposed()
        } else {
            surface_size
        }
        .aspect_ratio();

        characteristics.preview_sizes.iter().copied().min_by(|a, b| {
            let da = (a.aspect_ratio() - target).abs();
            let db = (b.aspect_ratio() - target).abs();
            da.total_cmp(&db).then_with(|| b.area().cmp(&a.area()))
        })
    }

    /// Transform that shows `preview_size` frames upright, centre-cropped to
    /// fill `surface_size`.
    pub fn compute(
        &self,
        surface_size: Size,
        preview_size: Size,
        sensor_orientation: Rotation,
    ) -> PreviewTransform {
        let display = self.orientation.display_rotation();
        let buffer = if self.relative_rotation(sensor_orientation).is_sideways() {
            preview_size.transposed()
        } else {
            preview_size
        };

        let ratio = buffer.aspect_ratio() / surface_size.aspect_ratio();
        let (scale_x, scale_y) = if ratio >= 1.0 {
            (ratio, 1.0)
        } else {
            (1.0, ratio.recip())
        };

        PreviewTransform {
            rotation: Rotation::from_degrees(360 - display.degrees()),
            scale_x,
            scale_y,
        }
    }
}

impl fmt::Debug for PreviewTransformCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewTransformCalculator")
            .field("display_rotation", &self.orientation.display_rotation())
            .finish()
    }
}
