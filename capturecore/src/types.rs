//! Core domain types for the capture-session lifecycle.
//!
//! Values that carry constraints use smart constructors so that a
//! constructed value is always valid, following the "parse, don't validate"
//! principle.

use nutype::nutype;
use serde::{Deserialize, Serialize};

/// Which way a camera faces relative to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Camera on the display side of the device.
    Front,
    /// Camera on the opposite side of the display.
    Back,
}

impl Facing {
    /// Returns the other facing.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Front => f.write_str("front"),
            Self::Back => f.write_str("back"),
        }
    }
}

/// A clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// A quarter turn.
    Deg90,
    /// A half turn.
    Deg180,
    /// Three quarter turns.
    Deg270,
}

impl Rotation {
    /// Rotation expressed in degrees.
    pub const fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Builds a rotation from degrees, normalising to `[0, 360)` and rounding
    /// down to the nearest quarter turn.
    pub const fn from_degrees(degrees: u32) -> Self {
        match (degrees % 360) / 90 {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    /// Sum of two rotations.
    #[must_use]
    pub const fn plus(self, other: Self) -> Self {
        Self::from_degrees(self.degrees() + other.degrees())
    }

    /// True when the rotation swaps width and height.
    pub const fn is_sideways(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// One side of a surface or buffer, in pixels.
///
/// Validated to be between 1 and 16384 pixels, which covers every sensor and
/// display the lifecycle is expected to meet.
#[nutype(
    validate(greater_or_equal = 1, less_or_equal = 16_384),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Display,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct PixelDimension(u32);

/// Width and height of a surface, buffer, or preview stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    width: PixelDimension,
    height: PixelDimension,
}

impl Size {
    /// Creates a size from validated dimensions.
    pub const fn new(width: PixelDimension, height: PixelDimension) -> Self {
        Self { width, height }
    }

    /// Creates a size from raw pixel counts.
    pub fn try_from_pixels(
        width: u32,
        height: u32,
    ) -> Result<Self, crate::errors::ConfigError> {
        Ok(Self::new(
            PixelDimension::try_new(width)?,
            PixelDimension::try_new(height)?,
        ))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width.into_inner()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height.into_inner()
    }

    /// The same size with width and height swapped.
    #[must_use]
    pub const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width()) / f64::from(self.height())
    }

    /// Total number of pixels.
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Identifier the hardware layer uses for a camera device.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 64),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct CameraId(String);

/// Static description of a camera device, as reported by the hardware layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraCharacteristics {
    /// Device identifier.
    pub camera_id: CameraId,
    /// Which way the device faces.
    pub facing: Facing,
    /// Clockwise rotation of the sensor relative to the device's natural orientation.
    pub sensor_orientation: Rotation,
    /// Preview stream sizes the device can produce, in sensor coordinates.
    pub preview_sizes: Vec<Size>,
}

/// Transform the host UI applies to the rendering surface so the preview
/// appears upright and undistorted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewTransform {
    /// Rotation applied to the preview content.
    pub rotation: Rotation,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
}

impl PreviewTransform {
    /// Transform that leaves the surface untouched.
    pub const IDENTITY: Self = Self {
        rotation: Rotation::Deg0,
        scale_x: 1.0,
        scale_y: 1.0,
    };
}

/// Identifier assigned to every counted resource for tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(uuid::Uuid);

impl ResourceId {
    /// Creates a new time-ordered identifier.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn facing_opposite_is_an_involution() {
        assert_eq!(Facing::Front.opposite(), Facing::Back);
        assert_eq!(Facing::Back.opposite().opposite(), Facing::Back);
    }

    #[test]
    fn pixel_dimension_rejects_zero_and_oversized_values() {
        assert!(PixelDimension::try_new(0).is_err());
        assert!(PixelDimension::try_new(16_385).is_err());
        assert!(PixelDimension::try_new(1920).is_ok());
    }

    #[test]
    fn camera_id_is_trimmed_and_non_empty() {
        assert!(CameraId::try_new("   ").is_err());
        let id = CameraId::try_new(" 0 ").unwrap();
        assert_eq!(id.as_ref(), "0");
    }

    #[test]
    fn transposed_swaps_dimensions() {
        let size = Size::try_from_pixels(1920, 1080).unwrap();
        let flipped = size.transposed();
        assert_eq!(flipped.width(), 1080);
        assert_eq!(flipped.height(), 1920);
    }

    proptest! {
        #[test]
        fn rotation_from_degrees_round_trips_quarter_turns(quarter in 0u32..4) {
            let rotation = Rotation::from_degrees(quarter * 90);
            prop_assert_eq!(rotation.degrees(), quarter * 90);
        }

        #[test]
        fn rotation_addition_wraps(a in 0u32..4, b in 0u32..4) {
            let sum = Rotation::from_degrees(a * 90).plus(Rotation::from_degrees(b * 90));
            prop_assert_eq!(sum.degrees(), ((a + b) % 4) * 90);
        }

        #[test]
        fn size_area_matches_dimensions(w in 1u32..=16_384, h in 1u32..=16_384) {
            let size = Size::try_from_pixels(w, h).unwrap();
            prop_assert_eq!(size.area(), u64::from(w) * u64::from(h));
        }
    }
}
