//! Property test generators for lifecycle types.
//!
//! Payload-carrying events hold host objects (surfaces, opened cameras), so
//! random sequences are generated as [`Stimulus`] values and turned into real
//! events by whichever fake host the test runs against.

use proptest::prelude::*;

use crate::errors::{CameraAccessError, CameraOpenError, PreviewStartError};
use crate::types::{Facing, Rotation, Size};

/// Generates either facing.
pub fn arb_facing() -> impl Strategy<Value = Facing> {
    prop_oneof![Just(Facing::Front), Just(Facing::Back)]
}

/// Generates any quarter-turn rotation.
pub fn arb_rotation() -> impl Strategy<Value = Rotation> {
    prop_oneof![
        Just(Rotation::Deg0),
        Just(Rotation::Deg90),
        Just(Rotation::Deg180),
        Just(Rotation::Deg270),
    ]
}

/// Generates sizes in a realistic range for displays and sensors.
pub fn arb_size() -> impl Strategy<Value = Size> {
    (16u32..=4096, 16u32..=4096)
        .prop_filter_map("Invalid Size", |(w, h)| Size::try_from_pixels(w, h).ok())
}

/// Generates asynchronous camera open failures.
pub fn arb_camera_open_error() -> impl Strategy<Value = CameraOpenError> {
    prop_oneof![
        Just(CameraOpenError::InUse),
        Just(CameraOpenError::Access(CameraAccessError::Disconnected)),
    ]
}

/// Generates asynchronous preview start failures.
pub fn arb_preview_start_error() -> impl Strategy<Value = PreviewStartError> {
    prop_oneof![
        Just(PreviewStartError::Disconnected),
        "[a-z ]{1,24}".prop_map(PreviewStartError::SessionConfiguration),
    ]
}

/// A host-independent description of one inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Stimulus {
    /// `Initialize`.
    Initialize,
    /// `Resume`.
    Resume,
    /// `Pause`.
    Pause,
    /// `SurfaceAvailable` with a fresh surface of this size.
    SurfaceAvailable(Size),
    /// `SurfaceDestroyed`.
    SurfaceDestroyed,
    /// `SurfaceSizeChanged`.
    SurfaceSizeChanged(Size),
    /// Flip the facing preference, then `CameraCharacteristicsReady`.
    SwitchFacing,
    /// Complete the oldest pending camera open successfully.
    CompleteOpen,
    /// An unsolicited `CameraOpenSucceeded` for a device of this facing.
    StrayOpen(Facing),
    /// `CameraOpenFailed`.
    FailOpen(CameraOpenError),
    /// `PreviewStartSucceeded`.
    CompletePreview,
    /// `PreviewStartFailed`.
    FailPreview(PreviewStartError),
}

/// Generates a single stimulus, weighted towards lifecycle churn over
/// failures so sequences reach deep states before they end in `Fatal`.
pub fn arb_stimulus() -> impl Strategy<Value = Stimulus> {
    prop_oneof![
        2 => Just(Stimulus::Initialize),
        6 => Just(Stimulus::Resume),
        6 => Just(Stimulus::Pause),
        6 => arb_size().prop_map(Stimulus::SurfaceAvailable),
        4 => Just(Stimulus::SurfaceDestroyed),
        3 => arb_size().prop_map(Stimulus::SurfaceSizeChanged),
        2 => Just(Stimulus::SwitchFacing),
        8 => Just(Stimulus::CompleteOpen),
        8 => Just(Stimulus::CompletePreview),
        3 => prop_oneof![
            arb_facing().prop_map(Stimulus::StrayOpen),
            arb_camera_open_error().prop_map(Stimulus::FailOpen),
            arb_preview_start_error().prop_map(Stimulus::FailPreview),
        ],
    ]
}

/// Generates a sequence of stimuli that always starts with `Initialize`.
pub fn arb_stimulus_sequence(max_len: usize) -> impl Strategy<Value = Vec<Stimulus>> {
    prop::collection::vec(arb_stimulus(), 0..=max_len).prop_map(|mut rest| {
        rest.insert(0, Stimulus::Initialize);
        rest
    })
}
