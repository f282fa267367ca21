//! Property tests over random event sequences.
//!
//! Whatever order the host and the hardware deliver events in, every state
//! must hold exactly the resources it needs, and shutting down must release
//! all of them exactly once.

mod common;

use capturecore::testing::{arb_stimulus_sequence, Stimulus};
use capturecore::StateKind;
use common::Harness;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn resources_stay_balanced_after_every_event(seq in arb_stimulus_sequence(40)) {
        let mut h = Harness::new();
        for stimulus in &seq {
            h.apply(stimulus);
            h.assert_balanced();
        }
    }

    #[test]
    fn shutdown_releases_everything_exactly_once(seq in arb_stimulus_sequence(40)) {
        let mut h = Harness::new();
        for stimulus in &seq {
            h.apply(stimulus);
        }
        let last = h.state();

        let (summary, stats) = h.finish();
        prop_assert_eq!(summary.last_state, last);
        prop_assert_eq!(summary.live_resources, 0);
        prop_assert_eq!(stats.cameras_open(), 0);
        prop_assert_eq!(stats.surfaces_live(), 0);
        prop_assert_eq!(stats.double_closes, 0);
        prop_assert_eq!(stats.double_releases, 0);
        prop_assert!(!stats.orientation_active);
    }

    #[test]
    fn fatal_is_absorbing(seq in arb_stimulus_sequence(40)) {
        let mut h = Harness::new();
        let mut seen_fatal = false;
        for stimulus in &seq {
            h.apply(stimulus);
            if seen_fatal {
                prop_assert_eq!(h.state(), Some(StateKind::Fatal));
            }
            seen_fatal |= h.state() == Some(StateKind::Fatal);
        }
        let fatal_shown = h.host.stats().fatal_reasons.len();
        prop_assert_eq!(fatal_shown, usize::from(seen_fatal));
    }

    #[test]
    fn resizes_without_a_camera_publish_nothing(
        sizes in proptest::collection::vec(capturecore::testing::arb_size(), 1..8)
    ) {
        let mut h = Harness::new();
        h.apply(&Stimulus::Initialize);
        h.apply(&Stimulus::SurfaceAvailable(common::portrait()));
        for size in sizes {
            h.apply(&Stimulus::SurfaceSizeChanged(size));
        }
        prop_assert_eq!(h.state(), Some(StateKind::BackgroundWithSurface));
        prop_assert!(h.host.stats().transforms.is_empty());
    }
}
