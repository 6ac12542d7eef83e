use std::time::Duration;

use dms::{AlertStatus, DetectionSet, DmsConfig, DrowsinessStateEstimator, EstimatorPhase};
use proptest::prelude::*;

fn labels(closed: bool, yawn: bool) -> DetectionSet {
    let mut set = DetectionSet::new();
    if closed {
        set.insert("Eyeclosed");
    }
    if yawn {
        set.insert("Yawn");
    }
    set
}

/// Replay an arbitrary history, returning the last timestamp used
fn replay(estimator: &mut DrowsinessStateEstimator, history: &[(bool, bool, u64)]) -> Duration {
    let mut now = Duration::ZERO;
    for &(closed, yawn, dt_ms) in history {
        now += Duration::from_millis(dt_ms);
        estimator.update(&labels(closed, yawn), now);
    }
    now
}

fn history() -> impl Strategy<Value = Vec<(bool, bool, u64)>> {
    prop::collection::vec((any::<bool>(), any::<bool>(), 0u64..3000), 0..40)
}

proptest! {
    #[test]
    fn empty_sample_always_alert_and_resets(history in history(), dt_ms in 0u64..5000) {
        let mut estimator = DrowsinessStateEstimator::default();
        let now = replay(&mut estimator, &history) + Duration::from_millis(dt_ms);

        prop_assert_eq!(estimator.update(&DetectionSet::new(), now), AlertStatus::Alert);
        prop_assert_eq!(estimator.phase(), EstimatorPhase::Watching);
        prop_assert_eq!(estimator.state().eye_closure_onset, None);
    }

    #[test]
    fn threshold_boundary_is_strict(
        t0_ms in 0u64..1_000_000,
        threshold_ms in 1u64..10_000,
        epsilon_ns in 1u64..1_000_000_000,
    ) {
        let config = DmsConfig { closed_duration_threshold_ms: threshold_ms, ..Default::default() };
        let mut estimator = DrowsinessStateEstimator::new(&config).unwrap();
        let closed = labels(true, false);
        let t0 = Duration::from_millis(t0_ms);
        let threshold = Duration::from_millis(threshold_ms);

        prop_assert_eq!(estimator.update(&closed, t0), AlertStatus::Alert);
        prop_assert_eq!(estimator.update(&closed, t0 + threshold), AlertStatus::Alert);
        prop_assert_eq!(
            estimator.update(&closed, t0 + threshold + Duration::from_nanos(epsilon_ns)),
            AlertStatus::Drowsy
        );
    }

    #[test]
    fn yawn_always_drowsy(history in history(), dt_ms in 0u64..5000) {
        let mut estimator = DrowsinessStateEstimator::default();
        let now = replay(&mut estimator, &history) + Duration::from_millis(dt_ms);

        prop_assert_eq!(estimator.update(&DetectionSet::from(["Yawn"]), now), AlertStatus::Drowsy);
        prop_assert_eq!(
            estimator.update(&DetectionSet::from(["Yawn", "Eyeclosed", "Drowsy eye"]), now),
            AlertStatus::Drowsy
        );
    }

    #[test]
    fn yawn_is_not_sticky(
        t_ms in 0u64..100_000,
        delta_ms in 0u64..=2000,
        with_closure in any::<bool>(),
    ) {
        let mut estimator = DrowsinessStateEstimator::default();
        let t = Duration::from_millis(t_ms);

        prop_assert_eq!(estimator.update(&labels(with_closure, true), t), AlertStatus::Drowsy);
        prop_assert_eq!(
            estimator.update(&labels(with_closure, false), t + Duration::from_millis(delta_ms)),
            AlertStatus::Alert
        );
    }

    #[test]
    fn episodes_measured_from_own_onset(
        first_ms in 0u64..2000,
        gap_ms in 1u64..5000,
        restart_ms in 0u64..5000,
    ) {
        let mut estimator = DrowsinessStateEstimator::default();
        let closed = labels(true, false);
        let threshold = estimator.threshold();

        let mut now = Duration::ZERO;
        estimator.update(&closed, now);
        now += Duration::from_millis(first_ms);
        prop_assert_eq!(estimator.update(&closed, now), AlertStatus::Alert);

        now += Duration::from_millis(gap_ms);
        prop_assert_eq!(estimator.update(&DetectionSet::new(), now), AlertStatus::Alert);

        let onset = now + Duration::from_millis(restart_ms);
        prop_assert_eq!(estimator.update(&closed, onset), AlertStatus::Alert);
        prop_assert_eq!(estimator.update(&closed, onset + threshold), AlertStatus::Alert);
        prop_assert_eq!(
            estimator.update(&closed, onset + threshold + Duration::from_millis(1)),
            AlertStatus::Drowsy
        );
    }
}
