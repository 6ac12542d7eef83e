//! Debounced drowsiness estimation
//!
//! Turns per-frame detection labels into a stable alertness status.
//! Eye closure must persist for longer than the configured threshold
//! before it counts as drowsiness; a single blink never does. A yawn is
//! an immediate, non-sticky trigger.

use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::DmsConfig;
use crate::detections::DetectionSet;
use crate::state::{
    AlertStatus, Assessment, DrowsinessCause, EstimatorPhase, EstimatorState, Timestamp,
};
use crate::DmsError;

/// Drowsiness state machine over `Watching` / `TimingClosure`.
///
/// Updates must be supplied in non-decreasing timestamp order. If `now`
/// falls before the closure onset, the elapsed time is clamped to zero and
/// the onset is left unchanged.
#[derive(Debug, Clone)]
pub struct DrowsinessStateEstimator {
    threshold: Duration,
    closed_eye_labels: HashSet<String>,
    yawn_label: String,
    state: EstimatorState,
}

impl DrowsinessStateEstimator {
    /// Create an estimator from a validated configuration
    pub fn new(config: &DmsConfig) -> Result<Self, DmsError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: &DmsConfig) -> Self {
        Self {
            threshold: config.closed_duration_threshold(),
            closed_eye_labels: config
                .closed_eye_labels
                .iter()
                .filter(|l| !l.is_empty())
                .cloned()
                .collect(),
            yawn_label: config.yawn_label.clone(),
            state: EstimatorState::default(),
        }
    }

    /// Consume one sample and return the alertness status
    pub fn update(&mut self, detections: &DetectionSet, now: Timestamp) -> AlertStatus {
        self.assess(detections, now).status
    }

    /// Same transition as [`update`](Self::update), also reporting causes and closure time
    pub fn assess(&mut self, detections: &DetectionSet, now: Timestamp) -> Assessment {
        let mut causes = Vec::new();

        let closure_duration = if detections.contains_any(&self.closed_eye_labels) {
            match self.state.eye_closure_onset {
                None => {
                    debug!(onset = ?now, "eye closure episode started");
                    self.state.eye_closure_onset = Some(now);
                    Some(Duration::ZERO)
                }
                Some(onset) => {
                    if now < onset {
                        warn!(
                            ?onset,
                            ?now,
                            "timestamp before closure onset, clamping duration to zero"
                        );
                    }
                    let elapsed = now.saturating_sub(onset);
                    // strictly greater: exactly at the threshold is still alert
                    if elapsed > self.threshold {
                        causes.push(DrowsinessCause::ProlongedEyeClosure);
                    }
                    Some(elapsed)
                }
            }
        } else {
            if let Some(onset) = self.state.eye_closure_onset.take() {
                debug!(lasted = ?now.saturating_sub(onset), "eye closure episode ended");
            }
            None
        };

        if detections.contains(&self.yawn_label) {
            causes.push(DrowsinessCause::Yawn);
        }

        let status = if causes.is_empty() {
            AlertStatus::Alert
        } else {
            AlertStatus::Drowsy
        };

        Assessment {
            status,
            causes,
            closure_duration,
        }
    }

    /// Length of the running closure episode at `now`, without updating state
    pub fn closure_duration(&self, now: Timestamp) -> Option<Duration> {
        self.state.closure_duration(now)
    }

    pub fn state(&self) -> &EstimatorState {
        &self.state
    }

    pub fn phase(&self) -> EstimatorPhase {
        self.state.phase()
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Return to `Watching` (on driver change)
    pub fn reset(&mut self) {
        self.state.reset();
    }
}

impl Default for DrowsinessStateEstimator {
    fn default() -> Self {
        Self::from_config(&DmsConfig::default())
    }
}
