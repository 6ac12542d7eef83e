//! DMS configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::DmsError;

/// DMS configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Continuous eye closure required before drowsiness is declared.
    ///
    /// Whole milliseconds; sub-millisecond thresholds are not configurable.
    /// Elapsed closure time itself is compared at nanosecond resolution.
    pub closed_duration_threshold_ms: u64,

    /// Labels that count as eye-closure evidence
    pub closed_eye_labels: Vec<String>,

    /// Label that triggers drowsiness immediately
    pub yawn_label: String,

    /// Detection confidence threshold applied before labels reach the estimator
    pub min_confidence: f32,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            closed_duration_threshold_ms: 2000,
            closed_eye_labels: vec!["Eyeclosed".to_string(), "Drowsy eye".to_string()],
            yawn_label: "Yawn".to_string(),
            min_confidence: 0.4,
        }
    }
}

impl DmsConfig {
    /// Create strict config (shorter closure threshold)
    pub fn strict() -> Self {
        Self {
            closed_duration_threshold_ms: 1000,
            ..Default::default()
        }
    }

    /// Create lenient config (longer closure threshold)
    pub fn lenient() -> Self {
        Self {
            closed_duration_threshold_ms: 3000,
            ..Default::default()
        }
    }

    /// Closure threshold as a `Duration`
    pub fn closed_duration_threshold(&self) -> Duration {
        Duration::from_millis(self.closed_duration_threshold_ms)
    }

    /// Check the configuration for values the estimator cannot work with
    pub fn validate(&self) -> Result<(), DmsError> {
        if self.closed_duration_threshold_ms == 0 {
            return Err(DmsError::Config(
                "closed_duration_threshold_ms must be greater than zero".into(),
            ));
        }

        if self.closed_eye_labels.iter().all(|l| l.is_empty()) {
            return Err(DmsError::Config(
                "closed_eye_labels must contain at least one label".into(),
            ));
        }

        if self.yawn_label.is_empty() {
            return Err(DmsError::Config("yawn_label must not be empty".into()));
        }

        if self.closed_eye_labels.contains(&self.yawn_label) {
            return Err(DmsError::Config(format!(
                "label {:?} cannot be both a closed-eye label and the yawn label",
                self.yawn_label
            )));
        }

        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(DmsError::Config(format!(
                "min_confidence {} is out of range [0, 1]",
                self.min_confidence
            )));
        }

        Ok(())
    }
}
