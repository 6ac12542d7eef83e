//! Driver state tracking

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Time of a sampled instant, measured from a caller-chosen epoch
/// (typically session start). Must never go backwards between calls.
pub type Timestamp = Duration;

/// Alertness classification emitted once per sampled instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlertStatus {
    #[default]
    Alert,
    Drowsy,
}

impl AlertStatus {
    /// Overlay text
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Alert => "ALERT",
            AlertStatus::Drowsy => "DROWSY",
        }
    }

    pub fn is_drowsy(&self) -> bool {
        matches!(self, AlertStatus::Drowsy)
    }

    /// Overlay colour as (r, g, b): green for alert, red for drowsy
    pub fn overlay_rgb(&self) -> (u8, u8, u8) {
        match self {
            AlertStatus::Alert => (0, 255, 0),
            AlertStatus::Drowsy => (255, 0, 0),
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a sample was classified drowsy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrowsinessCause {
    /// Eyes classified closed for longer than the threshold
    ProlongedEyeClosure,
    /// Yawn observed in this sample
    Yawn,
}

/// Result of evaluating one sample
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Assessment {
    pub status: AlertStatus,

    /// Triggers behind a `Drowsy` status; empty when alert
    pub causes: Vec<DrowsinessCause>,

    /// Length of the current closure episode, if one is running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closure_duration: Option<Duration>,
}

/// Estimator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorPhase {
    /// No eye-closure episode in progress
    Watching,
    /// Eyes classified closed continuously since `onset`
    TimingClosure { onset: Timestamp },
}

/// State persisted between estimator updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EstimatorState {
    /// Start of the current continuous eye-closure episode
    pub eye_closure_onset: Option<Timestamp>,
}

impl EstimatorState {
    pub fn phase(&self) -> EstimatorPhase {
        match self.eye_closure_onset {
            None => EstimatorPhase::Watching,
            Some(onset) => EstimatorPhase::TimingClosure { onset },
        }
    }

    /// Closure duration at `now`, clamped to zero if the clock went backwards
    pub fn closure_duration(&self, now: Timestamp) -> Option<Duration> {
        self.eye_closure_onset.map(|onset| now.saturating_sub(onset))
    }

    /// Reset state (on driver change)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_presentation() {
        assert_eq!(AlertStatus::default(), AlertStatus::Alert);
        assert_eq!(AlertStatus::Alert.to_string(), "ALERT");
        assert_eq!(AlertStatus::Drowsy.as_str(), "DROWSY");
        assert!(AlertStatus::Drowsy.is_drowsy());
        assert_eq!(AlertStatus::Drowsy.overlay_rgb(), (255, 0, 0));
        assert_eq!(AlertStatus::Alert.overlay_rgb(), (0, 255, 0));
    }

    #[test]
    fn test_phase_follows_onset() {
        let mut state = EstimatorState::default();
        assert_eq!(state.phase(), EstimatorPhase::Watching);

        state.eye_closure_onset = Some(Duration::from_millis(500));
        assert_eq!(
            state.phase(),
            EstimatorPhase::TimingClosure { onset: Duration::from_millis(500) }
        );

        state.reset();
        assert_eq!(state.phase(), EstimatorPhase::Watching);
    }

    #[test]
    fn test_closure_duration_clamps() {
        let state = EstimatorState {
            eye_closure_onset: Some(Duration::from_secs(5)),
        };
        assert_eq!(state.closure_duration(Duration::from_secs(7)), Some(Duration::from_secs(2)));
        assert_eq!(state.closure_duration(Duration::from_secs(3)), Some(Duration::ZERO));
        assert_eq!(EstimatorState::default().closure_duration(Duration::from_secs(3)), None);
    }
}
