//! Driver Monitoring System (DMS)
//!
//! Drowsiness estimation from per-frame detection labels:
//! - Debounced eye-closure timing (blinks never alarm)
//! - Immediate yawn trigger
//! - Monitoring loop with pluggable capture/detection and display stages

pub mod config;
pub mod detections;
pub mod estimator;
pub mod monitor;
pub mod state;

pub use config::DmsConfig;
pub use detections::{Detection, DetectionSet};
pub use estimator::DrowsinessStateEstimator;
pub use monitor::{
    DetectionSource, IterSource, LiveSource, Monitor, MonitorStats, Sample, SessionClock,
    SinkControl, StatusSink,
};
pub use state::{
    AlertStatus, Assessment, DrowsinessCause, EstimatorPhase, EstimatorState, Timestamp,
};

use thiserror::Error;

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Detection source failed: {0}")]
    Source(String),

    #[error("Status sink failed: {0}")]
    Sink(String),
}
