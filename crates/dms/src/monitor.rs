//! Monitoring loop
//!
//! Drives the estimator from a detection source and hands each result to a
//! status sink. Capture, detection, and display all sit behind the two
//! traits below; the loop itself only serializes samples and keeps counts.

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use crate::detections::DetectionSet;
use crate::estimator::DrowsinessStateEstimator;
use crate::state::{AlertStatus, Assessment, Timestamp};
use crate::DmsError;

/// One sampled instant: when it was taken and what was detected
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub detections: DetectionSet,
}

impl Sample {
    pub fn new(timestamp: Timestamp, detections: DetectionSet) -> Self {
        Self { timestamp, detections }
    }
}

/// Produces labeled samples (camera + detection model)
pub trait DetectionSource {
    /// Next sample, or `None` once the stream has ended
    fn next_sample(&mut self) -> Result<Option<Sample>, DmsError>;
}

/// Whether the loop should keep going after a render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkControl {
    Continue,
    Stop,
}

/// Consumes the status for each sample (overlay, buzzer, logger...)
pub trait StatusSink {
    fn render(
        &mut self,
        sample: &Sample,
        assessment: &Assessment,
    ) -> Result<SinkControl, DmsError>;
}

/// Source over any iterator of samples
pub struct IterSource<I>(pub I);

impl<I> DetectionSource for IterSource<I>
where
    I: Iterator<Item = Sample>,
{
    fn next_sample(&mut self) -> Result<Option<Sample>, DmsError> {
        Ok(self.0.next())
    }
}

/// Session-relative monotonic clock for live sources
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    start: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn now(&self) -> Timestamp {
        self.start.elapsed()
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::start()
    }
}

/// Live source: wraps a capture-and-detect step and stamps each result
/// with the session clock when its labels become available.
///
/// `detect` returns `Ok(None)` when capture ends (camera closed, read failed).
pub struct LiveSource<F> {
    clock: SessionClock,
    detect: F,
}

impl<F> LiveSource<F>
where
    F: FnMut() -> Result<Option<DetectionSet>, DmsError>,
{
    pub fn new(detect: F) -> Self {
        Self::with_clock(SessionClock::start(), detect)
    }

    pub fn with_clock(clock: SessionClock, detect: F) -> Self {
        Self { clock, detect }
    }

    pub fn clock(&self) -> SessionClock {
        self.clock
    }
}

impl<F> DetectionSource for LiveSource<F>
where
    F: FnMut() -> Result<Option<DetectionSet>, DmsError>,
{
    fn next_sample(&mut self) -> Result<Option<Sample>, DmsError> {
        Ok((self.detect)()?.map(|detections| Sample::new(self.clock.now(), detections)))
    }
}

/// Counters for a monitoring session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStats {
    /// Samples evaluated by the estimator
    pub samples: u64,
    /// Samples classified drowsy
    pub drowsy_samples: u64,
    /// Alert -> Drowsy transitions
    pub drowsy_episodes: u64,
    /// Samples discarded for arriving with an earlier timestamp
    pub dropped_out_of_order: u64,
}

/// Single consumer feeding samples to the estimator in timestamp order
pub struct Monitor {
    estimator: DrowsinessStateEstimator,
    last_timestamp: Option<Timestamp>,
    last_status: AlertStatus,
    stats: MonitorStats,
}

impl Monitor {
    pub fn new(estimator: DrowsinessStateEstimator) -> Self {
        Self {
            estimator,
            last_timestamp: None,
            last_status: AlertStatus::Alert,
            stats: MonitorStats::default(),
        }
    }

    /// Evaluate one sample. Returns `None` if it was dropped as out of order.
    pub fn step(&mut self, sample: &Sample) -> Option<Assessment> {
        if let Some(last) = self.last_timestamp {
            if sample.timestamp < last {
                warn!(
                    timestamp = ?sample.timestamp,
                    last = ?last,
                    "dropping out-of-order sample"
                );
                self.stats.dropped_out_of_order += 1;
                counter!("dms_out_of_order_samples_total").increment(1);
                return None;
            }
        }
        self.last_timestamp = Some(sample.timestamp);

        let assessment = self.estimator.assess(&sample.detections, sample.timestamp);
        self.stats.samples += 1;
        counter!("dms_samples_total").increment(1);

        match (self.last_status, assessment.status) {
            (AlertStatus::Alert, AlertStatus::Drowsy) => {
                self.stats.drowsy_episodes += 1;
                counter!("dms_drowsy_episodes_total").increment(1);
                info!(
                    timestamp = ?sample.timestamp,
                    causes = ?assessment.causes,
                    "driver drowsy"
                );
            }
            (AlertStatus::Drowsy, AlertStatus::Alert) => {
                info!(timestamp = ?sample.timestamp, "driver alert again");
            }
            _ => {}
        }

        if assessment.status.is_drowsy() {
            self.stats.drowsy_samples += 1;
            counter!("dms_drowsy_samples_total").increment(1);
        }

        self.last_status = assessment.status;
        Some(assessment)
    }

    /// Run until the source ends or the sink asks to stop
    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<MonitorStats, DmsError>
    where
        S: DetectionSource + ?Sized,
        K: StatusSink + ?Sized,
    {
        info!("Starting drowsiness monitor (threshold {:?})", self.estimator.threshold());

        while let Some(sample) = source.next_sample()? {
            let Some(assessment) = self.step(&sample) else {
                continue;
            };

            if sink.render(&sample, &assessment)? == SinkControl::Stop {
                info!("Sink requested stop");
                break;
            }
        }

        info!(
            "Drowsiness monitor stopped: {} samples, {} drowsy episodes",
            self.stats.samples, self.stats.drowsy_episodes
        );
        Ok(self.stats)
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    pub fn estimator(&self) -> &DrowsinessStateEstimator {
        &self.estimator
    }

    /// Reset driver state (on driver change); the clock ordering is kept
    pub fn reset_state(&mut self) {
        self.estimator.reset();
        self.last_status = AlertStatus::Alert;
    }
}
