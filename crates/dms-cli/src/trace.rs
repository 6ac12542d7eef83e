//! Detection trace replay
//!
//! A trace is JSON lines, one sampled instant per line:
//!
//! ```text
//! {"t": 0.0, "labels": ["Eyeclosed"]}
//! {"t": 0.033, "detections": [{"label": "Yawn", "confidence": 0.71}]}
//! ```
//!
//! `labels` are taken as already gated upstream; `detections` go through the
//! configured confidence threshold. Blank lines and `#` comments are skipped.

use dms::{Detection, DetectionSet, DetectionSource, DmsError, Sample};
use serde::Deserialize;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::CliError;

#[derive(Debug, Deserialize)]
struct TraceRecord {
    /// Seconds since start of recording
    t: f64,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    detections: Vec<Detection>,
}

/// Parse one trace line. `line_no` is 1-based and only used for errors.
pub fn parse_line(
    line: &str,
    line_no: usize,
    min_confidence: f32,
) -> Result<Option<Sample>, CliError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let record: TraceRecord = serde_json::from_str(line).map_err(|e| CliError::Trace {
        line: line_no,
        message: e.to_string(),
    })?;

    if !record.t.is_finite() || record.t < 0.0 {
        return Err(CliError::Trace {
            line: line_no,
            message: format!("timestamp {} must be a non-negative number of seconds", record.t),
        });
    }
    let timestamp = Duration::try_from_secs_f64(record.t).map_err(|e| CliError::Trace {
        line: line_no,
        message: e.to_string(),
    })?;

    let mut detections = DetectionSet::from_detections(record.detections, min_confidence);
    for label in record.labels {
        detections.insert(label);
    }

    Ok(Some(Sample::new(timestamp, detections)))
}

/// Create the producer/consumer pair. There is exactly one consumer, so
/// samples reach the estimator in the order they were sent.
pub fn channel(capacity: usize) -> (mpsc::Sender<Sample>, ChannelSource) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (tx, ChannelSource { receiver: rx })
}

/// Read a trace and send each sample downstream. Returns the number sent.
///
/// Stops early without error once the consumer has gone away, including
/// while waiting on a reader that never reaches end of input.
pub async fn produce<R>(
    reader: R,
    tx: mpsc::Sender<Sample>,
    min_confidence: f32,
) -> Result<u64, CliError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0;
    let mut sent = 0;

    loop {
        // next_line is cancel safe, so losing the race drops no partial line
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tx.closed() => {
                debug!("Monitor dropped the trace channel while waiting for input");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        line_no += 1;
        let Some(sample) = parse_line(&line, line_no, min_confidence)? else {
            continue;
        };

        if tx.send(sample).await.is_err() {
            debug!("Monitor dropped the trace channel at line {}", line_no);
            break;
        }
        sent += 1;
    }

    info!("Trace producer finished: {} samples", sent);
    Ok(sent)
}

/// Blocking detection source fed by [`produce`]; run it off the async runtime
pub struct ChannelSource {
    receiver: mpsc::Receiver<Sample>,
}

impl DetectionSource for ChannelSource {
    fn next_sample(&mut self) -> Result<Option<Sample>, DmsError> {
        Ok(self.receiver.blocking_recv())
    }
}
