//! Status rendering

use dms::{
    AlertStatus, Assessment, DmsError, DrowsinessCause, MonitorStats, Sample, SinkControl,
    StatusSink,
};
use serde::Serialize;
use std::io::Write;

/// Output format for status lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// One rendered status line in JSON output
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Sample time in seconds
    pub t: f64,
    pub status: AlertStatus,
    pub causes: Vec<DrowsinessCause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closure_secs: Option<f64>,
    pub labels: Vec<String>,
}

impl StatusReport {
    pub fn new(sample: &Sample, assessment: &Assessment) -> Self {
        let mut labels: Vec<String> = sample.detections.iter().map(str::to_string).collect();
        labels.sort();

        Self {
            t: sample.timestamp.as_secs_f64(),
            status: assessment.status,
            causes: assessment.causes.clone(),
            closure_secs: assessment.closure_duration.map(|d| d.as_secs_f64()),
            labels,
        }
    }
}

/// Writes one line per sample, the terminal stand-in for the video overlay
pub struct ConsoleSink<W: Write> {
    out: W,
    format: OutputFormat,
    color: bool,
    stop_on_drowsy: bool,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            color: false,
            stop_on_drowsy: false,
        }
    }

    /// Colour the status with the overlay colours (ANSI truecolor)
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// End the session on the first drowsy status
    pub fn stop_on_drowsy(mut self, stop: bool) -> Self {
        self.stop_on_drowsy = stop;
        self
    }

    fn status_text(&self, status: AlertStatus) -> String {
        if self.color {
            let (r, g, b) = status.overlay_rgb();
            format!("\x1b[1;38;2;{};{};{}m{}\x1b[0m", r, g, b, status)
        } else {
            status.to_string()
        }
    }

    fn write_line(&mut self, sample: &Sample, assessment: &Assessment) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let report = StatusReport::new(sample, assessment);
                serde_json::to_writer(&mut self.out, &report)?;
                writeln!(self.out)
            }
            OutputFormat::Text => {
                let status = self.status_text(assessment.status);
                if assessment.causes.is_empty() {
                    writeln!(self.out, "t={:.3} {}", sample.timestamp.as_secs_f64(), status)
                } else {
                    writeln!(
                        self.out,
                        "t={:.3} {} {:?}",
                        sample.timestamp.as_secs_f64(),
                        status,
                        assessment.causes
                    )
                }
            }
        }
    }

    /// Write the session summary and flush
    pub fn finish(&mut self, stats: &MonitorStats) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &serde_json::json!({ "summary": stats }))?;
                writeln!(self.out)?;
            }
            OutputFormat::Text => {
                writeln!(
                    self.out,
                    "samples={} drowsy_samples={} drowsy_episodes={} dropped_out_of_order={}",
                    stats.samples,
                    stats.drowsy_samples,
                    stats.drowsy_episodes,
                    stats.dropped_out_of_order
                )?;
            }
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StatusSink for ConsoleSink<W> {
    fn render(
        &mut self,
        sample: &Sample,
        assessment: &Assessment,
    ) -> Result<SinkControl, DmsError> {
        self.write_line(sample, assessment)
            .map_err(|e| DmsError::Sink(e.to_string()))?;

        if self.stop_on_drowsy && assessment.status.is_drowsy() {
            Ok(SinkControl::Stop)
        } else {
            Ok(SinkControl::Continue)
        }
    }
}
