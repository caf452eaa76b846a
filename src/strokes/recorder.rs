//! Pen-sample recording
//!
//! A [`StrokeRecorder`] owns the samples of one therapy attempt. The caller
//! forwards pointer events to it; the recorder throttles them, filters input
//! devices, and tags every sample with the stroke it was drawn in.

use serde::{Deserialize, Serialize};

use crate::types::{PointerKind, StrokeSample, DEFAULT_PRESSURE};

/// Minimum spacing between accepted events
pub const DEFAULT_MIN_INTERVAL_MS: i64 = 20;

/// Raw pointer reading forwarded by the UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    /// Capture time in milliseconds
    pub timestamp: i64,
    /// Reported pressure, absent on devices without a sensor
    #[serde(default)]
    pub pressure: Option<f64>,
    pub kind: PointerKind,
}

/// Recorder settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Events closer than this to the last accepted one are dropped
    pub min_interval_ms: i64,
    /// Record mouse input as well as pen and touch
    pub accept_mouse: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            accept_mouse: false,
        }
    }
}

/// Accumulates stroke samples across pen-down / pen-up cycles
#[derive(Debug, Clone, Default)]
pub struct StrokeRecorder {
    config: RecorderConfig,
    samples: Vec<StrokeSample>,
    current: Vec<StrokeSample>,
    next_stroke_id: u32,
    pen_down: bool,
    last_capture_ms: Option<i64>,
}

impl StrokeRecorder {
    /// Create a recorder with default settings (20 ms throttle, pen and touch)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder with custom settings
    pub fn with_config(config: RecorderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Start a new stroke, closing any stroke left open
    pub fn pen_down(&mut self) {
        if self.pen_down {
            self.pen_up();
        }
        self.pen_down = true;
    }

    /// Record a pointer event.
    ///
    /// Returns `false` when the event was dropped: pen not down, filtered
    /// device, or inside the throttle interval.
    pub fn record(&mut self, event: PointerEvent) -> bool {
        if !self.pen_down {
            return false;
        }
        if event.kind == PointerKind::Mouse && !self.config.accept_mouse {
            return false;
        }
        if let Some(last) = self.last_capture_ms {
            if event.timestamp.saturating_sub(last) < self.config.min_interval_ms {
                return false;
            }
        }

        self.last_capture_ms = Some(event.timestamp);
        let pressure = event.pressure.unwrap_or(DEFAULT_PRESSURE).clamp(0.0, 1.0);
        self.current.push(
            StrokeSample::new(event.x, event.y, event.timestamp, pressure)
                .in_stroke(self.next_stroke_id),
        );
        true
    }

    /// Finish the current stroke
    pub fn pen_up(&mut self) {
        self.pen_down = false;
        if self.current.is_empty() {
            return;
        }
        self.samples.append(&mut self.current);
        self.next_stroke_id += 1;
    }

    /// Finalized samples so far, in capture order
    pub fn samples(&self) -> &[StrokeSample] {
        &self.samples
    }

    /// Number of finished strokes that produced at least one sample
    pub fn stroke_count(&self) -> u32 {
        self.next_stroke_id
    }

    /// Close the open stroke and hand over every recorded sample.
    ///
    /// The recorder is left empty and ready for the next attempt.
    pub fn finish(&mut self) -> Vec<StrokeSample> {
        self.pen_up();
        let samples = std::mem::take(&mut self.samples);
        log::debug!(
            "recorder finished with {} samples in {} strokes",
            samples.len(),
            self.next_stroke_id
        );
        self.reset();
        samples
    }

    /// Drop everything recorded so far
    pub fn reset(&mut self) {
        self.samples.clear();
        self.current.clear();
        self.next_stroke_id = 0;
        self.pen_down = false;
        self.last_capture_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen(x: f64, t: i64) -> PointerEvent {
        PointerEvent {
            x,
            y: 0.0,
            timestamp: t,
            pressure: Some(0.8),
            kind: PointerKind::Pen,
        }
    }

    #[test]
    fn test_records_only_while_pen_down() {
        let mut recorder = StrokeRecorder::new();
        assert!(!recorder.record(pen(0.0, 0)));

        recorder.pen_down();
        assert!(recorder.record(pen(1.0, 0)));
        recorder.pen_up();
        assert!(!recorder.record(pen(2.0, 100)));
        assert_eq!(recorder.samples().len(), 1);
    }

    #[test]
    fn test_throttle() {
        let mut recorder = StrokeRecorder::new();
        recorder.pen_down();
        assert!(recorder.record(pen(0.0, 0)));
        assert!(!recorder.record(pen(1.0, 19)));
        assert!(recorder.record(pen(2.0, 20)));
        assert!(!recorder.record(pen(3.0, 25)));
        assert_eq!(recorder.finish().len(), 2);
    }

    #[test]
    fn test_device_filter_and_default_pressure() {
        let mut recorder = StrokeRecorder::new();
        recorder.pen_down();
        let mouse = PointerEvent {
            kind: PointerKind::Mouse,
            ..pen(0.0, 0)
        };
        assert!(!recorder.record(mouse));

        let touch = PointerEvent {
            kind: PointerKind::Touch,
            pressure: None,
            ..pen(0.0, 0)
        };
        assert!(recorder.record(touch));
        assert_eq!(recorder.finish()[0].pressure, DEFAULT_PRESSURE);

        let mut permissive = StrokeRecorder::with_config(RecorderConfig {
            min_interval_ms: 0,
            accept_mouse: true,
        });
        permissive.pen_down();
        assert!(permissive.record(mouse));
        assert!(permissive.record(mouse));
    }

    #[test]
    fn test_strokes_are_tagged() {
        let mut recorder = StrokeRecorder::new();
        recorder.pen_down();
        recorder.record(pen(0.0, 0));
        recorder.record(pen(1.0, 40));
        recorder.pen_up();

        // A tap that records nothing does not consume a stroke id
        recorder.pen_down();
        recorder.pen_up();

        recorder.pen_down();
        recorder.record(pen(50.0, 200));
        // Stroke left open is closed by finish

        let samples = recorder.finish();
        let ids: Vec<Option<u32>> = samples.iter().map(|s| s.stroke_id).collect();
        assert_eq!(ids, vec![Some(0), Some(0), Some(1)]);
        assert!(samples[1].crosses_boundary(&samples[2]));

        assert!(recorder.samples().is_empty());
        assert_eq!(recorder.stroke_count(), 0);
    }

    #[test]
    fn test_extreme_timestamps_are_throttled_not_overflowed() {
        let mut recorder = StrokeRecorder::new();
        recorder.pen_down();
        assert!(recorder.record(pen(0.0, i64::MAX)));
        // Going back in time is inside the throttle window
        assert!(!recorder.record(pen(1.0, -5)));
        assert!(!recorder.record(pen(2.0, i64::MIN)));
        assert_eq!(recorder.finish().len(), 1);

        recorder.pen_down();
        assert!(recorder.record(pen(0.0, i64::MIN)));
        assert!(recorder.record(pen(1.0, i64::MAX)));
    }
}
