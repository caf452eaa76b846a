//! Therapy sessions
//!
//! A [`TherapySession`] walks a patient through the digits 0–9, records the
//! pen samples of every attempt and keeps the recognition outcomes. Finishing
//! it produces a [`SessionSummary`] that a [`SessionHistory`] can compare with
//! the patient's previous sessions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::Recognition;
use crate::error::ComputeError;
use crate::feedback::feedback_for_digit;
use crate::strokes::{analyze_session, StrokeRecorder};
use crate::types::SessionAnalysis;

/// Number of digits practised in one session
pub const DIGIT_COUNT: usize = 10;

/// Name used when the patient is not identified
pub const ANONYMOUS_PATIENT: &str = "Anonymous";

/// One recognized drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub target_digit: usize,
    pub predicted_digit: usize,
    pub correct: bool,
    pub confidence: f32,
    pub feedback_text: String,
    pub timestamp: DateTime<Utc>,
}

/// Change relative to the patient's previous session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Previous session compared against
    pub previous_session_id: String,
    /// Difference in average speed (px/s)
    pub speed_change: f64,
    /// Difference in micrographia shrink ratio
    pub size_change: Option<f64>,
    /// Difference in tremor score
    pub tremor_change: Option<f64>,
    /// Digit accuracy went up
    pub improvement: bool,
}

/// Everything produced by a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub patient_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub attempts: Vec<Attempt>,
    pub analysis: SessionAnalysis,
    /// Share of correct attempts in [0, 1]
    pub digit_accuracy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressReport>,
}

/// A digit-writing session in progress
#[derive(Debug)]
pub struct TherapySession {
    session_id: String,
    patient_name: String,
    started_at: DateTime<Utc>,
    current_index: usize,
    attempts: Vec<Attempt>,
    recorder: StrokeRecorder,
}

impl TherapySession {
    /// Start a session; a blank name is recorded as anonymous
    pub fn new(patient_name: &str) -> Self {
        let patient_name = match patient_name.trim() {
            "" => ANONYMOUS_PATIENT.to_string(),
            name => name.to_string(),
        };
        let session = Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            patient_name,
            started_at: Utc::now(),
            current_index: 0,
            attempts: Vec::new(),
            recorder: StrokeRecorder::new(),
        };
        log::info!(
            "session {} started for {}",
            session.session_id,
            session.patient_name
        );
        session
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Digit the patient is asked to draw
    pub fn current_digit(&self) -> usize {
        self.current_index
    }

    /// Move to the next digit; stays on the last one
    pub fn advance(&mut self) {
        if self.current_index < DIGIT_COUNT - 1 {
            self.current_index += 1;
        }
    }

    /// The last digit has been reached
    pub fn is_finished(&self) -> bool {
        self.current_index >= DIGIT_COUNT - 1
    }

    /// Recorder receiving the pen events of this session
    pub fn recorder_mut(&mut self) -> &mut StrokeRecorder {
        &mut self.recorder
    }

    /// Attempts so far, in order
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// Store the outcome of recognizing a drawing of `target_digit`
    pub fn record_attempt(&mut self, target_digit: usize, recognition: &Recognition) -> &Attempt {
        let attempt = Attempt {
            target_digit,
            predicted_digit: recognition.label,
            correct: recognition.label == target_digit,
            confidence: recognition.confidence,
            feedback_text: feedback_for_digit(recognition.label),
            timestamp: Utc::now(),
        };
        log::debug!(
            "attempt for {}: predicted {} ({:.2})",
            target_digit,
            attempt.predicted_digit,
            attempt.confidence
        );
        self.attempts.push(attempt);
        &self.attempts[self.attempts.len() - 1]
    }

    /// Close the session and analyze everything that was recorded.
    ///
    /// # Arguments
    /// * `threshold_percent` - Speed drop above which fatigue is reported
    /// * `history` - Stored sessions to compare against
    pub fn finish(
        mut self,
        threshold_percent: f64,
        history: Option<&SessionHistory>,
    ) -> SessionSummary {
        let samples = self.recorder.finish();
        let analysis = analyze_session(&samples, threshold_percent);

        let correct = self.attempts.iter().filter(|a| a.correct).count();
        let digit_accuracy = correct as f64 / self.attempts.len().max(1) as f64;

        let mut summary = SessionSummary {
            session_id: self.session_id,
            patient_name: self.patient_name,
            started_at: self.started_at,
            finished_at: Utc::now(),
            attempts: self.attempts,
            analysis,
            digit_accuracy,
            progress: None,
        };
        summary.progress =
            history.and_then(|h| h.progress_report(&summary.patient_name, &summary));

        log::info!(
            "session {} finished: {} attempts, accuracy {:.2}",
            summary.session_id,
            summary.attempts.len(),
            summary.digit_accuracy
        );
        summary
    }
}

fn patient_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Finished sessions grouped by patient.
///
/// Patients are matched case-insensitively after trimming. Persistence is the
/// caller's concern; the store round-trips through JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionHistory {
    patients: BTreeMap<String, Vec<SessionSummary>>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a session. Returns `false` if its id was already stored.
    pub fn save(&mut self, summary: SessionSummary) -> bool {
        let sessions = self
            .patients
            .entry(patient_key(&summary.patient_name))
            .or_default();
        if sessions.iter().any(|s| s.session_id == summary.session_id) {
            return false;
        }
        sessions.push(summary);
        true
    }

    /// Stored sessions of a patient, oldest first
    pub fn sessions(&self, patient_name: &str) -> &[SessionSummary] {
        self.patients
            .get(&patient_key(patient_name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Compare `current` with the most recent other session of the patient
    pub fn progress_report(
        &self,
        patient_name: &str,
        current: &SessionSummary,
    ) -> Option<ProgressReport> {
        let previous = self
            .sessions(patient_name)
            .iter()
            .rev()
            .find(|s| s.session_id != current.session_id)?;

        let now = &current.analysis.metrics;
        let before = &previous.analysis.metrics;

        let size_change = match (&now.micrographia_data, &before.micrographia_data) {
            (Some(a), Some(b)) => Some(a.shrink_ratio - b.shrink_ratio),
            _ => None,
        };
        let tremor_change = match (&now.tremor_data, &before.tremor_data) {
            (Some(a), Some(b)) => Some(a.tremor_score - b.tremor_score),
            _ => None,
        };

        Some(ProgressReport {
            previous_session_id: previous.session_id.clone(),
            speed_change: now.avg_speed - before.avg_speed,
            size_change,
            tremor_change,
            improvement: current.digit_accuracy > previous.digit_accuracy,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string(self)?)
    }
}
