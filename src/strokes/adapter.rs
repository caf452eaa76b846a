//! Stroke payload adapter
//!
//! Parses recorded pen samples from JSON. Two shapes are accepted: a bare
//! array of samples, or an object carrying them under `"strokes"`. Newline
//! delimited streams (one sample per line) are handled by [`parse_ndjson`].

use serde::Deserialize;

use crate::error::ComputeError;
use crate::types::StrokeSample;

#[derive(Deserialize)]
#[serde(untagged)]
enum StrokePayload {
    Samples(Vec<StrokeSample>),
    Session { strokes: Vec<StrokeSample> },
}

fn validate_all(samples: &[StrokeSample]) -> Result<(), ComputeError> {
    samples.iter().try_for_each(StrokeSample::validate)
}

/// Parse a JSON array of samples, or an object with a `strokes` array
pub fn parse_samples(json: &str) -> Result<Vec<StrokeSample>, ComputeError> {
    let payload: StrokePayload = serde_json::from_str(json)
        .map_err(|e| ComputeError::ParseError(format!("Failed to parse stroke samples: {}", e)))?;

    let samples = match payload {
        StrokePayload::Samples(samples) => samples,
        StrokePayload::Session { strokes } => strokes,
    };
    validate_all(&samples)?;
    Ok(samples)
}

/// Parse newline-delimited JSON, one sample per line. Blank lines are skipped.
pub fn parse_ndjson(input: &str) -> Result<Vec<StrokeSample>, ComputeError> {
    let mut samples = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let sample: StrokeSample = serde_json::from_str(line).map_err(|e| {
            ComputeError::ParseError(format!("line {}: {}", line_no + 1, e))
        })?;
        samples.push(sample);
    }
    validate_all(&samples)?;
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array() {
        let json = r#"[
            {"x": 0, "y": 0, "timestamp": 0, "pressure": 0.4},
            {"x": 3, "y": 4, "timestamp": 20, "stroke_id": 1}
        ]"#;
        let samples = parse_samples(json).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].pressure, 0.4);
        assert_eq!(samples[1].pressure, 0.5);
        assert_eq!(samples[1].stroke_id, Some(1));
    }

    #[test]
    fn test_parse_wrapped_object() {
        let json = r#"{"strokes": [{"x": 1, "y": 2, "timestamp": 5}]}"#;
        let samples = parse_samples(json).unwrap();
        assert_eq!(samples, vec![StrokeSample::new(1.0, 2.0, 5, 0.5)]);
    }

    #[test]
    fn test_rejects_bad_payloads() {
        assert!(matches!(
            parse_samples("{\"points\": []}"),
            Err(ComputeError::ParseError(_))
        ));
        assert!(matches!(
            parse_samples(r#"[{"x": 0, "y": 0, "timestamp": 0, "pressure": 3.0}]"#),
            Err(ComputeError::InvalidSample(_))
        ));
    }

    #[test]
    fn test_parse_ndjson() {
        let input = "{\"x\": 0, \"y\": 0, \"timestamp\": 0}\n\n{\"x\": 1, \"y\": 0, \"timestamp\": 20}\n";
        assert_eq!(parse_ndjson(input).unwrap().len(), 2);

        let err = parse_ndjson("{\"x\": 0, \"y\": 0, \"timestamp\": 0}\nnot json").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
