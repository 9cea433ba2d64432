//! Report encoding
//!
//! This module packages a computed heat-map and its keyframes into an
//! `InterestReport` JSON document stamped with producer metadata.

use crate::aggregate::AggregateSnapshot;
use crate::error::ComputeError;
use crate::types::{InterestReport, Keyframe, ReportProducer};
use crate::{LIKELINES_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Encoder for interest reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build a report for `snapshot` from its computed heat-map and keyframes
    pub fn encode(
        &self,
        snapshot: &AggregateSnapshot,
        heatmap: Vec<f64>,
        keyframes: Vec<Keyframe>,
        video_id: Option<String>,
    ) -> Result<InterestReport, ComputeError> {
        if let Some(bad) = heatmap.iter().position(|v| !v.is_finite()) {
            return Err(ComputeError::EncodingError(format!(
                "heat-map bin {bad} is not a finite number"
            )));
        }
        if keyframes
            .iter()
            .any(|k| !k.timecode.is_finite() || !k.score.is_finite())
        {
            return Err(ComputeError::EncodingError(
                "keyframe with a non-finite timecode or score".to_string(),
            ));
        }

        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: LIKELINES_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        Ok(InterestReport {
            producer,
            computed_at_utc: Utc::now().to_rfc3339(),
            video_id,
            duration_estimate: snapshot.duration_estimate(),
            time_watched: snapshot.time_watched(),
            heatmap,
            keyframes,
        })
    }

    /// Encode to JSON string
    pub fn encode_to_json(
        &self,
        snapshot: &AggregateSnapshot,
        heatmap: Vec<f64>,
        keyframes: Vec<Keyframe>,
        video_id: Option<String>,
    ) -> Result<String, ComputeError> {
        let report = self.encode(snapshot, heatmap, keyframes, video_id)?;
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlaybackSession, PlayedSegment};
    use chrono::DateTime;

    fn make_test_snapshot() -> AggregateSnapshot {
        AggregateSnapshot::new(
            vec![12.0],
            vec![PlaybackSession::new(vec![
                PlayedSegment::new(0.0, 20.0),
                PlayedSegment::new(30.0, 45.5),
            ])],
            vec![],
        )
    }

    #[test]
    fn test_encode_report() {
        let snapshot = make_test_snapshot();
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let keyframes = vec![Keyframe {
            timecode: 13.0,
            score: 1.0,
        }];
        let report = encoder
            .encode(&snapshot, vec![0.0, 0.5, 1.0], keyframes.clone(), Some("yt:abc".to_string()))
            .unwrap();

        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.version, LIKELINES_VERSION);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.video_id.as_deref(), Some("yt:abc"));
        assert_eq!(report.duration_estimate, 46);
        assert!((report.time_watched - 35.5).abs() < 1e-12);
        assert_eq!(report.heatmap, vec![0.0, 0.5, 1.0]);
        assert_eq!(report.keyframes, keyframes);
        assert!(DateTime::parse_from_rfc3339(&report.computed_at_utc).is_ok());
    }

    #[test]
    fn test_encode_to_json() {
        let snapshot = make_test_snapshot();
        let encoder = ReportEncoder::new();
        let json = encoder
            .encode_to_json(&snapshot, vec![1.0], vec![], None)
            .unwrap();

        // Verify it's valid JSON
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("producer").is_some());
        assert!(parsed.get("computed_at_utc").is_some());
        assert!(parsed.get("video_id").is_none());
        assert_eq!(parsed["duration_estimate"], 46);
        assert!(parsed["keyframes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_instance_ids_are_unique() {
        assert_ne!(ReportEncoder::new().instance_id(), ReportEncoder::new().instance_id());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let snapshot = make_test_snapshot();
        let encoder = ReportEncoder::new();
        assert!(matches!(
            encoder.encode(&snapshot, vec![0.2, f64::NAN], vec![], None),
            Err(ComputeError::EncodingError(_))
        ));
    }
}
