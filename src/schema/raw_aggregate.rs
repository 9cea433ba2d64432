//! Aggregate record definition
//!
//! The record mirrors the JSON object returned by the server's `aggregate`
//! call:
//!
//! ```json
//! {
//!   "likedPoints": [12.5, 30.0],
//!   "playbacks": [[[0, 40], [55.2, null]]],
//!   "mca": { "motionActivity": { "type": "curve", "weight": 0.5, "data": [0.1, 0.3] } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::collections::BTreeMap;

use crate::error::ComputeError;
use crate::types::SeriesKind;

/// Raw per-video aggregate as received from the interaction server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAggregate {
    /// Timestamps (seconds) of explicit likes
    pub liked_points: Vec<f64>,
    /// Playback sessions, each a list of `[start, end]` pairs; `null` means 0
    pub playbacks: Vec<Vec<Vec<Option<f64>>>>,
    /// Content-analysis output keyed by algorithm name
    #[serde(default)]
    pub mca: BTreeMap<String, RawMcaRecord>,
}

/// Output of one content-analysis algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMcaRecord {
    /// "curve" or "point" (case-insensitive)
    #[serde(rename = "type")]
    pub kind: String,
    /// Relative weight; 1.0 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Curve samples or point timestamps
    pub data: Vec<f64>,
}

impl RawMcaRecord {
    /// Build a record for a known series kind
    pub fn new(kind: SeriesKind, weight: Option<f64>, data: Vec<f64>) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            weight,
            data,
        }
    }
}

impl RawAggregate {
    /// Parse an aggregate from JSON.
    ///
    /// Syntax errors surface as `JsonError`; well-formed JSON with missing or
    /// ill-typed fields surfaces as `MalformedInput`.
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        serde_json::from_str(json).map_err(|e| match e.classify() {
            Category::Data => ComputeError::MalformedInput(e.to_string()),
            _ => ComputeError::JsonError(e),
        })
    }

    /// Validate the record structure, failing on the first problem found
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.validation_issues().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Collect every structural problem in the record
    pub fn validation_issues(&self) -> Vec<ValidationError> {
        let mut issues = Vec::new();

        for (session, segments) in self.playbacks.iter().enumerate() {
            for (segment, pair) in segments.iter().enumerate() {
                if pair.len() < 2 {
                    issues.push(ValidationError::SegmentTooShort {
                        session,
                        segment,
                        len: pair.len(),
                    });
                }
            }
        }

        for (name, record) in &self.mca {
            if record.kind.parse::<SeriesKind>().is_err() {
                issues.push(ValidationError::UnknownSeriesType {
                    name: name.clone(),
                    kind: record.kind.clone(),
                });
            }
            if let Some(weight) = record.weight {
                if !weight.is_finite() || weight < 0.0 {
                    issues.push(ValidationError::InvalidWeight {
                        name: name.clone(),
                        weight,
                    });
                }
            }
        }

        issues
    }
}

/// Structural errors in an aggregate record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Played segment {segment} of session {session} has {len} endpoints, expected 2")]
    SegmentTooShort {
        session: usize,
        segment: usize,
        len: usize,
    },

    #[error("MCA series '{name}' has unknown type '{kind}' (expected curve or point)")]
    UnknownSeriesType { name: String, kind: String },

    #[error("MCA series '{name}' has invalid weight {weight}")]
    InvalidWeight { name: String, weight: f64 },
}
