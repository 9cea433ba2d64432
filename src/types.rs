//! Core types for the LikeLines computation
//!
//! This module defines the immutable entities parsed out of an aggregate record
//! (played segments, playback sessions, content-analysis series) and the
//! report structures produced at the end of the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the comment deep-link series, excluded from duration estimation
pub const DEEPLINKS_SERIES: &str = "deeplinks";

/// Name of the series produced by the motion-activity analyzer
pub const MOTION_ACTIVITY_SERIES: &str = "motionActivity";

/// A fragment of the video that was actually played
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayedSegment {
    /// Start of the played fragment (seconds)
    pub start: f64,
    /// End of the played fragment (seconds); not guaranteed to be >= start
    pub end: f64,
}

impl PlayedSegment {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Build a segment from wire endpoints, where a missing endpoint means 0
    pub fn from_endpoints(start: Option<f64>, end: Option<f64>) -> Self {
        Self::new(start.unwrap_or(0.0), end.unwrap_or(0.0))
    }

    /// Played duration; negative for reversed segments
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// The played segments of a single viewing session, in playback order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    segments: Vec<PlayedSegment>,
}

impl PlaybackSession {
    pub fn new(segments: Vec<PlayedSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[PlayedSegment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayedSegment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl<'a> IntoIterator for &'a PlaybackSession {
    type Item = &'a PlayedSegment;
    type IntoIter = std::slice::Iter<'a, PlayedSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Output type of a content-analysis algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// Uniformly sampled continuous interest curve
    Curve,
    /// Sparse list of interesting timestamps
    Point,
}

impl SeriesKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesKind::Curve => "curve",
            SeriesKind::Point => "point",
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "curve" => Ok(SeriesKind::Curve),
            "point" => Ok(SeriesKind::Point),
            other => Err(format!("unknown series type '{other}'")),
        }
    }
}

/// Output of one content-analysis (MCA) algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysisSeries {
    /// Algorithm name
    pub name: String,
    /// Whether `values` is a curve or a list of timestamps
    pub kind: SeriesKind,
    /// Contribution weight in the combined curve (>= 0)
    pub weight: f64,
    /// Curve samples or point timestamps
    pub values: Vec<f64>,
}

impl ContentAnalysisSeries {
    /// Default weight when the record carries none
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    pub fn new(name: impl Into<String>, kind: SeriesKind, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            kind,
            weight: Self::DEFAULT_WEIGHT,
            values,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Whether this series counts as evidence of the video's length
    pub fn informs_duration(&self, excluded: &[String]) -> bool {
        self.kind == SeriesKind::Point && !excluded.iter().any(|name| *name == self.name)
    }
}

/// Producer metadata embedded in reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// A keyframe candidate: a timecode and the heat-map value that selected it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Timecode (heat-map position, seconds when the heat-map has one bin per second)
    pub timecode: f64,
    /// Heat-map value at the peak (0-1)
    pub score: f64,
}

/// Interest report for one video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestReport {
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    /// Estimated video length in seconds
    pub duration_estimate: usize,
    /// Total seconds watched across all sessions
    pub time_watched: f64,
    /// Normalized heat-map (0-1)
    pub heatmap: Vec<f64>,
    /// Top keyframes, most interesting first
    pub keyframes: Vec<Keyframe>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_kind_parse_is_case_insensitive() {
        assert_eq!("CURVE".parse::<SeriesKind>().unwrap(), SeriesKind::Curve);
        assert_eq!("point".parse::<SeriesKind>().unwrap(), SeriesKind::Point);
        assert!("blob".parse::<SeriesKind>().is_err());
    }

    #[test]
    fn test_null_endpoints_are_zero() {
        let segment = PlayedSegment::from_endpoints(None, Some(12.0));
        assert_eq!(segment, PlayedSegment::new(0.0, 12.0));
        assert_eq!(segment.duration(), 12.0);
    }

    #[test]
    fn test_informs_duration() {
        let excluded = vec![DEEPLINKS_SERIES.to_string()];
        let points = ContentAnalysisSeries::new("faces", SeriesKind::Point, vec![3.0]);
        let deeplinks = ContentAnalysisSeries::new(DEEPLINKS_SERIES, SeriesKind::Point, vec![9.0]);
        let curve = ContentAnalysisSeries::new(MOTION_ACTIVITY_SERIES, SeriesKind::Curve, vec![]);

        assert!(points.informs_duration(&excluded));
        assert!(!deeplinks.informs_duration(&excluded));
        assert!(!curve.informs_duration(&excluded));
    }
}
