//! Motion-activity post-processing
//!
//! The external motion analyzer prints one value per decoded frame. Negative
//! values are status codes rather than measurements; they are resolved from
//! neighboring measurements before the scores are clipped, scaled into
//! [0, 1] and median filtered. The result is a CURVE series for the combiner.

use tracing::debug;

use crate::error::ComputeError;
use crate::schema::RawMcaRecord;
use crate::types::{ContentAnalysisSeries, SeriesKind, MOTION_ACTIVITY_SERIES};

/// Activity values above this are clipped before scaling
pub const DEFAULT_CLIPPING_THRESHOLD: f64 = 32.0;

/// Status codes emitted by the motion analyzer in place of a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCode {
    /// The decoder skipped the frame
    SkippedFrame,
    /// The frame carries no motion-vector field
    NoMotion,
    /// The frame duplicates its predecessor
    DuplicateFrame,
}

impl FrameCode {
    pub fn value(&self) -> f64 {
        match self {
            FrameCode::SkippedFrame => -1.0,
            FrameCode::NoMotion => -2.0,
            FrameCode::DuplicateFrame => -3.0,
        }
    }

    /// Status code for a raw analyzer value; `None` for measurements.
    ///
    /// Unknown negative values are reported as skipped frames.
    pub fn from_value(value: f64) -> Option<Self> {
        if value >= 0.0 {
            None
        } else if value == -2.0 {
            Some(FrameCode::NoMotion)
        } else if value == -3.0 {
            Some(FrameCode::DuplicateFrame)
        } else {
            Some(FrameCode::SkippedFrame)
        }
    }
}

/// Converts raw analyzer output into a normalized activity curve
#[derive(Debug, Clone, Copy)]
pub struct MotionActivityProcessor {
    clipping_threshold: f64,
}

impl Default for MotionActivityProcessor {
    fn default() -> Self {
        Self {
            clipping_threshold: DEFAULT_CLIPPING_THRESHOLD,
        }
    }
}

impl MotionActivityProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clipping_threshold(threshold: f64) -> Result<Self, ComputeError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ComputeError::InvalidArgument(format!(
                "clipping threshold must be positive, got {threshold}"
            )));
        }
        Ok(Self {
            clipping_threshold: threshold,
        })
    }

    /// Parse and process analyzer stdout
    pub fn process_output(&self, output: &str) -> Result<Vec<f64>, ComputeError> {
        let raw = parse_output(output)?;
        Ok(self.process(&raw))
    }

    /// Resolve status codes, clip, scale and median filter
    pub fn process(&self, raw: &[f64]) -> Vec<f64> {
        let mut scores = resolve_frame_codes(raw);
        for score in scores.iter_mut() {
            *score = score.min(self.clipping_threshold) / self.clipping_threshold;
        }
        let scores = median_filter(&scores);

        debug!(
            frames = raw.len(),
            codes = raw.iter().filter(|&&v| v < 0.0).count(),
            "processed motion activity"
        );
        scores
    }

    /// Processed scores as the `motionActivity` content-analysis series
    pub fn into_series(scores: Vec<f64>, weight: f64) -> ContentAnalysisSeries {
        ContentAnalysisSeries::new(MOTION_ACTIVITY_SERIES, SeriesKind::Curve, scores).with_weight(weight)
    }

    /// Processed scores as an `mca` wire record
    pub fn into_record(scores: Vec<f64>, weight: Option<f64>) -> RawMcaRecord {
        RawMcaRecord::new(SeriesKind::Curve, weight, scores)
    }
}

/// One value per non-blank line
pub fn parse_output(output: &str) -> Result<Vec<f64>, ComputeError> {
    output
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let line = line.trim();
            match line.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(ComputeError::ParseError(format!(
                    "line {}: expected a number, got {line:?}",
                    i + 1
                ))),
            }
        })
        .collect()
}

/// Replace status codes with usable scores.
///
/// `NoMotion` becomes 0. Skipped and duplicate frames take the mean of the
/// preceding resolved score and the next measurement after them, or the one
/// that exists, or 0.
pub fn resolve_frame_codes(raw: &[f64]) -> Vec<f64> {
    let mut resolved: Vec<f64> = Vec::with_capacity(raw.len());
    for (k, &value) in raw.iter().enumerate() {
        let score = match FrameCode::from_value(value) {
            None => value,
            Some(FrameCode::NoMotion) => 0.0,
            Some(FrameCode::SkippedFrame | FrameCode::DuplicateFrame) => {
                let before = resolved.last().copied();
                let after = raw[k + 1..].iter().copied().find(|v| *v >= 0.0);
                match (before, after) {
                    (Some(a), Some(b)) => 0.5 * (a + b),
                    (Some(v), None) | (None, Some(v)) => v,
                    (None, None) => 0.0,
                }
            }
        };
        resolved.push(score);
    }
    resolved
}

/// Sliding median over three samples; the first and last sample are kept
pub fn median_filter(scores: &[f64]) -> Vec<f64> {
    let mut out = scores.to_vec();
    for (k, window) in scores.windows(3).enumerate() {
        out[k + 1] = median3(window[0], window[1], window[2]);
    }
    out
}

fn median3(a: f64, b: f64, c: f64) -> f64 {
    a.min(b).max(a.max(b).min(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output() {
        let values = parse_output("3.5\n\n-1\n 12 \n").unwrap();
        assert_eq!(values, vec![3.5, -1.0, 12.0]);
    }

    #[test]
    fn test_parse_output_reports_line() {
        let err = parse_output("1\n2\nabc\n").unwrap_err();
        match err {
            ComputeError::ParseError(msg) => assert!(msg.starts_with("line 3")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(parse_output("NaN").is_err());
    }

    #[test]
    fn test_frame_codes() {
        assert_eq!(FrameCode::from_value(4.0), None);
        assert_eq!(FrameCode::from_value(0.0), None);
        assert_eq!(FrameCode::from_value(-1.0), Some(FrameCode::SkippedFrame));
        assert_eq!(FrameCode::from_value(-2.0), Some(FrameCode::NoMotion));
        assert_eq!(FrameCode::from_value(-3.0), Some(FrameCode::DuplicateFrame));
        assert_eq!(FrameCode::from_value(-7.0), Some(FrameCode::SkippedFrame));
        assert_eq!(FrameCode::DuplicateFrame.value(), -3.0);
    }

    #[test]
    fn test_resolve_frame_codes() {
        assert_eq!(
            resolve_frame_codes(&[4.0, -1.0, 8.0, -2.0, -3.0, -3.0, 2.0]),
            vec![4.0, 6.0, 8.0, 0.0, 1.0, 1.5, 2.0]
        );
    }

    #[test]
    fn test_resolved_no_motion_counts_as_neighbor() {
        assert_eq!(resolve_frame_codes(&[4.0, -2.0, -1.0, 8.0]), vec![4.0, 0.0, 4.0, 8.0]);
    }

    #[test]
    fn test_resolve_at_edges() {
        assert_eq!(resolve_frame_codes(&[-1.0, 6.0, -3.0]), vec![6.0, 6.0, 6.0]);
        assert_eq!(resolve_frame_codes(&[-1.0, -2.0]), vec![0.0, 0.0]);
        assert!(resolve_frame_codes(&[]).is_empty());
    }

    #[test]
    fn test_median_filter() {
        assert_eq!(
            median_filter(&[0.0, 1.0, 0.0, 0.5, 0.5]),
            vec![0.0, 0.0, 0.5, 0.5, 0.5]
        );
        assert_eq!(median_filter(&[0.3, 0.9]), vec![0.3, 0.9]);
        assert_eq!(median3(3.0, 1.0, 2.0), 2.0);
        assert_eq!(median3(1.0, 3.0, 2.0), 2.0);
        assert_eq!(median3(2.0, 2.0, 9.0), 2.0);
    }

    #[test]
    fn test_process_clips_and_scales() {
        let scores = MotionActivityProcessor::new().process(&[64.0, 16.0, -1.0, 8.0]);
        // resolved [64, 16, 12, 8] -> clipped [1, 0.5, 0.375, 0.25] -> median
        assert_eq!(scores, vec![1.0, 0.5, 0.375, 0.25]);
    }

    #[test]
    fn test_process_output_into_series() {
        let scores = MotionActivityProcessor::new()
            .process_output("0\n32\n-2\n16\n")
            .unwrap();
        assert_eq!(scores, vec![0.0, 0.0, 0.5, 0.5]);

        let series = MotionActivityProcessor::into_series(scores, 0.5);
        assert_eq!(series.name, MOTION_ACTIVITY_SERIES);
        assert_eq!(series.kind, SeriesKind::Curve);
        assert_eq!(series.weight, 0.5);
    }

    #[test]
    fn test_custom_threshold() {
        let processor = MotionActivityProcessor::with_clipping_threshold(10.0).unwrap();
        assert_eq!(processor.process(&[5.0, 20.0]), vec![0.5, 1.0]);
        assert!(MotionActivityProcessor::with_clipping_threshold(0.0).is_err());
    }
}
