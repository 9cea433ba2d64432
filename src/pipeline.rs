//! Pipeline orchestration
//!
//! This module provides the public API for LikeLines.
//! It orchestrates the full computation from a raw aggregate JSON record to a
//! heat-map, keyframes, or a complete interest report.

use tracing::debug;

use crate::aggregate::AggregateSnapshot;
use crate::config::AnalysisConfig;
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::heatmap::HeatmapCompositor;
use crate::keyframes::KeyframeSelector;
use crate::schema::RawAggregate;
use crate::types::Keyframe;

/// Convert a raw aggregate JSON record into a heat-map.
///
/// # Arguments
/// * `raw_json` - Aggregate record (`likedPoints`, `playbacks`, `mca`)
/// * `size` - Number of heat-map bins
///
/// # Returns
/// JSON array of `size` values in [0, 1]
///
/// # Example
/// ```ignore
/// let heatmap = aggregate_to_heatmap(aggregate_json, 425)?;
/// ```
pub fn aggregate_to_heatmap(raw_json: String, size: usize) -> Result<String, ComputeError> {
    let processor = LikeLinesProcessor::new();
    let snapshot = processor.snapshot(&raw_json)?;
    let heatmap = processor.heatmap(&snapshot, size);
    serde_json::to_string(&heatmap).map_err(ComputeError::JsonError)
}

/// Convert a raw aggregate JSON record into the top-N keyframe timecodes.
///
/// # Arguments
/// * `raw_json` - Aggregate record (`likedPoints`, `playbacks`, `mca`)
/// * `n` - Maximum number of keyframes; `n <= 0` yields an empty list
///
/// # Returns
/// JSON array of timecodes, most interesting first
///
/// # Example
/// ```ignore
/// let keyframes = aggregate_to_keyframes(aggregate_json, 5)?;
/// ```
pub fn aggregate_to_keyframes(raw_json: String, n: i64) -> Result<String, ComputeError> {
    let processor = LikeLinesProcessor::new();
    let snapshot = processor.snapshot(&raw_json)?;
    let timecodes = processor.top_n_keyframes(&snapshot, n)?;
    serde_json::to_string(&timecodes).map_err(ComputeError::JsonError)
}

/// Configured processor reusing one set of analysis parameters.
///
/// Pipeline stages:
/// 1. RawAggregate - Parse and validate the wire record
/// 2. AggregateSnapshot - Build entities and estimate the duration
/// 3. HeatmapCompositor - Combine likes, playback and content analysis
/// 4. KeyframeSelector - Rank heat-map peaks
/// 5. ReportEncoder - Encode to report JSON
pub struct LikeLinesProcessor {
    config: AnalysisConfig,
    compositor: HeatmapCompositor,
    selector: KeyframeSelector,
    encoder: ReportEncoder,
}

impl Default for LikeLinesProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl LikeLinesProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
            compositor: HeatmapCompositor::default(),
            selector: KeyframeSelector::default(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create a processor with explicit analysis parameters
    pub fn with_config(config: AnalysisConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        let compositor = HeatmapCompositor::new(config.smoothing, config.weights)?;
        let selector = KeyframeSelector::new(compositor, config.peak_delta)?;
        Ok(Self {
            config,
            compositor,
            selector,
            encoder: ReportEncoder::new(),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Stages 1-2: parse a raw aggregate record into a snapshot
    pub fn snapshot(&self, raw_json: &str) -> Result<AggregateSnapshot, ComputeError> {
        let raw = RawAggregate::from_json(raw_json)?;
        AggregateSnapshot::from_raw(
            &raw,
            &self.config.duration_excluded_series,
            self.config.max_duration,
        )
    }

    /// Stage 3: heat-map with `size` bins
    pub fn heatmap(&self, snapshot: &AggregateSnapshot, size: usize) -> Vec<f64> {
        self.compositor.heatmap(snapshot, size)
    }

    /// Stage 3: heat-map with the configured number of bins
    pub fn heatmap_default(&self, snapshot: &AggregateSnapshot) -> Vec<f64> {
        self.heatmap(snapshot, self.config.heatmap_size)
    }

    /// Stage 4: up to `n` keyframes with scores
    pub fn keyframes(&self, snapshot: &AggregateSnapshot, n: usize) -> Result<Vec<Keyframe>, ComputeError> {
        self.selector.keyframes(snapshot, n)
    }

    /// Stage 4: top-N keyframe timecodes
    pub fn top_n_keyframes(&self, snapshot: &AggregateSnapshot, n: i64) -> Result<Vec<f64>, ComputeError> {
        self.selector.top_n_keyframes(n, snapshot)
    }

    /// All stages: the interest report for one aggregate record
    pub fn report(
        &self,
        raw_json: &str,
        n: usize,
        video_id: Option<String>,
    ) -> Result<String, ComputeError> {
        let snapshot = self.snapshot(raw_json)?;
        let heatmap = self.heatmap_default(&snapshot);
        let keyframes = self.keyframes(&snapshot, n)?;
        debug!(
            bins = heatmap.len(),
            keyframes = keyframes.len(),
            "encoding interest report"
        );
        self.encoder
            .encode_to_json(&snapshot, heatmap, keyframes, video_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_aggregate_json() -> &'static str {
        r#"{
            "likedPoints": [29, 29.4, 28.7, 89, 89.2],
            "playbacks": [
                [[0, 60], [60, 120]],
                [[25, 35]],
                [[null, 12]]
            ],
            "mca": {
                "deeplinks": {"type": "point", "data": [31, 900]},
                "motionActivity": {"type": "curve", "weight": 0.5, "data": [0.1, 0.2, 0.9, 0.3, 0.1]}
            }
        }"#
    }

    #[test]
    fn test_aggregate_to_heatmap() {
        let json = aggregate_to_heatmap(sample_aggregate_json().to_string(), 425).unwrap();
        let heatmap: Vec<f64> = serde_json::from_str(&json).unwrap();

        assert_eq!(heatmap.len(), 425);
        assert!(heatmap.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(heatmap.iter().copied().fold(0.0, f64::max), 1.0);
    }

    #[test]
    fn test_aggregate_to_keyframes() {
        let json = aggregate_to_keyframes(sample_aggregate_json().to_string(), 3).unwrap();
        let keyframes: Vec<f64> = serde_json::from_str(&json).unwrap();

        assert!(!keyframes.is_empty());
        assert!(keyframes.len() <= 3);
        // The like cluster around 29 s coincides with the re-watched segment
        assert!((28.0..=32.0).contains(&keyframes[0]));
    }

    #[test]
    fn test_keyframes_with_non_positive_n() {
        let json = aggregate_to_keyframes(sample_aggregate_json().to_string(), 0).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn test_processor_uses_configured_exclusions() {
        let default = LikeLinesProcessor::new();
        assert_eq!(
            default.snapshot(sample_aggregate_json()).unwrap().duration_estimate(),
            120
        );

        let config = AnalysisConfig {
            duration_excluded_series: vec![],
            ..Default::default()
        };
        let processor = LikeLinesProcessor::with_config(config).unwrap();
        assert_eq!(
            processor.snapshot(sample_aggregate_json()).unwrap().duration_estimate(),
            900
        );
    }

    #[test]
    fn test_processor_report() {
        let config = AnalysisConfig {
            heatmap_size: 50,
            ..Default::default()
        };
        let processor = LikeLinesProcessor::with_config(config).unwrap();
        let json = processor
            .report(sample_aggregate_json(), 2, Some("video-1".to_string()))
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["video_id"], "video-1");
        assert_eq!(parsed["duration_estimate"], 120);
        assert_eq!(parsed["heatmap"].as_array().unwrap().len(), 50);
        assert!(parsed["keyframes"].as_array().unwrap().len() <= 2);
        assert_eq!(parsed["producer"]["name"], "likelines");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnalysisConfig {
            peak_delta: 0.0,
            ..Default::default()
        };
        assert!(LikeLinesProcessor::with_config(config).is_err());
    }

    #[test]
    fn test_invalid_json() {
        let result = aggregate_to_heatmap("not valid json".to_string(), 425);
        assert!(matches!(result, Err(ComputeError::JsonError(_))));
    }

    #[test]
    fn test_duration_limit() {
        let result = aggregate_to_heatmap(r#"{"likedPoints": [1e300], "playbacks": []}"#.to_string(), 10);
        assert!(matches!(result, Err(ComputeError::MalformedInput(_))));

        let config = AnalysisConfig {
            max_duration: 60,
            ..Default::default()
        };
        let processor = LikeLinesProcessor::with_config(config).unwrap();
        assert!(processor.snapshot(sample_aggregate_json()).is_err());
        assert!(LikeLinesProcessor::new().snapshot(sample_aggregate_json()).is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let result = aggregate_to_keyframes(r#"{"likedPoints": []}"#.to_string(), 5);
        assert!(matches!(result, Err(ComputeError::MalformedInput(_))));
    }
}
