//! Keyframe selection
//!
//! Keyframes are the positions of the strongest heat-map peaks. The heat-map
//! is computed with one bin per second of estimated duration and peak
//! positions are 1-based bin indices, so a keyframe timecode is the second
//! plus one: likes clustered at 29 s yield keyframe 30.

use tracing::debug;

use crate::aggregate::AggregateSnapshot;
use crate::error::ComputeError;
use crate::heatmap::HeatmapCompositor;
use crate::peaks::{Peaks, Point};
use crate::types::Keyframe;

/// Hysteresis threshold for peak detection on a [0, 1] heat-map
pub const DEFAULT_PEAK_DELTA: f64 = 0.1;

/// Ranks heat-map peaks into keyframes
#[derive(Debug, Clone, Copy)]
pub struct KeyframeSelector {
    compositor: HeatmapCompositor,
    delta: f64,
}

impl Default for KeyframeSelector {
    fn default() -> Self {
        Self {
            compositor: HeatmapCompositor::default(),
            delta: DEFAULT_PEAK_DELTA,
        }
    }
}

impl KeyframeSelector {
    pub fn new(compositor: HeatmapCompositor, delta: f64) -> Result<Self, ComputeError> {
        if !delta.is_finite() || delta <= 0.0 {
            return Err(ComputeError::InvalidArgument(format!(
                "peak delta must be positive, got {delta}"
            )));
        }
        Ok(Self { compositor, delta })
    }

    /// All detected peaks, strongest first.
    ///
    /// The sort is stable, so equal peaks keep their detection order.
    pub fn ranked_peaks(&self, snapshot: &AggregateSnapshot) -> Result<Vec<Point>, ComputeError> {
        let heatmap = self
            .compositor
            .heatmap(snapshot, snapshot.duration_estimate());
        let mut peaks = Peaks::extract(&heatmap, None, self.delta)?.peaks;
        peaks.sort_by(|a, b| b.y.total_cmp(&a.y));

        debug!(
            bins = heatmap.len(),
            peaks = peaks.len(),
            delta = self.delta,
            "ranked heat-map peaks"
        );
        Ok(peaks)
    }

    /// Up to `n` keyframes with their heat-map scores
    pub fn keyframes(&self, snapshot: &AggregateSnapshot, n: usize) -> Result<Vec<Keyframe>, ComputeError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        Ok(self
            .ranked_peaks(snapshot)?
            .into_iter()
            .take(n)
            .map(|p| Keyframe {
                timecode: p.x,
                score: p.y,
            })
            .collect())
    }

    /// Timecodes of the `n` most interesting moments; empty when `n <= 0`
    pub fn top_n_keyframes(&self, n: i64, snapshot: &AggregateSnapshot) -> Result<Vec<f64>, ComputeError> {
        let n = usize::try_from(n).unwrap_or(0);
        Ok(self
            .keyframes(snapshot, n)?
            .into_iter()
            .map(|k| k.timecode)
            .collect())
    }
}

/// Top-N keyframe timecodes with default smoothing, weights and delta
pub fn top_n_keyframes(n: i64, snapshot: &AggregateSnapshot) -> Vec<f64> {
    // The default delta is positive, so peak extraction cannot fail here
    KeyframeSelector::default()
        .top_n_keyframes(n, snapshot)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlaybackSession, PlayedSegment};

    /// Two like clusters (3 likes at 29 s, 2 at 89 s) over one full viewing
    fn two_cluster_snapshot() -> AggregateSnapshot {
        AggregateSnapshot::new(
            vec![29.0, 29.0, 29.0, 89.0, 89.0],
            vec![PlaybackSession::new(vec![PlayedSegment::new(0.0, 120.0)])],
            vec![],
        )
    }

    #[test]
    fn test_top_two_in_descending_order() {
        let snapshot = two_cluster_snapshot();
        assert_eq!(snapshot.duration_estimate(), 120);
        assert_eq!(top_n_keyframes(2, &snapshot), vec![30.0, 90.0]);
    }

    #[test]
    fn test_n_larger_than_peak_count() {
        let snapshot = two_cluster_snapshot();
        assert_eq!(top_n_keyframes(1, &snapshot), vec![30.0]);
        assert_eq!(top_n_keyframes(10, &snapshot), vec![30.0, 90.0]);
    }

    #[test]
    fn test_non_positive_n_is_empty() {
        let snapshot = two_cluster_snapshot();
        assert!(top_n_keyframes(0, &snapshot).is_empty());
        assert!(top_n_keyframes(-3, &snapshot).is_empty());
    }

    #[test]
    fn test_keyframe_scores() {
        let keyframes = KeyframeSelector::default()
            .keyframes(&two_cluster_snapshot(), 2)
            .unwrap();
        assert_eq!(keyframes[0].score, 1.0);
        // (1 + 2/3) / 2
        assert!((keyframes[1].score - 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_equal_peaks_keep_detection_order() {
        let snapshot = AggregateSnapshot::new(
            vec![20.0, 60.0, 100.0],
            vec![PlaybackSession::new(vec![PlayedSegment::new(0.0, 120.0)])],
            vec![],
        );
        assert_eq!(top_n_keyframes(3, &snapshot), vec![21.0, 61.0, 101.0]);
    }

    #[test]
    fn test_no_evidence_has_no_keyframes() {
        let snapshot = AggregateSnapshot::new(vec![], vec![], vec![]);
        assert!(top_n_keyframes(5, &snapshot).is_empty());
    }

    #[test]
    fn test_rejects_invalid_delta() {
        assert!(KeyframeSelector::new(HeatmapCompositor::default(), 0.0).is_err());
        assert!(KeyframeSelector::new(HeatmapCompositor::default(), f64::INFINITY).is_err());
    }
}
