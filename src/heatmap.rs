//! Heat-map composition
//!
//! Combines the three kinds of evidence (smoothed likes, playback coverage and
//! the combined content-analysis curve) into one [0, 1] curve. Each signal is
//! normalized on its own; negative contributions are clipped so that a dip in
//! one signal cannot cancel another, and the sum is rescaled so the strongest
//! bin is exactly 1.0.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::AggregateSnapshot;
use crate::combiner::CurveCombiner;
use crate::config::SmoothingConfig;
use crate::error::ComputeError;
use crate::normalizer::normalize_in_place;
use crate::resample::resample;
use crate::smoothing::{project_onto_array, projection_step, SmoothingFunction, TimeRange};

/// Default number of heat-map bins
pub const DEFAULT_HEATMAP_SIZE: usize = 425;

/// Weights of the three evidence signals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceWeights {
    pub likes: f64,
    pub playback: f64,
    pub content: f64,
}

impl Default for EvidenceWeights {
    fn default() -> Self {
        Self {
            likes: 1.0,
            playback: 1.0,
            content: 1.0,
        }
    }
}

impl EvidenceWeights {
    pub fn validate(&self) -> Result<(), ComputeError> {
        for (name, weight) in [
            ("likes", self.likes),
            ("playback", self.playback),
            ("content", self.content),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ComputeError::InvalidArgument(format!(
                    "{name} weight must be a non-negative number, got {weight}"
                )));
            }
        }
        Ok(())
    }
}

/// Builds normalized heat-maps from aggregate snapshots
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatmapCompositor {
    smoothing: SmoothingConfig,
    combiner: CurveCombiner,
    weights: EvidenceWeights,
}

impl HeatmapCompositor {
    pub fn new(smoothing: SmoothingConfig, weights: EvidenceWeights) -> Result<Self, ComputeError> {
        let combiner = CurveCombiner::new(smoothing)?;
        weights.validate()?;
        Ok(Self {
            smoothing,
            combiner,
            weights,
        })
    }

    /// Heat-map with the default number of bins
    pub fn heatmap_default(&self, snapshot: &AggregateSnapshot) -> Vec<f64> {
        self.heatmap(snapshot, DEFAULT_HEATMAP_SIZE)
    }

    /// Heat-map with `size` bins spanning the estimated duration
    pub fn heatmap(&self, snapshot: &AggregateSnapshot, size: usize) -> Vec<f64> {
        let duration = snapshot.duration_estimate();

        let range = TimeRange::new(0, duration);
        let likes = SmoothingFunction::build(
            snapshot.liked_points(),
            self.smoothing.kernel,
            self.smoothing.bandwidth_for_step(projection_step(range, size)),
        );
        let mut smoothed_likes = project_onto_array(|x| likes.apply(x), range, size);
        let mut scaled_playback = resample(&snapshot.playback_histogram(), size);
        let mut scaled_content = resample(&self.combiner.combine(snapshot), size);

        normalize_in_place(&mut smoothed_likes);
        normalize_in_place(&mut scaled_playback);
        normalize_in_place(&mut scaled_content);

        let evidence = [
            (smoothed_likes, self.weights.likes),
            (scaled_playback, self.weights.playback),
            (scaled_content, self.weights.content),
        ];

        let mut heatmap = vec![0.0; size];
        let mut scale = 0.0_f64;
        for (i, bin) in heatmap.iter_mut().enumerate() {
            for (signal, weight) in &evidence {
                *bin += (signal[i] * weight).max(0.0);
                scale = scale.max(*bin);
            }
        }
        if scale != 0.0 {
            for bin in heatmap.iter_mut() {
                *bin /= scale;
            }
        }

        debug!(size, duration, scale, "composed heat-map");
        heatmap
    }
}

/// Heat-map with default smoothing and equal weights
pub fn heatmap(snapshot: &AggregateSnapshot, size: usize) -> Vec<f64> {
    HeatmapCompositor::default().heatmap(snapshot, size)
}
