//! Content-analysis curve combination
//!
//! Every MCA series is brought onto a common grid of
//! `max(duration_estimate, 425)` bins (POINT series by kernel smoothing, CURVE
//! series by resampling), normalized into [-1, 1], and accumulated with its
//! weight. The sum is left unnormalized for the compositor.

use tracing::debug;

use crate::aggregate::AggregateSnapshot;
use crate::config::SmoothingConfig;
use crate::error::ComputeError;
use crate::heatmap::DEFAULT_HEATMAP_SIZE;
use crate::normalizer::normalize_in_place;
use crate::resample::resample;
use crate::smoothing::{project_onto_array, projection_step, SmoothingFunction, TimeRange};
use crate::types::{ContentAnalysisSeries, SeriesKind};

/// Merges weighted content-analysis series into one curve
#[derive(Debug, Clone, Copy)]
pub struct CurveCombiner {
    smoothing: SmoothingConfig,
}

impl Default for CurveCombiner {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
        }
    }
}

impl CurveCombiner {
    /// Combiner smoothing POINT series with the given kernel settings
    pub fn new(smoothing: SmoothingConfig) -> Result<Self, ComputeError> {
        // Validates the bandwidth once so `combine` cannot fail
        smoothing.smoother(&[])?;
        Ok(Self { smoothing })
    }

    /// Length of the combined curve for a snapshot
    pub fn curve_size(snapshot: &AggregateSnapshot) -> usize {
        snapshot.duration_estimate().max(DEFAULT_HEATMAP_SIZE)
    }

    /// Weighted sum of the normalized per-series curves
    pub fn combine(&self, snapshot: &AggregateSnapshot) -> Vec<f64> {
        let size = Self::curve_size(snapshot);
        let mut combined = vec![0.0; size];

        for series in snapshot.content_series() {
            let curve = self.series_curve(series, snapshot.duration_estimate(), size);
            for (acc, value) in combined.iter_mut().zip(curve) {
                *acc += value * series.weight;
            }
        }

        debug!(
            size,
            series = snapshot.content_series().count(),
            "combined content-analysis curve"
        );
        combined
    }

    /// One series on the common grid, normalized into [-1, 1]
    fn series_curve(&self, series: &ContentAnalysisSeries, duration: usize, size: usize) -> Vec<f64> {
        let mut curve = match series.kind {
            SeriesKind::Point => {
                let range = TimeRange::new(0, duration);
                let f = SmoothingFunction::build(
                    &series.values,
                    self.smoothing.kernel,
                    self.smoothing.bandwidth_for_step(projection_step(range, size)),
                );
                project_onto_array(|x| f.apply(x), range, size)
            }
            SeriesKind::Curve => resample(&series.values, size),
        };
        normalize_in_place(&mut curve);
        curve
    }
}

/// Combined MCA curve with the default smoothing settings
pub fn combined_mca_curve(snapshot: &AggregateSnapshot) -> Vec<f64> {
    CurveCombiner::default().combine(snapshot)
}
