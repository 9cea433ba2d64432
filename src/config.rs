//! Analysis configuration
//!
//! Defaults: a 425-bin heat-map, a peak hysteresis of 0.1, Gaussian smoothing
//! with a one-second bandwidth (widened to the bin spacing of coarse
//! heat-maps), the "deeplinks" series left out of duration estimation, a
//! three-day duration limit, and equal weights for all evidence.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::aggregate::DEFAULT_MAX_DURATION;
use crate::error::ComputeError;
use crate::heatmap::{EvidenceWeights, DEFAULT_HEATMAP_SIZE};
use crate::keyframes::DEFAULT_PEAK_DELTA;
use crate::smoothing::{Kernel, SmoothingFunction, DEFAULT_BANDWIDTH};
use crate::types::DEEPLINKS_SERIES;

/// Top-level configuration for a LikeLines computation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of bins in a heat-map when no size is requested
    pub heatmap_size: usize,

    /// Hysteresis threshold used when extracting keyframes
    pub peak_delta: f64,

    /// Kernel smoothing of sparse timestamps
    pub smoothing: SmoothingConfig,

    /// POINT series ignored when estimating the video's duration
    pub duration_excluded_series: Vec<String>,

    /// Largest accepted duration estimate in seconds; longer records are
    /// rejected as malformed
    pub max_duration: usize,

    /// Per-signal weights in the heat-map
    pub weights: EvidenceWeights,

    /// Logging configuration (used by the CLI)
    pub logging: LoggingConfig,
}

/// Kernel smoothing parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub kernel: Kernel,
    /// Kernel width in seconds
    pub bandwidth: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "likelines=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            heatmap_size: DEFAULT_HEATMAP_SIZE,
            peak_delta: DEFAULT_PEAK_DELTA,
            smoothing: SmoothingConfig::default(),
            duration_excluded_series: vec![DEEPLINKS_SERIES.to_string()],
            max_duration: DEFAULT_MAX_DURATION,
            weights: EvidenceWeights::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            kernel: Kernel::Gaussian,
            bandwidth: DEFAULT_BANDWIDTH,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl SmoothingConfig {
    /// Build a smoothing function over `points` with these parameters
    pub fn smoother(&self, points: &[f64]) -> Result<SmoothingFunction, ComputeError> {
        SmoothingFunction::with_kernel(points, self.kernel, self.bandwidth)
    }

    /// Bandwidth used when the density is sampled every `step` seconds.
    ///
    /// Never narrower than the sampling step, so an instant between two bins
    /// still reaches both of them.
    pub fn bandwidth_for_step(&self, step: f64) -> f64 {
        self.bandwidth.max(step)
    }
}

impl AnalysisConfig {
    /// Parse a (possibly partial) configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ComputeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Reject parameters the algorithms cannot run with
    pub fn validate(&self) -> Result<(), ComputeError> {
        if !self.peak_delta.is_finite() || self.peak_delta <= 0.0 {
            return Err(ComputeError::InvalidArgument(format!(
                "peak_delta must be positive, got {}",
                self.peak_delta
            )));
        }
        if !self.smoothing.bandwidth.is_finite() || self.smoothing.bandwidth <= 0.0 {
            return Err(ComputeError::InvalidArgument(format!(
                "smoothing bandwidth must be positive, got {}",
                self.smoothing.bandwidth
            )));
        }
        if self.max_duration == 0 {
            return Err(ComputeError::InvalidArgument(
                "max_duration must be at least one second".to_string(),
            ));
        }
        self.weights.validate()
    }
}
