//! Kernel smoothing of sparse timestamps
//!
//! Turns a set of instants (likes, deep links, detected events) into a
//! continuous "interest density" by summing a symmetric, non-negative,
//! distance-decaying kernel centred on every instant, and projects such a
//! function onto a fixed-size array.

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;

/// Default kernel bandwidth in seconds
pub const DEFAULT_BANDWIDTH: f64 = 1.0;

/// Gaussian tails beyond this many bandwidths are treated as zero
const GAUSSIAN_SUPPORT: f64 = 8.0;

/// Smoothing kernel shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    /// exp(-u^2 / 2) / sqrt(2 pi)
    #[default]
    Gaussian,
    /// max(0, 1 - |u|)
    Triangular,
    /// 0.75 * max(0, 1 - u^2)
    Epanechnikov,
}

impl Kernel {
    /// Kernel weight at standardized distance `u`
    pub fn weight(&self, u: f64) -> f64 {
        match self {
            Kernel::Gaussian => {
                if u.abs() > GAUSSIAN_SUPPORT {
                    0.0
                } else {
                    (-0.5 * u * u).exp() / (2.0 * std::f64::consts::PI).sqrt()
                }
            }
            Kernel::Triangular => (1.0 - u.abs()).max(0.0),
            Kernel::Epanechnikov => 0.75 * (1.0 - u * u).max(0.0),
        }
    }

    /// Standardized distance beyond which the weight is zero
    fn support(&self) -> f64 {
        match self {
            Kernel::Gaussian => GAUSSIAN_SUPPORT,
            Kernel::Triangular | Kernel::Epanechnikov => 1.0,
        }
    }
}

/// Continuous density estimate over a set of timestamps
#[derive(Debug, Clone)]
pub struct SmoothingFunction {
    /// Sorted input instants
    points: Vec<f64>,
    kernel: Kernel,
    bandwidth: f64,
}

impl SmoothingFunction {
    /// Gaussian smoothing with the default bandwidth
    pub fn new(points: &[f64]) -> Self {
        Self::build(points, Kernel::default(), DEFAULT_BANDWIDTH)
    }

    /// Smoothing with an explicit kernel and bandwidth (seconds, must be > 0)
    pub fn with_kernel(points: &[f64], kernel: Kernel, bandwidth: f64) -> Result<Self, ComputeError> {
        if !bandwidth.is_finite() || bandwidth <= 0.0 {
            return Err(ComputeError::InvalidArgument(format!(
                "smoothing bandwidth must be positive, got {bandwidth}"
            )));
        }
        Ok(Self::build(points, kernel, bandwidth))
    }

    pub(crate) fn build(points: &[f64], kernel: Kernel, bandwidth: f64) -> Self {
        let mut points: Vec<f64> = points.iter().copied().filter(|p| p.is_finite()).collect();
        points.sort_by(f64::total_cmp);
        Self {
            points,
            kernel,
            bandwidth,
        }
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Density at `x`; always >= 0 and 0 when there are no points
    pub fn apply(&self, x: f64) -> f64 {
        let reach = self.kernel.support() * self.bandwidth;
        let lo = self.points.partition_point(|&p| p < x - reach);
        let hi = self.points.partition_point(|&p| p <= x + reach);

        let sum: f64 = self.points[lo..hi]
            .iter()
            .map(|&p| self.kernel.weight((x - p) / self.bandwidth))
            .sum();
        sum / self.bandwidth
    }
}

/// Integer range of the function's domain (`end` exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub begin: usize,
    pub end: usize,
}

impl TimeRange {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }
}

/// Distance in seconds between neighbouring bins of [`project_onto_array`];
/// 0 when fewer than two bins are requested
pub fn projection_step(range: TimeRange, size: usize) -> f64 {
    if size < 2 {
        return 0.0;
    }
    (range.end as f64 - 1.0 - range.begin as f64) / (size - 1) as f64
}

/// Sample `f` onto `size` bins spread over `range`.
///
/// Bin `j < size - 1` samples `f(j * step)` with
/// `step = (range.end - 1 - range.begin) / (size - 1)`. The last bin samples
/// `f(size - 1)`, not `f(range.end - 1)`; the two agree only when
/// `size == range.end`, which is how keyframe extraction calls it.
pub fn project_onto_array<F>(f: F, range: TimeRange, size: usize) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    if size == 0 {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(size);
    if size > 1 {
        let step = projection_step(range, size);
        out.extend((0..size - 1).map(|j| f(j as f64 * step)));
    }
    out.push(f((size - 1) as f64));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_points_are_zero() {
        let f = SmoothingFunction::new(&[]);
        assert_eq!(f.apply(0.0), 0.0);
        assert_eq!(f.apply(100.0), 0.0);
    }

    #[test]
    fn test_density_peaks_at_clusters() {
        let f = SmoothingFunction::new(&[10.0, 10.0, 10.0, 50.0]);
        assert!(f.apply(10.0) > f.apply(50.0));
        assert!(f.apply(10.0) > f.apply(11.0));
        assert!(f.apply(11.0) > f.apply(13.0));
        assert!(f.apply(30.0) >= 0.0);
    }

    #[test]
    fn test_kernels_are_symmetric() {
        for kernel in [Kernel::Gaussian, Kernel::Triangular, Kernel::Epanechnikov] {
            let f = SmoothingFunction::with_kernel(&[20.0], kernel, 2.0).unwrap();
            assert!((f.apply(19.0) - f.apply(21.0)).abs() < 1e-12);
            assert!(f.apply(20.0) > f.apply(21.0));
        }
    }

    #[test]
    fn test_compact_kernels_vanish_outside_bandwidth() {
        let f = SmoothingFunction::with_kernel(&[20.0], Kernel::Triangular, 2.0).unwrap();
        assert_eq!(f.apply(22.0), 0.0);
        assert!((f.apply(21.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_positive_bandwidth() {
        assert!(SmoothingFunction::with_kernel(&[1.0], Kernel::Gaussian, 0.0).is_err());
        assert!(SmoothingFunction::with_kernel(&[1.0], Kernel::Gaussian, f64::NAN).is_err());
    }

    #[test]
    fn test_projection_steps_over_range() {
        // step = (10 - 1 - 0) / (4 - 1) = 3
        let out = project_onto_array(|x| x, TimeRange::new(0, 10), 4);
        assert_eq!(out, vec![0.0, 3.0, 6.0, 3.0]);
    }

    #[test]
    fn test_projection_step() {
        assert_eq!(projection_step(TimeRange::new(0, 10), 4), 3.0);
        assert_eq!(projection_step(TimeRange::new(0, 120), 120), 1.0);
        assert_eq!(projection_step(TimeRange::new(0, 120), 1), 0.0);
        assert!((projection_step(TimeRange::new(0, 3600), 425) - 3599.0 / 424.0).abs() < 1e-12);
    }

    #[test]
    fn test_projection_unit_step() {
        let out = project_onto_array(|x| x * 2.0, TimeRange::new(0, 5), 5);
        assert_eq!(out, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_projection_degenerate_sizes() {
        assert!(project_onto_array(|x| x, TimeRange::new(0, 10), 0).is_empty());
        assert_eq!(project_onto_array(|x| x + 1.0, TimeRange::new(0, 10), 1), vec![1.0]);
    }
}
