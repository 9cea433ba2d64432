//! Hysteresis peak detection
//!
//! Adapted from Eli Billauer's `peakdet`: a sample is a peak if it is the
//! running maximum and the signal later drops more than `delta` below it, and
//! symmetrically for valleys. The excursion still in progress when the input
//! ends is never emitted.

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;

/// A detected extremum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Position (x-coordinate, or 1-based sample index)
    pub x: f64,
    /// Value at the extremum
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Local minima and maxima in detection order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Peaks {
    pub valleys: Vec<Point>,
    pub peaks: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seeking {
    Max,
    Min,
}

impl Peaks {
    /// Extract peaks and valleys from `points`.
    ///
    /// `x` gives the position of every sample; when `None`, positions are the
    /// 1-based sample indices. `delta` must be a positive number.
    pub fn extract(points: &[f64], x: Option<&[f64]>, delta: f64) -> Result<Self, ComputeError> {
        if delta.is_nan() || delta <= 0.0 {
            return Err(ComputeError::InvalidArgument(format!(
                "peak delta must be positive, got {delta}"
            )));
        }
        if let Some(x) = x {
            if x.len() != points.len() {
                return Err(ComputeError::InvalidArgument(format!(
                    "got {} x-coordinates for {} points",
                    x.len(),
                    points.len()
                )));
            }
        }
        let position = |i: usize| x.map_or((i + 1) as f64, |x| x[i]);

        let mut result = Peaks::default();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut min_pos = f64::NAN;
        let mut max_pos = f64::NAN;
        let mut state = Seeking::Max;

        for (i, &current) in points.iter().enumerate() {
            if current > max {
                max = current;
                max_pos = position(i);
            }
            if current < min {
                min = current;
                min_pos = position(i);
            }

            match state {
                Seeking::Max if current < max - delta => {
                    result.peaks.push(Point::new(max_pos, max));
                    min = current;
                    min_pos = position(i);
                    state = Seeking::Min;
                }
                Seeking::Min if current > min + delta => {
                    result.valleys.push(Point::new(min_pos, min));
                    max = current;
                    max_pos = position(i);
                    state = Seeking::Max;
                }
                _ => {}
            }
        }

        Ok(result)
    }
}
