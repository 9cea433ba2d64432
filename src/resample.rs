//! Fixed-size linear resampling
//!
//! Stretches or shrinks an arbitrary-length sequence onto a fixed number of
//! samples by linear interpolation. The last output sample is always pinned to
//! the last input value so rounding never drifts the endpoint.

/// Resample `data` to exactly `new_size` points.
///
/// - Empty input or `new_size == 0` yields `new_size` zeros.
/// - One or two input values yield a straight line from first to last.
/// - Longer inputs are linearly interpolated at `j * (n - 1) / (new_size - 1)`.
/// - `new_size == 1` yields the last input value.
pub fn resample(data: &[f64], new_size: usize) -> Vec<f64> {
    let n = data.len();
    if n == 0 || new_size == 0 {
        return vec![0.0; new_size];
    }

    let last = data[n - 1];
    if new_size == 1 {
        return vec![last];
    }
    if n <= 2 {
        return linspace(data[0], last, new_size);
    }

    let step = (n - 1) as f64 / (new_size - 1) as f64;
    let mut out = Vec::with_capacity(new_size);
    for j in 0..new_size - 1 {
        let x = j as f64 * step;
        // x < n - 1 for every j < new_size - 1, so i + 1 stays in bounds
        let i = (x.floor() as usize).min(n - 2);
        out.push(data[i] + (x - i as f64) * (data[i + 1] - data[i]));
    }
    out.push(last);
    out
}

/// `count` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![end],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut out: Vec<f64> = (0..count - 1).map(|i| start + i as f64 * step).collect();
            out.push(end);
            out
        }
    }
}
