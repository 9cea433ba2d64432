//! Signal normalization
//!
//! Scales a sequence into [-1, 1] by its largest absolute value. Signs and
//! zero-crossings are preserved; an all-zero sequence is left untouched.

/// Largest absolute value in `values` (0 for an empty slice)
pub fn scale_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        });
    max.abs().max(min.abs())
}

/// Normalize a caller-owned buffer in place into [-1, 1]
pub fn normalize_in_place(values: &mut [f64]) {
    let scale = scale_of(values);
    if scale != 0.0 {
        for v in values.iter_mut() {
            *v /= scale;
        }
    }
}

/// Return a copy of `values` normalized into [-1, 1]
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    normalize_in_place(&mut out);
    out
}
