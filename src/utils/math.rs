use crate::*;
use num_traits::Float;

pub const INTENSITY_MAX: f64 = 255.0;

/// Min-max stretch of `values` onto [0, 255]. A constant vector maps to all zeros.
pub fn normalize(values: ArrayView1<f64>) -> Array1<f64> {
    let (min, max) = min_max(values);
    let range = max - min;
    if !(range > 0f64) {
        return Array1::zeros(values.len());
    }
    values.map(|&v| (v - min) * (INTENSITY_MAX / range))
}

pub fn min_max<T: Float>(values: ArrayView1<T>) -> (T, T) {
    values
        .iter()
        .fold((T::infinity(), T::neg_infinity()), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Powers of two from `start` up to and including `limit`.
pub fn powers_of_two(start: usize, limit: usize) -> Vec<usize> {
    let mut result = Vec::new();
    let mut current = start.max(1);
    while current <= limit {
        result.push(current);
        current *= 2;
    }
    result
}
