use crate::*;

/// Fraction of positions where `predicted` equals `target`.
pub fn accuracy(target: &[i32], predicted: &[i32]) -> f64 {
    assert!(target.len() == predicted.len());
    if target.is_empty() {
        return 0f64;
    }
    let correct = zip(target.iter(), predicted.iter())
        .filter(|(x, y)| x == y)
        .count();
    correct as f64 / target.len() as f64
}

pub fn mean_abs_error(target: ArrayView1<f64>, predicted: ArrayView1<f64>) -> f64 {
    assert!(target.len() == predicted.len());
    let len = target.len() as f64;
    let mut total = 0f64;
    zip(target.iter(), predicted.iter()).for_each(|(x, y)| total += (x - y).abs());
    total / len
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn accuracy_counts_matches() {
        assert_eq!(accuracy(&[1, 2, 3, 4], &[1, 2, 0, 0]), 0.5);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn mae() {
        let a = array![0.0, 10.0, 5.0];
        let b = array![1.0, 8.0, 5.0];
        assert_eq!(mean_abs_error(a.view(), b.view()), 1.0);
    }
}
