use ndarray_linalg::{Eig, Inverse, ReciprocalConditionNum};

use crate::decomposition::Error;
use crate::*;

/// Eigen-decomposition of a general real matrix, keeping only real parts.
///
/// Eigenvalues come back in descending order with their eigenvectors as matching
/// columns. Equal eigenvalues keep LAPACK's order. Imaginary parts larger than
/// `imaginary_tolerance` (relative to the largest real eigenvalue magnitude) are
/// reported with a warning before being dropped.
pub fn real_eig_sorted(
    matrix: ArrayView2<f64>,
    imaginary_tolerance: f64,
) -> Result<(Array1<f64>, Array2<f64>), Error> {
    let (values, vectors) = matrix.eig()?;
    let scale = values.iter().fold(0f64, |acc, v| acc.max(v.re.abs())).max(1.0);
    let value_im = values.iter().fold(0f64, |acc, v| acc.max(v.im.abs()));
    let vector_im = vectors.iter().fold(0f64, |acc, v| acc.max(v.im.abs()));
    if value_im > imaginary_tolerance * scale || vector_im > imaginary_tolerance {
        log::warn!(
            "discarding imaginary parts up to {value_im:e} (eigenvalues) and {vector_im:e} \
             (eigenvectors) of a {}x{} decomposition",
            matrix.nrows(),
            matrix.ncols()
        );
    }

    let mut order = values
        .iter()
        .enumerate()
        .map(|(index, v)| {
            NotNan::new(v.re)
                .map(|re| (re, index))
                .map_err(|_| Error::NonFinite("eigenvalue"))
        })
        .collect::<Result<Vec<_>, Error>>()?;
    //sort_by is stable, so ties stay in their original order
    order.sort_by(|a, b| b.0.cmp(&a.0));

    let sorted_values = order.iter().map(|(re, _)| re.into_inner()).collect::<Array1<f64>>();
    let mut sorted_vectors = Array2::zeros((vectors.nrows(), order.len()));
    for (column, (_, index)) in order.iter().enumerate() {
        sorted_vectors
            .column_mut(column)
            .assign(&vectors.column(*index).map(|v| v.re));
    }
    Ok((sorted_values, sorted_vectors))
}

/// Inverse of `matrix`, refused when its reciprocal condition number is below
/// `rcond_tolerance`.
pub fn checked_inverse(matrix: ArrayView2<f64>, rcond_tolerance: f64) -> Result<Array2<f64>, Error> {
    let dim = matrix.nrows();
    let rcond = matrix.rcond().unwrap_or(0f64);
    if !(rcond >= rcond_tolerance) {
        return Err(Error::SingularScatter { dim, rcond });
    }
    let inverse = matrix
        .inv()
        .map_err(|_| Error::SingularScatter { dim, rcond })?;
    if inverse.iter().any(|v| !v.is_finite()) {
        return Err(Error::SingularScatter { dim, rcond });
    }
    Ok(inverse)
}

pub fn outer(left: ArrayView1<f64>, right: ArrayView1<f64>) -> Array2<f64> {
    let column = left.insert_axis(Axis(1));
    let row = right.insert_axis(Axis(0));
    column.dot(&row)
}
