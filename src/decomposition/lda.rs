use indexmap::IndexSet;

use crate::dataset::Dataset;
use crate::utils::linalg::{checked_inverse, outer, real_eig_sorted};
use crate::*;

use super::{Basis, Error};

pub struct LdaTolerances {
    pub imaginary: f64,
    pub rcond: f64,
}

/// Fisherfaces computed on top of `eigenfaces`.
///
/// `a` is the centered training matrix the eigenfaces were built from (one row per
/// training id, in training order). The eigenface basis is cut to
/// `training_count - training_classes` columns so the within-class scatter stays
/// invertible, the training images are projected into that space, and the
/// discriminant directions of `Sw^-1 * Sb` are mapped back to pixel space.
pub fn fisherfaces(
    dataset: &Dataset,
    a: ArrayView2<f64>,
    eigenfaces: &Basis,
    tolerances: &LdaTolerances,
) -> Result<Basis, Error> {
    let training = dataset.training_ids();
    if training.is_empty() {
        return Err(Error::EmptyTrainingSet);
    }
    //class ids seen in training, compacted to 0..nclasses
    let mut training_classes = IndexSet::new();
    let column_class = training
        .iter()
        .map(|&id| training_classes.insert_full(dataset.class_id(id)).0)
        .collect::<Vec<usize>>();
    let nclasses = training_classes.len();
    let reduced = training.len() - nclasses;
    if reduced == 0 {
        return Err(Error::SingularScatter {
            dim: 0,
            rcond: 0f64,
        });
    }

    let w_pca = eigenfaces.leading(reduced);
    let pixels = a.ncols() as f64;
    let projected = w_pca.t().dot(&a.t()) / pixels;
    let dim = projected.nrows();
    log::debug!(
        "lda on {dim} dimensions, {} training images, {nclasses} classes",
        training.len()
    );

    let mean = projected
        .mean_axis(Axis(1))
        .ok_or(Error::EmptyTrainingSet)?;
    let mut class_means = Array2::<f64>::zeros((dim, nclasses));
    let mut class_sizes = vec![0usize; nclasses];
    for (column, &class) in projected.columns().into_iter().zip(column_class.iter()) {
        let mut target = class_means.column_mut(class);
        target += &column;
        class_sizes[class] += 1;
    }
    for (mut column, &size) in class_means.columns_mut().into_iter().zip(class_sizes.iter()) {
        column /= size as f64;
    }

    let mut between = Array2::<f64>::zeros((dim, dim));
    for (class, &size) in class_sizes.iter().enumerate() {
        let offset = &class_means.column(class) - &mean;
        between.scaled_add(size as f64, &outer(offset.view(), offset.view()));
    }
    between /= dim as f64;

    let mut within = Array2::<f64>::zeros((dim, dim));
    for (column, &class) in projected.columns().into_iter().zip(column_class.iter()) {
        let offset = &column - &class_means.column(class);
        within += &outer(offset.view(), offset.view());
    }
    within /= dim as f64;

    let within_inv = checked_inverse(within.view(), tolerances.rcond)?;
    let (eigenvalues, w_fld) =
        real_eig_sorted(within_inv.dot(&between).view(), tolerances.imaginary)?;
    Basis::new(w_pca.dot(&w_fld), eigenvalues)
}
