use crate::dataset::Dataset;
use crate::utils::linalg::real_eig_sorted;
use crate::*;

use super::{Basis, Error};

/// Covariance entries below this are treated as zero.
const DEGENERATE_EPS: f64 = 1e-12;

/// Training images minus the mean face, one row per training id (in training order).
pub fn training_matrix(dataset: &Dataset, mean: ArrayView1<f64>) -> Result<Array2<f64>, Error> {
    let training = dataset.training_ids();
    if training.is_empty() {
        return Err(Error::EmptyTrainingSet);
    }
    let mut a = Array2::zeros((training.len(), dataset.pixel_count()));
    for (mut row, &id) in zip(a.rows_mut(), training) {
        row.assign(&(&dataset.vector(id) - &mean));
    }
    Ok(a)
}

/// Eigenfaces of the centered training matrix `a` (training_count x pixels).
///
/// Uses the small covariance `a * a^T / pixels` so the eigenproblem is
/// training_count x training_count; its eigenvectors are mapped back to pixel space
/// through `a^T`. The resulting basis has one column per training image.
pub fn eigenfaces(a: ArrayView2<f64>, imaginary_tolerance: f64) -> Result<Basis, Error> {
    let pixels = a.ncols() as f64;
    let covariance = a.dot(&a.t()) / pixels;
    if covariance.iter().all(|c| c.abs() < DEGENERATE_EPS) {
        return Err(Error::DegenerateCovariance);
    }
    log::debug!(
        "decomposing {}x{} covariance",
        covariance.nrows(),
        covariance.ncols()
    );
    let (eigenvalues, eigenvectors) = real_eig_sorted(covariance.view(), imaginary_tolerance)?;
    let faces = a.t().dot(&eigenvectors);
    Basis::new(faces, eigenvalues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeanScope;
    use crate::dataset::Partition;
    use crate::decomposition::statistics::mean_face;
    use image::Luma;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_dataset(n: usize, seed: u64) -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut dataset = Dataset::new(None);
        for i in 0..n {
            let raw = (0..16).map(|_| rng.gen_range(0..=255u8)).collect::<Vec<u8>>();
            let gray = GrayImage::from_raw(4, 4, raw).unwrap();
            dataset
                .push_gray(gray, (i % 3) as i32, Partition::Training)
                .unwrap();
        }
        dataset
    }

    #[test]
    fn training_rows_follow_training_ids() {
        let mut dataset = Dataset::new(None);
        dataset
            .push_gray(GrayImage::from_pixel(1, 1, Luma([50])), 1, Partition::Test)
            .unwrap();
        dataset
            .push_gray(GrayImage::from_pixel(1, 1, Luma([10])), 1, Partition::Training)
            .unwrap();
        let mean = ndarray::array![4.0];
        let a = training_matrix(&dataset, mean.view()).unwrap();
        assert_eq!(a, ndarray::array![[6.0]]);
    }

    #[test]
    fn eigenvalues_descend_and_width_is_bounded() {
        let dataset = random_dataset(7, 11);
        let mean = mean_face(&dataset, MeanScope::AllEntries).unwrap();
        let a = training_matrix(&dataset, mean.view()).unwrap();
        let basis = eigenfaces(a.view(), 1e-6).unwrap();
        assert!(basis.width() <= dataset.training_size());
        assert_eq!(basis.pixel_count(), 16);
        let values = basis.eigenvalues();
        for pair in values.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        assert!(values[0] > 0.0);
    }

    #[test]
    fn eigenfaces_are_orthogonal() {
        let dataset = random_dataset(5, 3);
        let mean = mean_face(&dataset, MeanScope::AllEntries).unwrap();
        let a = training_matrix(&dataset, mean.view()).unwrap();
        let basis = eigenfaces(a.view(), 1e-6).unwrap();
        let gram = basis.vectors().t().dot(&basis.vectors());
        let scale = gram[(0, 0)];
        for i in 0..gram.nrows() {
            for j in 0..gram.ncols() {
                if i != j {
                    assert!(gram[(i, j)].abs() < 1e-6 * scale);
                }
            }
        }
    }

    #[test]
    fn identical_images_are_degenerate() {
        let mut dataset = Dataset::new(None);
        for _ in 0..3 {
            dataset
                .push_gray(GrayImage::from_pixel(2, 2, Luma([77])), 1, Partition::Training)
                .unwrap();
        }
        let mean = mean_face(&dataset, MeanScope::AllEntries).unwrap();
        let a = training_matrix(&dataset, mean.view()).unwrap();
        assert!(matches!(
            eigenfaces(a.view(), 1e-6),
            Err(Error::DegenerateCovariance)
        ));
    }

    #[test]
    fn decomposition_is_deterministic() {
        let dataset = random_dataset(6, 5);
        let mean = mean_face(&dataset, MeanScope::AllEntries).unwrap();
        let a = training_matrix(&dataset, mean.view()).unwrap();
        let first = eigenfaces(a.view(), 1e-6).unwrap();
        let second = eigenfaces(a.view(), 1e-6).unwrap();
        assert_eq!(first.vectors(), second.vectors());
    }
}
