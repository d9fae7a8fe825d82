use image::imageops;

use super::*;
use crate::dataset::vectorizer::{hconcat, to_gray_image};
use crate::utils::math::normalize;
use crate::utils::metrics::mean_abs_error;

/// Component counts shown by [`FaceRecognizer::reconstruction_report`], followed by
/// `eigenface_no` itself.
pub const DEFAULT_RECONSTRUCTION_STEPS: [usize; 3] = [5, 10, 20];
pub const BASIS_TILES_PER_ROW: usize = 15;

/// An image next to its reconstruction from `components` basis vectors.
#[derive(Clone, Debug)]
pub struct ReconstructionFrame {
    pub components: usize,
    pub original: GrayImage,
    pub reconstructed: GrayImage,
    /// Pixelwise absolute difference.
    pub error: GrayImage,
}

impl ReconstructionFrame {
    /// Original, reconstruction and error side by side.
    pub fn strip(&self) -> Option<GrayImage> {
        hconcat(&[
            self.original.clone(),
            self.reconstructed.clone(),
            self.error.clone(),
        ])
    }
}

impl FaceRecognizer {
    /// Approximates entry `id` from its first `n` weights (at most `eigenface_no`).
    ///
    /// The weighted sum of basis columns is stretched to [0, 255], the mean face is
    /// added back and the result stretched to [0, 255] again.
    pub fn reconstruct(&self, id: usize, n: usize) -> Result<Array1<f64>, Error> {
        let weights = self.weights(id)?;
        let model = self.model()?;
        let basis = self.active(model)?;
        let n = n.min(self.config.eigenface_no).min(weights.len());
        let face = basis.leading(n).dot(&weights.slice(s![..n]));
        let with_mean = &model.mean + &normalize(face.view());
        Ok(normalize(with_mean.view()))
    }

    pub fn reconstruct_image(&self, id: usize, n: usize) -> Result<GrayImage, Error> {
        let vector = self.reconstruct(id, n)?;
        self.to_image(vector.view())
    }

    /// Mean absolute pixel difference between entry `id` and its reconstruction.
    pub fn reconstruction_error(&self, id: usize, n: usize) -> Result<f64, Error> {
        let reconstructed = self.reconstruct(id, n)?;
        Ok(mean_abs_error(
            self.dataset.vector(id),
            reconstructed.view(),
        ))
    }

    /// [`DEFAULT_RECONSTRUCTION_STEPS`] plus `eigenface_no`.
    pub fn reconstruction_steps(&self) -> Vec<usize> {
        let mut steps = DEFAULT_RECONSTRUCTION_STEPS.to_vec();
        steps.push(self.config.eigenface_no);
        steps
    }

    pub fn reconstruction_report(
        &self,
        id: usize,
        steps: &[usize],
    ) -> Result<Vec<ReconstructionFrame>, Error> {
        steps
            .iter()
            .map(|&components| {
                let original = self.dataset.image(id).clone();
                let reconstructed = self.reconstruct_image(id, components)?;
                let mut error = original.clone();
                for (out, other) in zip(error.pixels_mut(), reconstructed.pixels()) {
                    out.0[0] = out.0[0].abs_diff(other.0[0]);
                }
                Ok(ReconstructionFrame {
                    components,
                    original,
                    reconstructed,
                    error,
                })
            })
            .collect()
    }

    /// The first `amount` active basis vectors, each stretched to [0, 255], tiled
    /// `per_row` to a row. Unused tiles in the last row stay black.
    pub fn basis_mosaic(&self, amount: usize, per_row: usize) -> Result<GrayImage, Error> {
        let basis = self.active_basis()?;
        let amount = amount.min(basis.width());
        let (width, height) = self.dataset.image_size().ok_or(Error::NotTrained)?;
        if amount == 0 || per_row == 0 {
            return Ok(GrayImage::new(0, 0));
        }
        let cols = per_row.min(amount);
        let rows = (amount + cols - 1) / cols;
        let mut mosaic = GrayImage::new(width * cols as u32, height * rows as u32);
        for index in 0..amount {
            let tile = self.to_image(normalize(basis.column(index)).view())?;
            let x = (index % cols) as u32 * width;
            let y = (index / cols) as u32 * height;
            imageops::replace(&mut mosaic, &tile, x as i64, y as i64);
        }
        Ok(mosaic)
    }

    fn to_image(&self, vector: ArrayView1<f64>) -> Result<GrayImage, Error> {
        let (width, height) = self.dataset.image_size().ok_or(Error::NotTrained)?;
        to_gray_image(vector, width, height).ok_or(Error::ImageShape {
            len: vector.len(),
            width,
            height,
        })
    }
}
