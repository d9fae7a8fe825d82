pub mod lda;
pub mod pca;
pub mod statistics;

use ndarray_linalg::error::LinalgError;

use crate::*;

/// Which basis drives weight computation.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// Eigenfaces.
    #[default]
    Pca,
    /// Fisherfaces, computed on the PCA-reduced space.
    Lda,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("the dataset has no images")]
    EmptyDataset,
    #[error("the training partition has no images")]
    EmptyTrainingSet,
    #[error("covariance of the training images is zero, all centered images vanish")]
    DegenerateCovariance,
    #[error("within-class scatter of dimension {dim} is singular (rcond {rcond:e})")]
    SingularScatter { dim: usize, rcond: f64 },
    #[error("non-finite {0} produced")]
    NonFinite(&'static str),
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

/// Basis vectors in pixel space, one per column, ordered by descending eigenvalue.
#[derive(Clone, Debug)]
pub struct Basis {
    pub(crate) vectors: Array2<f64>,
    pub(crate) eigenvalues: Array1<f64>,
}

impl Basis {
    pub(crate) fn new(vectors: Array2<f64>, eigenvalues: Array1<f64>) -> Result<Self, Error> {
        assert_eq!(vectors.ncols(), eigenvalues.len());
        if vectors.iter().any(|v| !v.is_finite()) {
            return Err(Error::NonFinite("basis vector"));
        }
        Ok(Self {
            vectors,
            eigenvalues,
        })
    }

    /// Number of basis vectors.
    pub fn width(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn pixel_count(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.vectors.column(index)
    }

    pub fn vectors(&self) -> ArrayView2<'_, f64> {
        self.vectors.view()
    }

    pub fn eigenvalues(&self) -> ArrayView1<'_, f64> {
        self.eigenvalues.view()
    }

    /// The leading `n` columns.
    pub fn leading(&self, n: usize) -> ArrayView2<'_, f64> {
        self.vectors.slice(s![.., ..n.min(self.width())])
    }
}
