mod evaluate;
mod reconstruct;


pub use evaluate::{AccuracyCell, AccuracyGrid, DEFAULT_K_SWEEP};
pub use reconstruct::{ReconstructionFrame, BASIS_TILES_PER_ROW, DEFAULT_RECONSTRUCTION_STEPS};

use image::DynamicImage;
use ndarray::{ArrayViewMut1, Zip};

use crate::config::EngineConfig;
use crate::dataset::{self, Dataset, Partition};
use crate::decomposition::lda::{self, LdaTolerances};
use crate::decomposition::{self, pca, statistics, Basis, Method};
use crate::knn::{self, ComponentRange, WeightKnn};
use crate::*;

pub use crate::knn::Neighbour;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no basis has been trained yet")]
    NotTrained,
    #[error("entry {0} does not exist")]
    UnknownEntry(usize),
    #[error("entry {0} has no weights yet, project it or retrain")]
    NotProjected(usize),
    #[error("nothing to evaluate")]
    EmptyEvaluation,
    #[error("eigenface_no must keep at least one component")]
    NoComponents,
    #[error("vector of {len} values does not fit a {width}x{height} image")]
    ImageShape { len: usize, width: u32, height: u32 },
    #[error(transparent)]
    Decomposition(#[from] decomposition::Error),
    #[error(transparent)]
    Knn(#[from] knn::Error),
    #[error(transparent)]
    Dataset(#[from] dataset::Error),
}

impl Error {
    /// Failures of the numerical pipeline, as opposed to misuse of the API.
    pub fn is_numerical(&self) -> bool {
        use decomposition::Error as D;
        match self {
            Error::Decomposition(err) => matches!(
                err,
                D::DegenerateCovariance | D::SingularScatter { .. } | D::NonFinite(_) | D::Linalg(_)
            ),
            Error::Knn(knn::Error::NanDistance(..)) => true,
            _ => false,
        }
    }
}

/// State derived from the training partition, rebuilt by every retrain.
#[derive(Clone, Debug)]
struct Model {
    mean: Array1<f64>,
    class_means: Vec<Option<Array1<f64>>>,
    training_matrix: Array2<f64>,
    eigenfaces: Basis,
    fisherfaces: Option<Basis>,
    weights: Array2<f64>,
}

/// Eigenface / Fisherface recognizer over a [`Dataset`].
///
/// Training is explicit: [`FaceRecognizer::retrain`] rebuilds the mean face, the bases
/// and every weight vector. Adding a training image drops the trained state until the
/// next retrain; a test image can be projected on its own with
/// [`FaceRecognizer::project_only`].
pub struct FaceRecognizer {
    config: EngineConfig,
    dataset: Dataset,
    model: Option<Model>,
}

impl FaceRecognizer {
    pub fn new(dataset: Dataset, config: EngineConfig) -> Self {
        Self {
            config,
            dataset,
            model: None,
        }
    }

    /// Loads the training and test folders under `dir` and trains on them.
    pub fn from_directory(dir: &Path, config: EngineConfig) -> Result<Self, Error> {
        let dataset = Dataset::from_directory(dir, &config);
        let mut recognizer = Self::new(dataset, config);
        recognizer.retrain()?;
        Ok(recognizer)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn method(&self) -> Method {
        self.config.method
    }

    pub fn component_range(&self) -> ComponentRange {
        self.config.component_range
    }

    pub fn set_component_range(&mut self, range: ComponentRange) {
        self.config.component_range = range;
    }

    pub fn set_k_neighbours(&mut self, k: usize) {
        self.config.k_neighbours = k;
    }

    /// Recomputes mean, class means, eigenfaces, fisherfaces when LDA is active, and
    /// the weights of every entry.
    pub fn retrain(&mut self) -> Result<(), Error> {
        self.model = None;
        if self.config.eigenface_no == 0 {
            return Err(Error::NoComponents);
        }
        let mean = statistics::mean_face(&self.dataset, self.config.mean_scope)?;
        let class_means = statistics::class_means(&self.dataset);
        let training_matrix = pca::training_matrix(&self.dataset, mean.view())?;
        let eigenfaces = pca::eigenfaces(training_matrix.view(), self.config.imaginary_tolerance)?;
        let mut model = Model {
            mean,
            class_means,
            training_matrix,
            eigenfaces,
            fisherfaces: None,
            weights: Array2::zeros((0, 0)),
        };
        if self.config.method == Method::Lda {
            model.fisherfaces = Some(self.compute_fisherfaces(&model)?);
        }
        model.weights = self.compute_weights(&model)?;
        log::info!(
            "trained {:?} on {} images ({} classes), {} weight components",
            self.config.method,
            self.dataset.training_size(),
            self.dataset.unique_classes(),
            model.weights.ncols()
        );
        self.model = Some(model);
        Ok(())
    }

    /// Same as [`FaceRecognizer::retrain`].
    pub fn train(&mut self) -> Result<(), Error> {
        self.retrain()
    }

    /// Switches the active basis and recomputes all weights. On failure the previous
    /// method stays active.
    pub fn set_method(&mut self, method: Method) -> Result<(), Error> {
        let previous = self.config.method;
        self.config.method = method;
        let Some(mut model) = self.model.take() else {
            return Ok(());
        };
        let result = self.switch_basis(&mut model);
        if result.is_err() {
            self.config.method = previous;
        }
        self.model = Some(model);
        result
    }

    fn switch_basis(&self, model: &mut Model) -> Result<(), Error> {
        if self.config.method == Method::Lda && model.fisherfaces.is_none() {
            model.fisherfaces = Some(self.compute_fisherfaces(model)?);
        }
        model.weights = self.compute_weights(model)?;
        Ok(())
    }

    fn compute_fisherfaces(&self, model: &Model) -> Result<Basis, Error> {
        let tolerances = LdaTolerances {
            imaginary: self.config.imaginary_tolerance,
            rcond: self.config.rcond_tolerance,
        };
        Ok(lda::fisherfaces(
            &self.dataset,
            model.training_matrix.view(),
            &model.eigenfaces,
            &tolerances,
        )?)
    }

    fn active<'m>(&self, model: &'m Model) -> Result<&'m Basis, Error> {
        match self.config.method {
            Method::Pca => Ok(&model.eigenfaces),
            Method::Lda => model.fisherfaces.as_ref().ok_or(Error::NotTrained),
        }
    }

    fn scale(&self) -> f64 {
        self.dataset.pixel_count() as f64 * self.config.weight_scale
    }

    fn compute_weights(&self, model: &Model) -> Result<Array2<f64>, Error> {
        let basis = self.active(model)?;
        let components = self.config.eigenface_no.min(basis.width());
        if components < self.config.eigenface_no {
            log::debug!(
                "basis has {} columns, keeping {components} of {} components",
                basis.width(),
                self.config.eigenface_no
            );
        }
        let leading = basis.leading(components);
        let mean = model.mean.view();
        let scale = self.scale();
        let mut weights = Array2::<f64>::zeros((self.dataset.len(), components));
        let project = |mut row: ArrayViewMut1<f64>, image: ArrayView1<f64>| {
            let centered = &image - &mean;
            row.assign(&(leading.t().dot(&centered) / scale));
        };
        let pixels = self.dataset.pixels();
        let lanes = Zip::from(weights.rows_mut()).and(pixels.rows());
        #[cfg(feature = "parallel")]
        lanes.par_for_each(project);
        #[cfg(not(feature = "parallel"))]
        lanes.for_each(project);
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(decomposition::Error::NonFinite("weight").into());
        }
        Ok(weights)
    }

    /// Computes the weights of `id` against the current basis without retraining.
    pub fn project_only(&mut self, id: usize) -> Result<(), Error> {
        if !self.dataset.contains(id) {
            return Err(Error::UnknownEntry(id));
        }
        let mut model = self.model.take().ok_or(Error::NotTrained)?;
        let result = self.project_into(&mut model, id);
        self.model = Some(model);
        result
    }

    fn project_into(&self, model: &mut Model, id: usize) -> Result<(), Error> {
        //entries appended since the last projection are filled in on the way
        let first = model.weights.nrows().min(id);
        let rows = {
            let basis = self.active(model)?;
            let leading = basis.leading(model.weights.ncols());
            (first..=id)
                .map(|entry| {
                    let centered = &self.dataset.vector(entry) - &model.mean;
                    leading.t().dot(&centered) / self.scale()
                })
                .collect::<Vec<Array1<f64>>>()
        };
        for (entry, row) in (first..=id).zip(rows) {
            if entry < model.weights.nrows() {
                model.weights.row_mut(entry).assign(&row);
            } else {
                model
                    .weights
                    .push_row(row.view())
                    .map_err(dataset::Error::from)?;
            }
        }
        log::debug!("projected entry {id}");
        Ok(())
    }

    /// Appends an image to the dataset and returns its id. Nothing is recomputed: a
    /// training image invalidates the trained state until [`FaceRecognizer::retrain`],
    /// a test image needs [`FaceRecognizer::project_only`] before it can be classified.
    pub fn add_entry(
        &mut self,
        image: &DynamicImage,
        label: i32,
        partition: Partition,
    ) -> Result<usize, Error> {
        let id = self.dataset.push(image, label, partition)?;
        if partition.is_training() && self.model.is_some() {
            log::info!("training image {id} added, trained state dropped until retrain");
            self.model = None;
        }
        Ok(id)
    }

    /// Appends an image and brings the model up to date: a full retrain for a training
    /// image, a single projection for a test image.
    pub fn add_face(
        &mut self,
        image: &DynamicImage,
        label: i32,
        partition: Partition,
    ) -> Result<usize, Error> {
        let id = self.add_entry(image, label, partition)?;
        match partition {
            Partition::Training => self.retrain()?,
            Partition::Test => self.project_only(id)?,
        }
        Ok(id)
    }

    /// Adds an unknown face to the test partition under a fresh label and projects it.
    pub fn add_custom_face(&mut self, image: &DynamicImage) -> Result<usize, Error> {
        let mut label = self.dataset.len() as i32 + 1;
        while self.dataset.class_of_label(label).is_some() {
            label += 1;
        }
        self.add_face(image, label, Partition::Test)
    }

    fn model(&self) -> Result<&Model, Error> {
        self.model.as_ref().ok_or(Error::NotTrained)
    }

    pub fn mean(&self) -> Result<ArrayView1<'_, f64>, Error> {
        Ok(self.model()?.mean.view())
    }

    /// Per-class mean of the training members, indexed by class id.
    pub fn class_means(&self) -> Result<&[Option<Array1<f64>>], Error> {
        Ok(&self.model()?.class_means)
    }

    pub fn eigenfaces(&self) -> Result<&Basis, Error> {
        Ok(&self.model()?.eigenfaces)
    }

    /// `None` until LDA has been made active at least once since the last retrain.
    pub fn fisherfaces(&self) -> Result<Option<&Basis>, Error> {
        Ok(self.model()?.fisherfaces.as_ref())
    }

    pub fn active_basis(&self) -> Result<&Basis, Error> {
        self.active(self.model()?)
    }

    /// Length of every weight vector.
    pub fn components(&self) -> Result<usize, Error> {
        Ok(self.model()?.weights.ncols())
    }

    pub fn weights(&self, id: usize) -> Result<ArrayView1<'_, f64>, Error> {
        let model = self.model()?;
        if !self.dataset.contains(id) {
            return Err(Error::UnknownEntry(id));
        }
        if id >= model.weights.nrows() {
            return Err(Error::NotProjected(id));
        }
        Ok(model.weights.row(id))
    }

    fn knn(&self, range: ComponentRange) -> Result<WeightKnn<'_>, Error> {
        let model = self.model()?;
        Ok(WeightKnn::new(
            model.weights.view(),
            self.dataset.labels(),
            self.dataset.training_ids(),
            range,
            self.config.eigenface_no,
        ))
    }

    fn check_projected(&self, id: usize) -> Result<(), Error> {
        self.weights(id).map(|_| ())
    }

    /// Distance between two entries over the configured component range.
    pub fn distance(&self, id1: usize, id2: usize) -> Result<f64, Error> {
        self.check_projected(id1)?;
        self.check_projected(id2)?;
        Ok(self.knn(self.config.component_range)?.distance(id1, id2))
    }

    /// Ids of the `k` nearest training entries, closest first.
    pub fn nearest(&self, id: usize, k: usize) -> Result<Vec<usize>, Error> {
        Ok(self.identify(id, k)?.into_iter().map(|n| n.id).collect())
    }

    /// The `k` nearest training entries with their labels and distances.
    pub fn identify(&self, id: usize, k: usize) -> Result<Vec<Neighbour>, Error> {
        self.check_projected(id)?;
        Ok(self.knn(self.config.component_range)?.nearest(id, k)?)
    }

    /// Majority label of the `k` nearest training entries.
    pub fn classify(&self, id: usize, k: usize) -> Result<i32, Error> {
        self.classify_with(id, k, self.config.component_range)
    }

    pub(crate) fn classify_with(
        &self,
        id: usize,
        k: usize,
        range: ComponentRange,
    ) -> Result<i32, Error> {
        self.check_projected(id)?;
        Ok(self.knn(range)?.classify(id, k)?)
    }
}
