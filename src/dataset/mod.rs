pub mod label_file;
pub mod vectorizer;

#[cfg(test)]
mod dataset_tests;

use image::DynamicImage;
use indexmap::IndexSet;
use ndarray::ShapeError;

use crate::config::EngineConfig;
use crate::*;
use label_file::LabelRecord;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    Training,
    Test,
}

impl Partition {
    pub fn is_training(self) -> bool {
        self == Partition::Training
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("image has no pixels")]
    EmptyImage,
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Face images as flattened intensity vectors, together with their labels, partition and
/// class bookkeeping.
///
/// Ids are dense and assigned in insertion order; they never change once given out.
/// Class ids follow the order in which labels are first seen.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pixels: Array2<f64>,
    raw: Vec<GrayImage>,
    labels: Vec<i32>,
    partitions: Vec<Partition>,
    paths: Vec<Option<PathBuf>>,
    training_ids: Vec<usize>,
    test_ids: Vec<usize>,
    classes: IndexSet<i32>,
    class_ids: Vec<usize>,
    class_groups: Vec<Vec<usize>>,
    image_size: Option<(u32, u32)>,
}

impl Dataset {
    /// `image_size` is the canonical (width, height); `None` lets the first image decide.
    pub fn new(image_size: Option<(u32, u32)>) -> Self {
        Self {
            image_size,
            ..Default::default()
        }
    }

    /// Loads `<dir>/<training>/<labels>` and `<dir>/<test>/<labels>` using the folder
    /// names of `config`'s layout. Image files are resolved relative to their folder.
    pub fn from_directory(dir: &Path, config: &EngineConfig) -> Self {
        let layout = config.get_layout();
        let mut dataset = Dataset::new(config.image_size);
        for (folder, partition) in [
            (&layout.training_folder, Partition::Training),
            (&layout.test_folder, Partition::Test),
        ] {
            let folder = dir.join(folder);
            let added = dataset.load(&folder.join(&layout.label_file), partition, &folder);
            log::info!(
                "loaded {added} {partition:?} images from {}",
                folder.display()
            );
        }
        dataset
    }

    /// Appends every entry of a label file, reading images from `image_dir`. Returns how
    /// many entries were added; unreadable images are logged and skipped.
    pub fn load(&mut self, label_path: &Path, partition: Partition, image_dir: &Path) -> usize {
        let records = label_file::read_label_file(label_path);
        self.load_records(&records, partition, image_dir)
    }

    pub fn load_records(
        &mut self,
        records: &[LabelRecord],
        partition: Partition,
        image_dir: &Path,
    ) -> usize {
        let before = self.len();
        for record in records {
            let path = image_dir.join(&record.filename);
            let gray = match vectorizer::read_gray(&path) {
                Ok(gray) => gray,
                Err(err) => {
                    log::error!("skipping {}: {err}", path.display());
                    continue;
                }
            };
            if let Err(err) = self.insert(gray, record.label, partition, Some(path.clone())) {
                log::error!("skipping {}: {err}", path.display());
            }
        }
        self.len() - before
    }

    /// Converts `image` to grayscale, forces it to the canonical size and appends it.
    pub fn push(
        &mut self,
        image: &DynamicImage,
        label: i32,
        partition: Partition,
    ) -> Result<usize, Error> {
        let gray = vectorizer::to_canonical(image, self.image_size)?;
        self.insert(gray, label, partition, None)
    }

    pub fn push_gray(
        &mut self,
        gray: GrayImage,
        label: i32,
        partition: Partition,
    ) -> Result<usize, Error> {
        self.insert(gray, label, partition, None)
    }

    fn insert(
        &mut self,
        gray: GrayImage,
        label: i32,
        partition: Partition,
        path: Option<PathBuf>,
    ) -> Result<usize, Error> {
        let gray = vectorizer::fit(gray, self.image_size)?;
        let size = *self.image_size.get_or_insert(gray.dimensions());
        let vector = vectorizer::vectorize(&gray);
        let expected = (size.0 * size.1) as usize;
        debug_assert_eq!(vector.len(), expected);
        if self.raw.is_empty() {
            self.pixels = Array2::zeros((0, expected));
        }
        self.pixels.push_row(vector.view())?;

        let id = self.labels.len();
        let (class_id, _) = self.classes.insert_full(label);
        if class_id == self.class_groups.len() {
            self.class_groups.push(Vec::new());
        }
        self.class_groups[class_id].push(id);
        self.class_ids.push(class_id);
        self.raw.push(gray);
        self.labels.push(label);
        self.partitions.push(partition);
        self.paths.push(path);
        match partition {
            Partition::Training => self.training_ids.push(id),
            Partition::Test => self.test_ids.push(id),
        }
        log::debug!("added entry {id} with label {label} ({partition:?}, class {class_id})");
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Canonical (width, height), once known.
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    /// Number of pixels per image vector.
    pub fn pixel_count(&self) -> usize {
        self.pixels.ncols()
    }

    /// All image vectors, one row per id.
    pub fn pixels(&self) -> ArrayView2<'_, f64> {
        self.pixels.view()
    }

    pub fn vector(&self, id: usize) -> ArrayView1<'_, f64> {
        self.pixels.row(id)
    }

    pub fn image(&self, id: usize) -> &GrayImage {
        &self.raw[id]
    }

    pub fn label(&self, id: usize) -> i32 {
        self.labels[id]
    }

    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    pub fn partition(&self, id: usize) -> Partition {
        self.partitions[id]
    }

    pub fn path(&self, id: usize) -> Option<&Path> {
        self.paths[id].as_deref()
    }

    pub fn class_id(&self, id: usize) -> usize {
        self.class_ids[id]
    }

    pub fn class_of_label(&self, label: i32) -> Option<usize> {
        self.classes.get_index_of(&label)
    }

    /// Ids of every entry (training and test) sharing a class id, indexed by class id.
    pub fn class_groups(&self) -> &[Vec<usize>] {
        &self.class_groups
    }

    pub fn unique_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn training_ids(&self) -> &[usize] {
        &self.training_ids
    }

    pub fn test_ids(&self) -> &[usize] {
        &self.test_ids
    }

    pub fn training_size(&self) -> usize {
        self.training_ids.len()
    }

    pub fn test_size(&self) -> usize {
        self.test_ids.len()
    }

    pub fn contains(&self, id: usize) -> bool {
        id < self.len()
    }
}
