use crate::decomposition::Method;
use crate::knn::ComponentRange;

/// Number of basis components kept for weight vectors when nothing else is set.
pub const DEFAULT_EIGENFACE_NO: usize = 64;
/// Projections are divided by `pixels * DEFAULT_WEIGHT_SCALE`.
pub const DEFAULT_WEIGHT_SCALE: f64 = 128.0;

/// Which images contribute to the global mean face.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub enum MeanScope {
    /// Training and test images together.
    #[default]
    AllEntries,
    TrainingOnly,
}

/// Folder and file names of an on-disk face set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetLayout {
    pub training_folder: String,
    pub test_folder: String,
    pub label_file: String,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            training_folder: "training".into(),
            test_folder: "test".into(),
            label_file: "classes.csv".into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub(crate) eigenface_no: usize,
    pub(crate) weight_scale: f64,
    pub(crate) k_neighbours: usize,
    pub(crate) method: Method,
    pub(crate) component_range: ComponentRange,
    pub(crate) mean_scope: MeanScope,
    pub(crate) imaginary_tolerance: f64,
    pub(crate) rcond_tolerance: f64,
    pub(crate) image_size: Option<(u32, u32)>,
    pub(crate) layout: DatasetLayout,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            eigenface_no: DEFAULT_EIGENFACE_NO,
            weight_scale: DEFAULT_WEIGHT_SCALE,
            k_neighbours: 1,
            method: Method::default(),
            component_range: ComponentRange::full(DEFAULT_EIGENFACE_NO),
            mean_scope: MeanScope::default(),
            imaginary_tolerance: 1e-6,
            rcond_tolerance: 1e-12,
            image_size: None,
            layout: DatasetLayout::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also resets the component range to cover every retained component.
    pub fn eigenface_no(self, eigenface_no: usize) -> Self {
        Self {
            eigenface_no,
            component_range: ComponentRange::full(eigenface_no),
            ..self
        }
    }

    pub fn weight_scale(self, weight_scale: f64) -> Self {
        Self {
            weight_scale,
            ..self
        }
    }

    pub fn k_neighbours(self, k_neighbours: usize) -> Self {
        Self {
            k_neighbours,
            ..self
        }
    }

    pub fn method(self, method: Method) -> Self {
        Self { method, ..self }
    }

    pub fn component_range(self, component_range: ComponentRange) -> Self {
        Self {
            component_range,
            ..self
        }
    }

    pub fn mean_scope(self, mean_scope: MeanScope) -> Self {
        Self { mean_scope, ..self }
    }

    pub fn imaginary_tolerance(self, imaginary_tolerance: f64) -> Self {
        Self {
            imaginary_tolerance,
            ..self
        }
    }

    pub fn rcond_tolerance(self, rcond_tolerance: f64) -> Self {
        Self {
            rcond_tolerance,
            ..self
        }
    }

    /// Canonical (width, height) every image is resized to.
    pub fn image_size(self, width: u32, height: u32) -> Self {
        Self {
            image_size: Some((width, height)),
            ..self
        }
    }

    pub fn layout(self, layout: DatasetLayout) -> Self {
        Self { layout, ..self }
    }

    pub fn get_eigenface_no(&self) -> usize {
        self.eigenface_no
    }

    pub fn get_k_neighbours(&self) -> usize {
        self.k_neighbours
    }

    pub fn get_method(&self) -> Method {
        self.method
    }

    pub fn get_component_range(&self) -> ComponentRange {
        self.component_range
    }

    pub fn get_layout(&self) -> &DatasetLayout {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_unrelated_fields() {
        let config = EngineConfig::new()
            .k_neighbours(3)
            .eigenface_no(8)
            .method(Method::Lda);
        assert_eq!(config.get_k_neighbours(), 3);
        assert_eq!(config.get_eigenface_no(), 8);
        assert_eq!(config.get_component_range(), ComponentRange::full(8));
        assert_eq!(config.get_method(), Method::Lda);
        assert_eq!(config.weight_scale, DEFAULT_WEIGHT_SCALE);
        assert_eq!(config.get_layout().label_file, "classes.csv");
    }
}
