#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod dataset;
pub mod decomposition;
pub mod knn;
pub mod recognizer;
pub mod utils;

pub use config::{DatasetLayout, EngineConfig, MeanScope};
pub use dataset::{Dataset, Partition};
pub use decomposition::{Basis, Method};
pub use knn::ComponentRange;
pub use recognizer::{AccuracyGrid, Error, FaceRecognizer, Neighbour, ReconstructionFrame};

//All imports are defined here and made (pub)crate
pub(crate) use counter::Counter;
pub(crate) use image::GrayImage;
pub(crate) use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
pub(crate) use ordered_float::NotNan;
pub(crate) use std::{
    fmt::{self, Display},
    iter::zip,
    path::{Path, PathBuf},
};
pub(crate) use thiserror::Error;
