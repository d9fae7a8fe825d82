use crate::*;
use std::ops::Range;

mod knnclassifier;

pub use knnclassifier::{Neighbour, WeightKnn};

#[derive(Debug, Error)]
pub enum Error {
    #[error("component range [{start}, {end}] is invalid, expected 1 <= start <= end")]
    InvalidRange { start: usize, end: usize },
    #[error("entry {0} has no training neighbours")]
    NoNeighbours(usize),
    #[error("distance between entries {0} and {1} is not a number")]
    NanDistance(usize, usize),
}

/// Inclusive, 1-based band of weight components used by the distance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ComponentRange {
    start: usize,
    end: usize,
}

impl ComponentRange {
    pub fn new(start: usize, end: usize) -> Result<Self, Error> {
        if start == 0 || start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// `[1, components]`.
    pub const fn full(components: usize) -> Self {
        Self {
            start: 1,
            end: components,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Zero-based, half-open indices restricted to `len` components.
    pub(crate) fn indices(&self, len: usize) -> Range<usize> {
        let end = self.end.min(len);
        self.start.saturating_sub(1).min(end)..end
    }
}

impl Display for ComponentRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Squared difference of two weight vectors over `range`, divided by `eigenface_no`
/// rather than by the width of the range.
pub fn weight_distance(
    left: ArrayView1<f64>,
    right: ArrayView1<f64>,
    range: ComponentRange,
    eigenface_no: usize,
) -> f64 {
    let indices = range.indices(left.len().min(right.len()));
    let mut result = 0f64;
    for i in indices {
        let diff = left[i] - right[i];
        result += diff * diff;
    }
    result / eigenface_no as f64
}
