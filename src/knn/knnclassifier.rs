use super::*;

/// A training entry close to a query, as returned by [`WeightKnn::nearest`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbour {
    pub id: usize,
    pub label: i32,
    pub distance: f64,
}

/// Nearest-neighbour search over weight vectors.
///
/// `weights` has one row per dataset id; only the ids in `training` are candidates.
#[derive(Clone)]
pub struct WeightKnn<'a> {
    weights: ArrayView2<'a, f64>,
    labels: &'a [i32],
    training: &'a [usize],
    range: ComponentRange,
    eigenface_no: usize,
}

impl<'a> WeightKnn<'a> {
    pub fn new(
        weights: ArrayView2<'a, f64>,
        labels: &'a [i32],
        training: &'a [usize],
        range: ComponentRange,
        eigenface_no: usize,
    ) -> Self {
        Self {
            weights,
            labels,
            training,
            range,
            eigenface_no,
        }
    }

    pub fn distance(&self, id1: usize, id2: usize) -> f64 {
        weight_distance(
            self.weights.row(id1),
            self.weights.row(id2),
            self.range,
            self.eigenface_no,
        )
    }

    /// The `k` training entries closest to `id`, closest first. `id` itself is never
    /// returned; equal distances keep training order. Fewer than `k` come back when the
    /// training set is smaller.
    pub fn nearest(&self, id: usize, k: usize) -> Result<Vec<Neighbour>, Error> {
        let mut candidates = self
            .training
            .iter()
            .filter(|&&other| other != id)
            .map(|&other| {
                NotNan::new(self.distance(id, other))
                    .map(|distance| (distance, other))
                    .map_err(|_| Error::NanDistance(id, other))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        if candidates.is_empty() {
            return Err(Error::NoNeighbours(id));
        }
        candidates.sort_by_key(|&(distance, _)| distance);
        Ok(candidates
            .into_iter()
            .take(k)
            .map(|(distance, other)| Neighbour {
                id: other,
                label: self.labels[other],
                distance: distance.into_inner(),
            })
            .collect())
    }

    /// Majority label among the `k` nearest training entries.
    pub fn classify(&self, id: usize, k: usize) -> Result<i32, Error> {
        let neighbours = self.nearest(id, k.max(1))?;
        vote(&neighbours).ok_or(Error::NoNeighbours(id))
    }
}

/// Most frequent label; ties go to the smallest label.
pub fn vote(neighbours: &[Neighbour]) -> Option<i32> {
    let counter: Counter<i32, usize> = neighbours.iter().map(|n| n.label).collect();
    counter
        .most_common_tiebreaker(|a, b| a.cmp(b))
        .first()
        .map(|(label, _)| *label)
}
