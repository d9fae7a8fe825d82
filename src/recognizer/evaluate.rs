use prettytable::{Cell, Row, Table};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::*;
use crate::utils::math::powers_of_two;
use crate::utils::metrics::accuracy;

/// Neighbour counts the accuracy report runs through.
pub const DEFAULT_K_SWEEP: [usize; 4] = [1, 3, 7, 15];

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AccuracyCell {
    pub range: ComponentRange,
    pub accuracy: f64,
}

/// Test accuracy for every power-of-two band of weight components.
#[derive(Clone, Debug, PartialEq)]
pub struct AccuracyGrid {
    pub k: usize,
    pub cells: Vec<AccuracyCell>,
}

impl AccuracyGrid {
    pub fn get(&self, start: usize, end: usize) -> Option<f64> {
        self.cells
            .iter()
            .find(|cell| cell.range.start() == start && cell.range.end() == end)
            .map(|cell| cell.accuracy)
    }

    /// One row per start component, ends increasing along the row.
    pub fn to_table(&self) -> Table {
        let mut ends = self.cells.iter().map(|c| c.range.end()).collect::<Vec<_>>();
        ends.sort_unstable();
        ends.dedup();
        let mut table = Table::new();
        let mut header = vec![Cell::new(&format!("k={}", self.k))];
        header.extend(ends.iter().map(|end| Cell::new(&format!("..{end}"))));
        table.add_row(Row::new(header));
        let mut starts = self.cells.iter().map(|c| c.range.start()).collect::<Vec<_>>();
        starts.dedup();
        for start in starts {
            let mut row = vec![Cell::new(&format!("{start}.."))];
            row.extend(ends.iter().map(|&end| match self.get(start, end) {
                Some(value) => Cell::new(&format!("{value:.3}")),
                None => Cell::new(""),
            }));
            table.add_row(Row::new(row));
        }
        table
    }
}

impl Display for AccuracyGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}

impl FaceRecognizer {
    /// Fraction of `ids` classified as their own label with the configured k and range.
    pub fn evaluate(&self, ids: &[usize]) -> Result<f64, Error> {
        self.evaluate_with(ids, self.config.k_neighbours, self.config.component_range)
    }

    pub fn evaluate_with(
        &self,
        ids: &[usize],
        k: usize,
        range: ComponentRange,
    ) -> Result<f64, Error> {
        let predicted = self.predict(ids, k, range)?;
        Ok(accuracy(&self.expected(ids), &predicted))
    }

    fn predict(&self, ids: &[usize], k: usize, range: ComponentRange) -> Result<Vec<i32>, Error> {
        if ids.is_empty() {
            return Err(Error::EmptyEvaluation);
        }
        #[cfg(feature = "parallel")]
        let predicted = ids
            .par_iter()
            .map(|&id| self.classify_with(id, k, range))
            .collect::<Result<Vec<i32>, Error>>()?;
        #[cfg(not(feature = "parallel"))]
        let predicted = ids
            .iter()
            .map(|&id| self.classify_with(id, k, range))
            .collect::<Result<Vec<i32>, Error>>()?;
        Ok(predicted)
    }

    fn expected(&self, ids: &[usize]) -> Vec<i32> {
        ids.iter().map(|&id| self.dataset.label(id)).collect()
    }

    /// Accuracy over the whole test partition. `verbose` logs every prediction.
    pub fn test(&self, verbose: bool) -> Result<f64, Error> {
        let ids = self.dataset.test_ids();
        let predicted = self.predict(ids, self.config.k_neighbours, self.config.component_range)?;
        let expected = self.expected(ids);
        let result = accuracy(&expected, &predicted);
        if verbose {
            for (input, output) in zip(&expected, &predicted) {
                log::info!("input: {input} --- output: {output}");
            }
            log::info!("accuracy: {result}");
        }
        Ok(result)
    }

    /// Test accuracy for start components 1, 2, 4, ... up to `eigenface_no`, each paired
    /// with every power-of-two end from the start up to `eigenface_no`.
    pub fn accuracy_sweep(&self) -> Result<AccuracyGrid, Error> {
        self.accuracy_sweep_with_k(self.config.k_neighbours)
    }

    pub fn accuracy_sweep_with_k(&self, k: usize) -> Result<AccuracyGrid, Error> {
        let limit = self.config.eigenface_no;
        let components = self.components()?;
        if components < limit {
            log::warn!(
                "only {components} weight components exist, ranges past them are clamped"
            );
        }
        let ids = self.dataset.test_ids();
        let mut cells = Vec::new();
        for start in powers_of_two(1, limit) {
            for end in powers_of_two(start, limit) {
                let range = ComponentRange::new(start, end)?;
                let accuracy = self.evaluate_with(ids, k, range)?;
                cells.push(AccuracyCell { range, accuracy });
            }
        }
        Ok(AccuracyGrid { k, cells })
    }

    /// Runs [`FaceRecognizer::accuracy_sweep_with_k`] for every `k` and logs the grids.
    pub fn k_sweep(&self, ks: &[usize]) -> Result<Vec<AccuracyGrid>, Error> {
        ks.iter()
            .map(|&k| {
                let grid = self.accuracy_sweep_with_k(k)?;
                log::info!("k-neighbours: {k}\n{grid}");
                Ok(grid)
            })
            .collect()
    }
}
