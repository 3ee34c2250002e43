use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// One mini-batch: inputs (batch x features) and 0/1 targets (batch x 1).
#[derive(Debug, Clone)]
pub struct Batch {
    pub inputs: Matrix,
    pub targets: Matrix,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.inputs.rows
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.rows == 0
    }
}

/// Splits a dataset into mini-batches, optionally reshuffling on every pass.
pub struct DataLoader<'a> {
    dataset: &'a Dataset,
    targets: Matrix,
    batch_size: usize,
    shuffle: bool,
    rng: StdRng,
}

impl<'a> DataLoader<'a> {
    pub fn new(dataset: &'a Dataset, batch_size: usize, shuffle: bool, seed: Option<u64>) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(DataLoader {
            dataset,
            targets: dataset.targets(),
            batch_size,
            shuffle,
            rng,
        })
    }

    /// Number of batches per pass; the last one may be short.
    pub fn len(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Starts a new pass over the data.
    pub fn iter(&mut self) -> Batches<'_> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            order.shuffle(&mut self.rng);
        }
        Batches {
            features: &self.dataset.features,
            targets: &self.targets,
            order,
            batch_size: self.batch_size,
            pos: 0,
        }
    }
}

pub struct Batches<'a> {
    features: &'a Matrix,
    targets: &'a Matrix,
    order: Vec<usize>,
    batch_size: usize,
    pos: usize,
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.pos >= self.order.len() {
            return None;
        }
        let end = (self.pos + self.batch_size).min(self.order.len());
        let idx = &self.order[self.pos..end];
        self.pos = end;
        Some(Batch {
            inputs: self.features.select_rows(idx),
            targets: self.targets.select_rows(idx),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> Dataset {
        let features = Matrix::from_data((0..n).map(|i| vec![i as f64, -(i as f64)]).collect());
        Dataset::new(features, (0..n).map(|i| i % 2).collect(), 2).unwrap()
    }

    #[test]
    fn batch_count_and_short_tail() {
        let ds = dataset(10);
        let mut loader = DataLoader::new(&ds, 4, false, None).unwrap();
        assert_eq!(loader.len(), 3);
        let sizes: Vec<usize> = loader.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn unshuffled_preserves_order_and_pairs_targets() {
        let ds = dataset(5);
        let mut loader = DataLoader::new(&ds, 2, false, None).unwrap();
        let first = loader.iter().next().unwrap();
        assert_eq!(first.inputs.data, vec![vec![0.0, -0.0], vec![1.0, -1.0]]);
        assert_eq!(first.targets.data, vec![vec![0.0], vec![1.0]]);
    }

    #[test]
    fn shuffled_passes_differ_but_cover_everything() {
        let ds = dataset(64);
        let mut loader = DataLoader::new(&ds, 64, true, Some(5)).unwrap();
        let a: Vec<f64> = loader.iter().next().unwrap().inputs.data.iter().map(|r| r[0]).collect();
        let b: Vec<f64> = loader.iter().next().unwrap().inputs.data.iter().map(|r| r[0]).collect();
        assert_ne!(a, b);
        let mut sorted = a.clone();
        sorted.sort_by(|x, y| x.partial_cmp(y).unwrap());
        assert_eq!(sorted, (0..64).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let ds = dataset(3);
        assert!(DataLoader::new(&ds, 0, false, None).is_err());
    }
}
