use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Serialize, Deserialize};

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};

/// Two-stage split: `test_size` of everything is held out for testing, then
/// `val_size` of what remains becomes the validation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub test_size: f64,
    pub val_size: f64,
    pub seed: Option<u64>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig { test_size: 0.2, val_size: 0.25, seed: Some(42) }
    }
}

#[derive(Debug, Clone)]
pub struct Splits {
    pub train: Dataset,
    pub val: Dataset,
    pub test: Dataset,
}

/// Shuffles the rows and returns `(train, test)`.
///
/// The test side gets `ceil(test_size * n)` rows; both sides must end up
/// non-empty.
pub fn train_test_split(dataset: &Dataset, test_size: f64, seed: Option<u64>) -> Result<(Dataset, Dataset)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::InvalidSplit(format!(
            "test_size must be between 0 and 1, got {test_size}"
        )));
    }

    let n_samples = dataset.len();
    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(Error::InvalidSplit(format!(
            "split would leave an empty side (n_train={n_train}, n_test={n_test})"
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    match seed {
        Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => indices.shuffle(&mut rand::thread_rng()),
    }

    let (test_idx, train_idx) = indices.split_at(n_test);
    Ok((dataset.subset(train_idx), dataset.subset(test_idx)))
}

/// Train / validation / test split, both stages using the same seed.
pub fn split_three_way(dataset: &Dataset, config: &SplitConfig) -> Result<Splits> {
    let (rest, test) = train_test_split(dataset, config.test_size, config.seed)?;
    let (train, val) = train_test_split(&rest, config.val_size, config.seed)?;
    Ok(Splits { train, val, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;

    fn counting(n: usize) -> Dataset {
        let features = Matrix::from_data((0..n).map(|i| vec![i as f64]).collect());
        let labels = (0..n).map(|i| i % 2).collect();
        Dataset::new(features, labels, 2).unwrap()
    }

    #[test]
    fn sizes_follow_ceil_rule() {
        let (train, test) = train_test_split(&counting(10), 0.25, Some(42)).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 7);
    }

    #[test]
    fn three_way_sizes_for_the_default_run() {
        let splits = split_three_way(&counting(15000), &SplitConfig::default()).unwrap();
        assert_eq!(splits.train.len(), 9000);
        assert_eq!(splits.val.len(), 3000);
        assert_eq!(splits.test.len(), 3000);
    }

    #[test]
    fn split_is_a_partition() {
        let (train, test) = train_test_split(&counting(50), 0.2, Some(1)).unwrap();
        let mut seen: Vec<usize> = train.features.iter().chain(test.features.iter())
            .map(|&v| v as usize)
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
        // Labels travel with their rows.
        for (row, &label) in train.features.data.iter().zip(train.labels.iter()) {
            assert_eq!(row[0] as usize % 2, label);
        }
    }

    #[test]
    fn same_seed_same_split() {
        let a = train_test_split(&counting(30), 0.2, Some(42)).unwrap();
        let b = train_test_split(&counting(30), 0.2, Some(42)).unwrap();
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
    }

    #[test]
    fn degenerate_splits_are_rejected() {
        assert!(matches!(train_test_split(&counting(10), 0.0, None), Err(Error::InvalidSplit(_))));
        assert!(train_test_split(&counting(10), 1.0, None).is_err());
        assert!(train_test_split(&counting(1), 0.5, None).is_err());
    }
}
