use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Feature matrix plus integer class labels, one row per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub features: Matrix,
    pub labels: Vec<usize>,
    pub n_classes: usize,
}

impl Dataset {
    pub fn new(features: Matrix, labels: Vec<usize>, n_classes: usize) -> Result<Dataset> {
        if features.rows != labels.len() {
            return Err(Error::shape(
                format!("{} labels", features.rows),
                format!("{} labels", labels.len()),
            ));
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= n_classes) {
            return Err(Error::InvalidConfig(format!(
                "label {bad} out of range for {n_classes} classes"
            )));
        }
        Ok(Dataset { features, labels, n_classes })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.cols
    }

    /// (samples, features), as printed in the shape summary.
    pub fn shape(&self) -> (usize, usize) {
        self.features.shape()
    }

    /// Labels as an (n, 1) column of 0.0 / 1.0 targets.
    pub fn targets(&self) -> Matrix {
        Matrix::column(&self.labels.iter().map(|&l| l as f64).collect::<Vec<_>>())
    }

    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select_rows(indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            n_classes: self.n_classes,
        }
    }

    /// Number of samples carrying each label.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &l in &self.labels {
            counts[l] += 1;
        }
        counts
    }
}
