//! Clusters-on-a-hypercube classification data.
//!
//! Each class owns `n_clusters_per_class` Gaussian clusters whose centroids
//! sit on distinct vertices of a hypercube in the informative subspace. The
//! remaining columns are linear combinations, copies or pure noise, so only
//! `n_informative` directions carry class signal.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::math::matrix::{sample_standard_normal, Matrix};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub n_samples: usize,
    pub n_features: usize,
    pub n_informative: usize,
    pub n_redundant: usize,
    pub n_repeated: usize,
    pub n_classes: usize,
    pub n_clusters_per_class: usize,
    /// Fraction of labels replaced by a uniformly random class.
    pub flip_y: f64,
    /// Half the edge length of the hypercube.
    pub class_sep: f64,
    /// When false, centroids are randomly rescaled off the vertices.
    pub hypercube: bool,
    pub shift: f64,
    pub scale: f64,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        ClassificationConfig {
            n_samples: 100,
            n_features: 20,
            n_informative: 2,
            n_redundant: 2,
            n_repeated: 0,
            n_classes: 2,
            n_clusters_per_class: 2,
            flip_y: 0.01,
            class_sep: 1.0,
            hypercube: true,
            shift: 0.0,
            scale: 1.0,
            shuffle: true,
            seed: None,
        }
    }
}

impl ClassificationConfig {
    pub fn n_clusters(&self) -> usize {
        self.n_classes * self.n_clusters_per_class
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(Error::InvalidConfig(msg)) };

        if self.n_samples == 0 {
            return invalid("n_samples must be at least 1".into());
        }
        if self.n_classes < 2 {
            return invalid(format!("n_classes must be at least 2, got {}", self.n_classes));
        }
        if self.n_clusters_per_class == 0 {
            return invalid("n_clusters_per_class must be at least 1".into());
        }
        if self.n_informative == 0 {
            return invalid("n_informative must be at least 1".into());
        }
        let used = self.n_informative + self.n_redundant + self.n_repeated;
        if used > self.n_features {
            return invalid(format!(
                "n_informative + n_redundant + n_repeated = {used} exceeds n_features = {}",
                self.n_features
            ));
        }
        // Every cluster needs its own hypercube vertex.
        let vertices_suffice = self.n_informative >= usize::BITS as usize - 1
            || self.n_clusters() <= 1usize << self.n_informative;
        if !vertices_suffice {
            return invalid(format!(
                "n_classes * n_clusters_per_class = {} must be at most 2^n_informative = {}",
                self.n_clusters(),
                1usize << self.n_informative
            ));
        }
        if !(0.0..=1.0).contains(&self.flip_y) {
            return invalid(format!("flip_y must be in [0, 1], got {}", self.flip_y));
        }
        Ok(())
    }
}

/// Generates a random n-class classification problem.
pub fn make_classification(config: &ClassificationConfig) -> Result<Dataset> {
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let n_samples = config.n_samples;
    let n_inf = config.n_informative;
    let n_red = config.n_redundant;
    let n_rep = config.n_repeated;
    let n_clusters = config.n_clusters();

    // Split samples evenly across clusters; the remainder goes to the first ones.
    let mut cluster_sizes = vec![n_samples / n_clusters; n_clusters];
    for size in cluster_sizes.iter_mut().take(n_samples % n_clusters) {
        *size += 1;
    }

    let centroids = hypercube_centroids(config, &mut rng);

    let mut x = Matrix::zeros(n_samples, config.n_features);
    let mut y = vec![0usize; n_samples];

    // Informative block: N(0, 1) mixed by a per-cluster covariance, then shifted.
    let mut start = 0;
    for (k, &size) in cluster_sizes.iter().enumerate() {
        let stop = start + size;
        let covariance = Matrix::uniform(n_inf, n_inf, 1.0, &mut rng);
        let raw = Matrix::normal(size, n_inf, 1.0, &mut rng);
        let mixed = raw.matmul(&covariance);

        for (r, row) in mixed.data.iter().enumerate() {
            let target = &mut x.data[start + r];
            for (c, v) in row.iter().enumerate() {
                target[c] = v + centroids[k][c];
            }
            y[start + r] = k % config.n_classes;
        }
        start = stop;
    }

    // Redundant block: random linear combinations of the informative features.
    if n_red > 0 {
        let mixing = Matrix::uniform(n_inf, n_red, 1.0, &mut rng);
        for row in &mut x.data {
            for j in 0..n_red {
                let combined: f64 = (0..n_inf).map(|i| row[i] * mixing.data[i][j]).sum();
                row[n_inf + j] = combined;
            }
        }
    }

    // Repeated block: copies of random informative or redundant columns.
    if n_rep > 0 {
        let sources: Vec<usize> = (0..n_rep).map(|_| rng.gen_range(0..n_inf + n_red)).collect();
        for row in &mut x.data {
            for (j, &src) in sources.iter().enumerate() {
                row[n_inf + n_red + j] = row[src];
            }
        }
    }

    // Useless block: pure noise.
    let useful = n_inf + n_red + n_rep;
    for row in &mut x.data {
        for v in row.iter_mut().skip(useful) {
            *v = sample_standard_normal(&mut rng);
        }
    }

    if config.flip_y > 0.0 {
        for label in y.iter_mut() {
            if rng.gen::<f64>() < config.flip_y {
                *label = rng.gen_range(0..config.n_classes);
            }
        }
    }

    if config.shift != 0.0 || config.scale != 1.0 {
        x = x.map(|v| (v + config.shift) * config.scale);
    }

    if config.shuffle {
        let mut rows: Vec<usize> = (0..n_samples).collect();
        rows.shuffle(&mut rng);
        x = x.select_rows(&rows);
        y = rows.iter().map(|&i| y[i]).collect();

        let mut cols: Vec<usize> = (0..config.n_features).collect();
        cols.shuffle(&mut rng);
        for row in &mut x.data {
            *row = cols.iter().map(|&c| row[c]).collect();
        }
    }

    Dataset::new(x, y, config.n_classes)
}

/// One centroid per cluster, on distinct vertices of [-class_sep, class_sep]^n_informative.
fn hypercube_centroids(config: &ClassificationConfig, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n_inf = config.n_informative;
    let sep = config.class_sep;

    let mut seen: HashSet<Vec<bool>> = HashSet::with_capacity(config.n_clusters());
    let mut centroids = Vec::with_capacity(config.n_clusters());
    while centroids.len() < config.n_clusters() {
        let vertex: Vec<bool> = (0..n_inf).map(|_| rng.gen::<bool>()).collect();
        if seen.insert(vertex.clone()) {
            centroids.push(vertex.iter().map(|&bit| if bit { sep } else { -sep }).collect::<Vec<f64>>());
        }
    }

    if !config.hypercube {
        for centroid in centroids.iter_mut() {
            let row_scale = 2.0 * rng.gen::<f64>();
            centroid.iter_mut().for_each(|c| *c *= row_scale);
        }
        let col_scales: Vec<f64> = (0..n_inf).map(|_| rng.gen::<f64>()).collect();
        for centroid in centroids.iter_mut() {
            centroid.iter_mut().zip(col_scales.iter()).for_each(|(c, s)| *c *= s);
        }
    }

    centroids
}
