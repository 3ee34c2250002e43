use std::collections::HashSet;
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::activation::ActivationFunction;
use crate::data::{ClassificationConfig, SplitConfig};
use crate::error::{Error, Result};
use crate::loss::LossType;
use crate::network::{LayerSpec, NetworkSpec};
use crate::optim::OptimizerConfig;
use crate::train::Backend;

/// One model to train: an architecture, the front end that trains it and
/// its optimizer. Unset fields fall back to the backend defaults and the
/// experiment-wide epoch count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    pub backend: Backend,
    pub network: NetworkSpec,
    pub optimizer: OptimizerConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epochs: Option<usize>,
    /// Seeds weight init, dropout masks and shuffling for this run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl RunSpec {
    pub fn name(&self) -> &str {
        &self.network.name
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or_else(|| self.backend.default_batch_size())
    }

    pub fn epochs(&self, default: usize) -> usize {
        self.epochs.unwrap_or(default)
    }
}

/// Everything one invocation needs, loadable from JSON.
///
/// `Default` reproduces the reference comparison: 15000 samples with 40
/// features (15 informative), a 60/20/20 split, and three models trained
/// for 20 epochs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub dataset: ClassificationConfig,
    pub split: SplitConfig,
    pub epochs: usize,
    pub runs: Vec<RunSpec>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        let dataset = ClassificationConfig {
            n_samples: 15000,
            n_features: 40,
            n_informative: 15,
            seed: Some(2022),
            ..ClassificationConfig::default()
        };
        let runs = default_runs(dataset.n_features);
        ExperimentConfig {
            dataset,
            split: SplitConfig::default(),
            epochs: 20,
            runs,
        }
    }
}

/// Base and advanced models through `fit`, and the base model again through
/// the manual loop.
pub fn default_runs(input_dim: usize) -> Vec<RunSpec> {
    let base_layers = vec![
        LayerSpec::Dense { units: 20, activation: ActivationFunction::ReLU },
        LayerSpec::Dense { units: 1, activation: ActivationFunction::Sigmoid },
    ];
    let advanced_layers = vec![
        LayerSpec::Dense { units: 50, activation: ActivationFunction::ReLU },
        LayerSpec::Dropout { rate: 0.3 },
        LayerSpec::Dense { units: 30, activation: ActivationFunction::ReLU },
        LayerSpec::Dense { units: 1, activation: ActivationFunction::Sigmoid },
    ];
    let bce = LossType::BinaryCrossEntropy;

    vec![
        RunSpec {
            backend: Backend::Fit,
            network: NetworkSpec::new("base_fit", input_dim, base_layers.clone(), bce).with_label("Base"),
            optimizer: OptimizerConfig::adam(0.001),
            batch_size: None,
            epochs: None,
            seed: None,
        },
        RunSpec {
            backend: Backend::Fit,
            network: NetworkSpec::new("advanced_fit", input_dim, advanced_layers, bce).with_label("Advanced"),
            optimizer: OptimizerConfig::adam(0.0001),
            batch_size: None,
            epochs: None,
            seed: None,
        },
        RunSpec {
            backend: Backend::Manual,
            network: NetworkSpec::new("base_manual", input_dim, base_layers, bce).with_label("Base"),
            optimizer: OptimizerConfig::adam(0.001),
            batch_size: None,
            epochs: None,
            seed: None,
        },
    ]
}

impl ExperimentConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<ExperimentConfig> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    /// Sets the dataset seed and gives every run a distinct seed derived from it.
    pub fn reseed(&mut self, seed: u64) {
        self.dataset.seed = Some(seed);
        for (i, run) in self.runs.iter_mut().enumerate() {
            run.seed = Some(seed.wrapping_add(1 + i as u64));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.dataset.validate()?;

        for (name, size) in [("test_size", self.split.test_size), ("val_size", self.split.val_size)] {
            if !(size > 0.0 && size < 1.0) {
                return Err(Error::InvalidConfig(format!("{name} must be between 0 and 1, got {size}")));
            }
        }
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be at least 1".into()));
        }
        if self.runs.is_empty() {
            return Err(Error::InvalidConfig("at least one run is required".into()));
        }

        let mut names = HashSet::new();
        for run in &self.runs {
            run.network.validate()?;
            run.optimizer.validate()?;
            if !names.insert(run.name()) {
                return Err(Error::InvalidConfig(format!("duplicate run name '{}'", run.name())));
            }
            if run.network.input_dim != self.dataset.n_features {
                return Err(Error::InvalidConfig(format!(
                    "run '{}' expects {} inputs but the dataset has {} features",
                    run.name(), run.network.input_dim, self.dataset.n_features
                )));
            }
            if run.network.output_dim() != Some(1) {
                return Err(Error::InvalidConfig(format!(
                    "run '{}' must end in a single output unit for binary classification",
                    run.name()
                )));
            }
            if run.batch_size == Some(0) || run.epochs == Some(0) {
                return Err(Error::InvalidConfig(format!(
                    "run '{}' has a zero batch size or epoch count", run.name()
                )));
            }
            if run.name().contains(['/', '\\']) {
                return Err(Error::InvalidConfig(format!(
                    "run name '{}' must not contain path separators", run.name()
                )));
            }
        }
        Ok(())
    }
}
