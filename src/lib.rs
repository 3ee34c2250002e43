pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod data;
pub mod train;
pub mod plot;
pub mod config;
pub mod experiment;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::{Dense, Dropout, Layer, WeightInit};
pub use network::{Network, NetworkSpec, LayerSpec};
pub use loss::LossType;
pub use optim::{Adam, Optimizer, OptimizerConfig, Sgd};
pub use data::{make_classification, train_test_split, ClassificationConfig, DataLoader, Dataset};
pub use train::{train_manual, Backend, FitConfig, History, Sequential};
pub use config::{ExperimentConfig, RunSpec};
pub use experiment::{run, Report, RunSummary};
pub use error::{Error, Result};
