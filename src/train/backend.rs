use serde::{Serialize, Deserialize};

use crate::layers::WeightInit;

/// Which training front end a run uses. Each carries its own defaults so
/// both reproduce the conventions of the library they stand in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// `Sequential::compile` + `Sequential::fit`.
    Fit,
    /// Hand-written zero_grad / forward / backward / step loop.
    Manual,
}

impl Backend {
    pub fn weight_init(&self) -> WeightInit {
        match self {
            Backend::Fit    => WeightInit::GlorotUniform,
            Backend::Manual => WeightInit::TorchDefault,
        }
    }

    pub fn default_batch_size(&self) -> usize {
        match self {
            Backend::Fit    => 32,
            Backend::Manual => 64,
        }
    }

    pub fn default_adam_epsilon(&self) -> f64 {
        match self {
            Backend::Fit    => 1e-7,
            Backend::Manual => 1e-8,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::Fit    => "fit API",
            Backend::Manual => "manual loop",
        }
    }
}
