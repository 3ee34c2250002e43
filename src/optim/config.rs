use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::optim::{adam::Adam, optimizer::Optimizer, sgd::Sgd};
use crate::train::backend::Backend;

/// Serializable optimizer choice.
///
/// Adam's `epsilon` is optional; when omitted the backend's default is used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Sgd {
        learning_rate: f64,
    },
    Adam {
        learning_rate: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        epsilon: Option<f64>,
    },
}

impl OptimizerConfig {
    pub fn adam(learning_rate: f64) -> Self {
        OptimizerConfig::Adam { learning_rate, epsilon: None }
    }

    pub fn learning_rate(&self) -> f64 {
        match *self {
            OptimizerConfig::Sgd { learning_rate } => learning_rate,
            OptimizerConfig::Adam { learning_rate, .. } => learning_rate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let lr = self.learning_rate();
        if !(lr.is_finite() && lr > 0.0) {
            return Err(Error::InvalidConfig(format!("learning rate must be positive, got {lr}")));
        }
        if let OptimizerConfig::Adam { epsilon: Some(eps), .. } = *self {
            if !(eps.is_finite() && eps > 0.0) {
                return Err(Error::InvalidConfig(format!("adam epsilon must be positive, got {eps}")));
            }
        }
        Ok(())
    }

    pub fn build(&self, backend: Backend) -> Box<dyn Optimizer> {
        match *self {
            OptimizerConfig::Sgd { learning_rate } => Box::new(Sgd::new(learning_rate)),
            OptimizerConfig::Adam { learning_rate, epsilon } => {
                let epsilon = epsilon.unwrap_or_else(|| backend.default_adam_epsilon());
                Box::new(Adam::new(learning_rate, epsilon))
            }
        }
    }
}
