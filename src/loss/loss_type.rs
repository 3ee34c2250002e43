use serde::{Serialize, Deserialize};

use crate::loss::{bce::BceLoss, mse::MseLoss};
use crate::math::matrix::Matrix;

/// Selects which loss function a network is trained against.
///
/// - `BinaryCrossEntropy` — pair with a single Sigmoid output.
/// - `Mse`                — mean-squared error; pair with Identity or Sigmoid output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    BinaryCrossEntropy,
    Mse,
}

impl LossType {
    /// Batch-mean scalar loss.
    pub fn loss(&self, predicted: &Matrix, expected: &Matrix) -> f64 {
        match self {
            LossType::BinaryCrossEntropy => BceLoss::loss(predicted, expected),
            LossType::Mse                => MseLoss::loss(predicted, expected),
        }
    }

    /// ∂L/∂predicted, already divided by the batch size.
    pub fn derivative(&self, predicted: &Matrix, expected: &Matrix) -> Matrix {
        match self {
            LossType::BinaryCrossEntropy => BceLoss::derivative(predicted, expected),
            LossType::Mse                => MseLoss::derivative(predicted, expected),
        }
    }
}
