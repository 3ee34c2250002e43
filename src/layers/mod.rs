pub mod dense;
pub mod dropout;
pub mod param;

use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

pub use dense::{Dense, WeightInit};
pub use dropout::Dropout;
pub use param::Param;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layer {
    Dense(Dense),
    Dropout(Dropout),
}

impl Layer {
    /// Only dropout looks at `training`; dense layers cache in both modes.
    pub fn forward(&mut self, input: &Matrix, training: bool) -> Matrix {
        match self {
            Layer::Dense(dense) => dense.forward(input),
            Layer::Dropout(dropout) => dropout.forward(input, training),
        }
    }

    pub fn backward(&mut self, grad_out: &Matrix) -> Matrix {
        match self {
            Layer::Dense(dense) => dense.backward(grad_out),
            Layer::Dropout(dropout) => dropout.backward(grad_out),
        }
    }
}
