use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

/// A trainable tensor together with its accumulated gradient.
///
/// Gradients are not serialized; a freshly loaded parameter starts with an
/// empty gradient that is resized on the next `zero_grad` or `accumulate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub value: Matrix,
    #[serde(skip)]
    pub grad: Matrix,
}

impl Param {
    pub fn new(value: Matrix) -> Param {
        let grad = Matrix::zeros(value.rows, value.cols);
        Param { value, grad }
    }

    pub fn zero_grad(&mut self) {
        if self.grad.shape() == self.value.shape() {
            self.grad.fill(0.0);
        } else {
            self.grad = Matrix::zeros(self.value.rows, self.value.cols);
        }
    }

    pub fn accumulate(&mut self, grad: Matrix) {
        if self.grad.shape() == self.value.shape() {
            self.grad = std::mem::take(&mut self.grad) + grad;
        } else {
            self.grad = grad;
        }
    }

    pub fn len(&self) -> usize {
        self.value.rows * self.value.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
