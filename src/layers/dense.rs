use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{activation::activation::ActivationFunction, layers::param::Param, math::matrix::Matrix};

/// How a dense layer draws its initial weights and biases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    /// U(±sqrt(6 / (fan_in + fan_out))) weights, zero biases.
    GlorotUniform,
    /// U(±1 / sqrt(fan_in)) for both weights and biases.
    TorchDefault,
    /// N(0, 2 / fan_in) weights, zero biases. Suited to ReLU stacks.
    He,
    /// N(0, 1 / fan_in) weights, zero biases.
    Xavier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dense {
    pub weights: Param,
    pub biases: Param,
    pub activation: ActivationFunction,
    #[serde(skip)]
    input: Matrix,
    // pre-activation values (z = XW + b), needed for the activation derivative
    #[serde(skip)]
    pre_activation: Matrix,
}

impl Dense {
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        size: usize,
        activation: ActivationFunction,
        init: WeightInit,
        rng: &mut R,
    ) -> Dense {
        let (weights, biases) = match init {
            WeightInit::GlorotUniform => {
                let limit = (6.0 / (input_size + size) as f64).sqrt();
                (Matrix::uniform(input_size, size, limit, rng), Matrix::zeros(1, size))
            }
            WeightInit::TorchDefault => {
                let bound = 1.0 / (input_size as f64).sqrt();
                let w = Matrix::uniform(input_size, size, bound, rng);
                (w, Matrix::uniform(1, size, bound, rng))
            }
            WeightInit::He => (Matrix::he(input_size, size, rng), Matrix::zeros(1, size)),
            WeightInit::Xavier => (Matrix::xavier(input_size, size, rng), Matrix::zeros(1, size)),
        };

        Dense {
            weights: Param::new(weights),
            biases: Param::new(biases),
            activation,
            input: Matrix::default(),
            pre_activation: Matrix::default(),
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.value.rows
    }

    pub fn size(&self) -> usize {
        self.weights.value.cols
    }

    /// Batch forward pass; caches the input and pre-activation for `backward`.
    pub fn forward(&mut self, input: &Matrix) -> Matrix {
        let z = input.matmul(&self.weights.value).add_row_broadcast(&self.biases.value);
        let activation = self.activation;
        let a = z.map(|x| activation.function(x));
        self.input = input.clone();
        self.pre_activation = z;
        a
    }

    /// Accumulates parameter gradients and returns ∂L/∂input.
    /// `grad_out` is ∂L/∂a for this layer (error in activation space).
    pub fn backward(&mut self, grad_out: &Matrix) -> Matrix {
        let activation = self.activation;
        // δ = error ⊙ σ'(z)
        let delta = grad_out.zip_map(&self.pre_activation, |g, z| g * activation.derivative(z));

        self.weights.accumulate(self.input.transpose().matmul(&delta));
        self.biases.accumulate(delta.sum_rows());

        delta.matmul(&self.weights.value.transpose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn glorot_has_zero_bias_and_bounded_weights() {
        let mut rng = StdRng::seed_from_u64(3);
        let layer = Dense::new(40, 20, ActivationFunction::ReLU, WeightInit::GlorotUniform, &mut rng);
        let limit = (6.0f64 / 60.0).sqrt();
        assert_eq!(layer.weights.value.shape(), (40, 20));
        assert!(layer.weights.value.iter().all(|w| w.abs() <= limit));
        assert!(layer.biases.value.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn torch_default_bounds_biases_too() {
        let mut rng = StdRng::seed_from_u64(3);
        let layer = Dense::new(16, 8, ActivationFunction::ReLU, WeightInit::TorchDefault, &mut rng);
        assert!(layer.biases.value.iter().any(|&b| b != 0.0));
        assert!(layer.biases.value.iter().all(|b| b.abs() <= 0.25));
    }

    #[test]
    fn backward_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut layer = Dense::new(3, 2, ActivationFunction::Tanh, WeightInit::Xavier, &mut rng);
        let x = Matrix::from_data(vec![vec![0.5, -1.0, 0.25], vec![-0.3, 0.8, 1.1]]);

        // L = sum(a), so ∂L/∂a = 1
        let out = layer.forward(&x);
        layer.weights.zero_grad();
        layer.biases.zero_grad();
        layer.backward(&out.map(|_| 1.0));

        let h = 1e-6;
        for i in 0..3 {
            for j in 0..2 {
                let mut plus = layer.clone();
                plus.weights.value.data[i][j] += h;
                let mut minus = layer.clone();
                minus.weights.value.data[i][j] -= h;
                let numeric = (plus.forward(&x).iter().sum::<f64>()
                    - minus.forward(&x).iter().sum::<f64>()) / (2.0 * h);
                assert!((numeric - layer.weights.grad.data[i][j]).abs() < 1e-5);
            }
        }
    }
}
