//! Inverted dropout.
//!
//! In training mode each unit is zeroed with probability `rate` and the
//! survivors are scaled by `1 / (1 - rate)` so the expected activation is
//! unchanged. In eval mode the layer is the identity.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dropout {
    pub rate: f64,
    #[serde(skip)]
    mask: Option<Matrix>,
    #[serde(skip, default = "fresh_rng")]
    rng: StdRng,
}

fn fresh_rng() -> StdRng {
    StdRng::from_entropy()
}

impl Dropout {
    pub fn new(rate: f64, seed: Option<u64>) -> Result<Dropout> {
        if !(0.0..1.0).contains(&rate) {
            return Err(Error::InvalidConfig(format!(
                "dropout rate must be in [0, 1), got {rate}"
            )));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => fresh_rng(),
        };
        Ok(Dropout { rate, mask: None, rng })
    }

    pub fn forward(&mut self, input: &Matrix, training: bool) -> Matrix {
        if !training || self.rate == 0.0 {
            self.mask = None;
            return input.clone();
        }

        let keep_scale = 1.0 / (1.0 - self.rate);
        let mut mask = Matrix::zeros(input.rows, input.cols);
        for row in &mut mask.data {
            for m in row.iter_mut() {
                *m = if self.rng.gen::<f64>() < self.rate { 0.0 } else { keep_scale };
            }
        }
        let out = input.hadamard(&mask);
        self.mask = Some(mask);
        out
    }

    pub fn backward(&mut self, grad_out: &Matrix) -> Matrix {
        match &self.mask {
            Some(mask) => grad_out.hadamard(mask),
            None => grad_out.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_mode_is_identity() {
        let mut d = Dropout::new(0.5, Some(1)).unwrap();
        let x = Matrix::from_data(vec![vec![1.0, 2.0, 3.0]]);
        assert_eq!(d.forward(&x, false), x);
        assert_eq!(d.backward(&x), x);
    }

    #[test]
    fn training_mode_zeroes_and_rescales() {
        let mut d = Dropout::new(0.3, Some(42)).unwrap();
        let x = Matrix::from_data(vec![vec![1.0; 1000]]);
        let y = d.forward(&x, true);
        let scale = 1.0 / 0.7;
        assert!(y.iter().all(|&v| v == 0.0 || (v - scale).abs() < 1e-12));
        let dropped = y.iter().filter(|&&v| v == 0.0).count();
        assert!((200..400).contains(&dropped), "dropped = {dropped}");

        // Gradient flows only through kept units.
        let g = d.backward(&x);
        assert_eq!(g, y);
    }

    #[test]
    fn rejects_out_of_range_rate() {
        assert!(Dropout::new(1.0, None).is_err());
        assert!(Dropout::new(-0.1, None).is_err());
    }
}
