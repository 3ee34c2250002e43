use crate::math::matrix::Matrix;

pub struct MseLoss;

impl MseLoss {
    /// Batch-mean MSE: mean((predicted - expected)²)
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> f64 {
        let n = (predicted.rows * predicted.cols) as f64;
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>() / n
    }

    /// Per-element gradient: 2·(predicted - expected) / n
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Matrix {
        let n = (predicted.rows * predicted.cols) as f64;
        predicted.zip_map(expected, |a, b| 2.0 * (a - b) / n)
    }
}
