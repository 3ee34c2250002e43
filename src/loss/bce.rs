use crate::math::matrix::Matrix;

/// Binary cross-entropy over sigmoid probabilities.
pub struct BceLoss;

/// Predictions are clipped to [EPS, 1 - EPS] before taking logs.
const EPS: f64 = 1e-7;

impl BceLoss {
    /// Batch-mean BCE: -mean(y·ln(p) + (1-y)·ln(1-p))
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> f64 {
        let n = (predicted.rows * predicted.cols) as f64;
        predicted.iter().zip(expected.iter())
            .map(|(&p, &y)| {
                let p = p.clamp(EPS, 1.0 - EPS);
                -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
            })
            .sum::<f64>() / n
    }

    /// ∂L/∂p per element: (p - y) / (p·(1 - p)) / n
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Matrix {
        let n = (predicted.rows * predicted.cols) as f64;
        predicted.zip_map(expected, |p, y| {
            let p = p.clamp(EPS, 1.0 - EPS);
            (p - y) / (p * (1.0 - p)) / n
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confident_correct_predictions_have_low_loss() {
        let y = Matrix::column(&[1.0, 0.0]);
        let good = Matrix::column(&[0.99, 0.01]);
        let bad = Matrix::column(&[0.01, 0.99]);
        assert!(BceLoss::loss(&good, &y) < 0.02);
        assert!(BceLoss::loss(&bad, &y) > 4.0);
    }

    #[test]
    fn half_probability_costs_ln_two() {
        let y = Matrix::column(&[1.0, 0.0, 1.0]);
        let p = Matrix::column(&[0.5, 0.5, 0.5]);
        assert!((BceLoss::loss(&p, &y) - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn clipping_keeps_loss_finite() {
        let y = Matrix::column(&[1.0]);
        let p = Matrix::column(&[0.0]);
        let loss = BceLoss::loss(&p, &y);
        assert!(loss.is_finite());
        assert!(BceLoss::derivative(&p, &y).iter().all(|g| g.is_finite()));
    }

    #[test]
    fn derivative_through_sigmoid_is_p_minus_y() {
        // dL/dz = dL/dp · p(1-p) = (p - y) / n
        let y = Matrix::column(&[1.0, 0.0]);
        let p = Matrix::column(&[0.7, 0.2]);
        let grad = BceLoss::derivative(&p, &y);
        let dz: Vec<f64> = grad.iter().zip(p.iter()).map(|(g, p)| g * p * (1.0 - p)).collect();
        assert!((dz[0] - (-0.3 / 2.0)).abs() < 1e-12);
        assert!((dz[1] - (0.2 / 2.0)).abs() < 1e-12);
    }
}
