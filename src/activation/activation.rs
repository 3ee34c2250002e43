use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    #[serde(rename = "relu")]
    ReLU,
    Identity,
    Tanh,
    #[serde(rename = "leaky_relu")]
    LeakyReLU { alpha: f64 },
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
        }
    }

    /// Derivative evaluated at the pre-activation `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = sigmoid(x);
                fx * (1.0 - fx)
            },
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { *alpha },
        }
    }
}

/// Logistic function, split by sign so large |x| never overflows `exp`.
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        let s = ActivationFunction::Sigmoid;
        assert_eq!(s.function(1000.0), 1.0);
        assert_eq!(s.function(-1000.0), 0.0);
        assert!((s.function(0.0) - 0.5).abs() < 1e-12);
        assert!((s.derivative(0.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn relu_derivative_is_step() {
        let r = ActivationFunction::ReLU;
        assert_eq!(r.function(-2.0), 0.0);
        assert_eq!(r.derivative(-2.0), 0.0);
        assert_eq!(r.derivative(3.0), 1.0);
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let fns = [
            ActivationFunction::Sigmoid,
            ActivationFunction::Tanh,
            ActivationFunction::LeakyReLU { alpha: 0.1 },
            ActivationFunction::Identity,
        ];
        let h = 1e-6;
        for f in fns {
            for &x in &[-1.3, -0.2, 0.4, 2.1] {
                let numeric = (f.function(x + h) - f.function(x - h)) / (2.0 * h);
                assert!((numeric - f.derivative(x)).abs() < 1e-5, "{f:?} at {x}");
            }
        }
    }

    #[test]
    fn serializes_in_snake_case() {
        let json = serde_json::to_string(&ActivationFunction::ReLU).unwrap();
        assert_eq!(json, "\"relu\"");
        let back: ActivationFunction = serde_json::from_str("{\"leaky_relu\":{\"alpha\":0.2}}").unwrap();
        assert_eq!(back, ActivationFunction::LeakyReLU { alpha: 0.2 });
    }
}
