pub mod adam;
pub mod config;
pub mod optimizer;
pub mod sgd;

pub use adam::Adam;
pub use config::OptimizerConfig;
pub use optimizer::Optimizer;
pub use sgd::Sgd;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::layers::WeightInit;
    use crate::loss::loss_type::LossType;
    use crate::math::matrix::Matrix;
    use crate::network::{LayerSpec, Network, NetworkSpec};
    use crate::train::Backend;

    fn tiny_network() -> Network {
        let spec = NetworkSpec::new(
            "tiny",
            2,
            vec![
                LayerSpec::Dense { units: 4, activation: ActivationFunction::Tanh },
                LayerSpec::Dense { units: 1, activation: ActivationFunction::Sigmoid },
            ],
            LossType::BinaryCrossEntropy,
        );
        Network::from_spec(&spec, WeightInit::GlorotUniform, Some(17)).unwrap()
    }

    fn batch_loss(net: &mut Network, x: &Matrix, y: &Matrix) -> f64 {
        let p = net.forward(x).unwrap();
        LossType::BinaryCrossEntropy.loss(&p, y)
    }

    fn run_steps(opt: &mut dyn Optimizer, steps: usize) -> (f64, f64) {
        let mut net = tiny_network();
        net.train();
        let x = Matrix::from_data(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]]);
        let y = Matrix::column(&[0.0, 1.0, 1.0, 1.0]);
        let before = batch_loss(&mut net, &x, &y);
        for _ in 0..steps {
            opt.zero_grad(&mut net);
            let p = net.forward(&x).unwrap();
            net.backward(&LossType::BinaryCrossEntropy.derivative(&p, &y));
            opt.step(&mut net).unwrap();
        }
        (before, batch_loss(&mut net, &x, &y))
    }

    #[test]
    fn sgd_reduces_loss() {
        let (before, after) = run_steps(&mut Sgd::new(0.5), 200);
        assert!(after < before, "{after} >= {before}");
    }

    #[test]
    fn adam_reduces_loss() {
        let mut adam = Adam::new(0.05, 1e-8);
        let (before, after) = run_steps(&mut adam, 200);
        assert!(after < before * 0.5, "{after} vs {before}");
        assert_eq!(adam.steps(), 200);
    }

    #[test]
    fn adam_first_step_moves_each_weight_by_about_lr() {
        let mut net = tiny_network();
        let before: Vec<f64> = net.parameters_mut()[0].value.iter().copied().collect();
        for p in net.parameters_mut() {
            p.grad = p.value.map(|_| 0.3);
        }
        let mut adam = Adam::new(0.01, 1e-8);
        adam.step(&mut net).unwrap();
        let after: Vec<f64> = net.parameters_mut()[0].value.iter().copied().collect();
        for (b, a) in before.iter().zip(after.iter()) {
            assert!(((b - a) - 0.01).abs() < 1e-6);
        }
    }

    #[test]
    fn adam_rejects_changed_parameter_layout() {
        let mut adam = Adam::new(0.01, 1e-7);
        let mut net = tiny_network();
        net.zero_grad();
        adam.step(&mut net).unwrap();

        let spec = NetworkSpec::new(
            "other",
            3,
            vec![LayerSpec::Dense { units: 1, activation: ActivationFunction::Sigmoid }],
            LossType::BinaryCrossEntropy,
        );
        let mut other = Network::from_spec(&spec, WeightInit::GlorotUniform, Some(1)).unwrap();
        other.zero_grad();
        assert!(adam.step(&mut other).is_err());
    }

    #[test]
    fn config_builds_with_default_epsilon() {
        let cfg: OptimizerConfig =
            serde_json::from_str(r#"{"type":"adam","learning_rate":0.0001}"#).unwrap();
        assert_eq!(cfg, OptimizerConfig::adam(1e-4));
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.build(Backend::Fit).learning_rate(), 1e-4);
        assert_eq!(cfg.build(Backend::Manual).learning_rate(), 1e-4);
        assert!(OptimizerConfig::Sgd { learning_rate: -1.0 }.validate().is_err());
    }

    fn reloaded_network() -> Network {
        let json = serde_json::to_string(&tiny_network()).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn sgd_errors_instead_of_panicking_on_missing_gradients() {
        let mut loaded = reloaded_network();
        let before = loaded.parameters_mut()[0].value.clone();

        let err = Sgd::new(0.1).step(&mut loaded).unwrap_err();
        assert!(matches!(err, crate::error::Error::ShapeMismatch { .. }), "{err}");
        assert_eq!(loaded.parameters_mut()[0].value, before);

        loaded.zero_grad();
        assert!(Sgd::new(0.1).step(&mut loaded).is_ok());
    }

    #[test]
    fn adam_errors_on_missing_gradients_too() {
        let mut loaded = reloaded_network();
        assert!(Adam::new(0.01, 1e-7).step(&mut loaded).is_err());
    }
}
