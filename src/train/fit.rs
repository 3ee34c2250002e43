use std::time::Instant;

use log::debug;

use crate::data::{dataset::Dataset, loader::DataLoader};
use crate::error::{Error, Result};
use crate::network::{network::Network, spec::NetworkSpec};
use crate::optim::{config::OptimizerConfig, optimizer::Optimizer};
use crate::train::backend::Backend;
use crate::train::epoch_stats::{EpochStats, History};
use crate::train::metrics::{count_correct, evaluate, Metrics};

/// Hyperparameters for `Sequential::fit`.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub shuffle: bool,
    /// Seeds the per-epoch shuffle.
    pub seed: Option<u64>,
}

impl FitConfig {
    pub fn new(epochs: usize) -> Self {
        FitConfig {
            epochs,
            batch_size: Backend::Fit.default_batch_size(),
            shuffle: true,
            seed: None,
        }
    }
}

/// A network behind a compile-then-fit API.
///
/// Weights start Glorot-uniform with zero biases; `compile` attaches an
/// optimizer and `fit` runs whole epochs and returns their `History`.
pub struct Sequential {
    spec: NetworkSpec,
    network: Network,
    optimizer: Option<Box<dyn Optimizer>>,
}

impl Sequential {
    pub fn new(spec: NetworkSpec, seed: Option<u64>) -> Result<Sequential> {
        let network = Network::from_spec(&spec, Backend::Fit.weight_init(), seed)?;
        Ok(Sequential { spec, network, optimizer: None })
    }

    pub fn compile(&mut self, optimizer: &OptimizerConfig) -> Result<()> {
        optimizer.validate()?;
        self.optimizer = Some(optimizer.build(Backend::Fit));
        Ok(())
    }

    pub fn is_compiled(&self) -> bool {
        self.optimizer.is_some()
    }

    pub fn spec(&self) -> &NetworkSpec {
        &self.spec
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    /// Trains for `config.epochs` epochs.
    ///
    /// The epoch loss is the sample-weighted mean of the mini-batch losses
    /// seen during the epoch, and training accuracy uses those same
    /// (dropout-active) predictions. Validation runs in eval mode after
    /// each epoch.
    pub fn fit(&mut self, train: &Dataset, config: &FitConfig, validation: Option<&Dataset>) -> Result<History> {
        let optimizer = self.optimizer.as_mut().ok_or(Error::NotCompiled)?;
        if train.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let loss_type = self.spec.loss;
        let mut loader = DataLoader::new(train, config.batch_size, config.shuffle, config.seed)?;
        let mut history = History::new(&self.spec.name, self.spec.label(), Backend::Fit);

        for epoch in 1..=config.epochs {
            let t_start = Instant::now();
            self.network.train();

            let mut weighted_loss = 0.0;
            let mut correct = 0;
            for batch in loader.iter() {
                optimizer.zero_grad(&mut self.network);
                let predicted = self.network.forward(&batch.inputs)?;

                weighted_loss += loss_type.loss(&predicted, &batch.targets) * batch.len() as f64;
                correct += count_correct(&predicted, &batch.targets);

                self.network.backward(&loss_type.derivative(&predicted, &batch.targets));
                optimizer.step(&mut self.network)?;
            }

            let n = train.len() as f64;
            let train_loss = weighted_loss / n;
            let train_accuracy = correct as f64 / n;

            let val = match validation {
                Some(val_set) => Some(evaluate(&mut self.network, loss_type, val_set, config.batch_size)?),
                None => None,
            };
            self.network.eval();

            let stats = EpochStats {
                epoch,
                total_epochs: config.epochs,
                train_loss,
                val_loss: val.map(|m| m.loss),
                train_accuracy: Some(train_accuracy),
                val_accuracy: val.map(|m| m.accuracy),
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            };
            debug!(
                "[{}] epoch {}/{} loss={:.4} accuracy={:.4} val_loss={}",
                self.spec.name,
                epoch,
                config.epochs,
                stats.train_loss,
                train_accuracy,
                stats.val_loss.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".into()),
            );
            history.push(stats);
        }

        Ok(history)
    }

    pub fn evaluate(&mut self, dataset: &Dataset) -> Result<Metrics> {
        evaluate(&mut self.network, self.spec.loss, dataset, Backend::Fit.default_batch_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::data::synthetic::{make_classification, ClassificationConfig};
    use crate::loss::loss_type::LossType;
    use crate::network::spec::LayerSpec;
    use crate::optim::sgd::Sgd;

    fn data() -> Dataset {
        make_classification(&ClassificationConfig {
            n_samples: 400,
            n_features: 8,
            n_informative: 4,
            seed: Some(2022),
            ..ClassificationConfig::default()
        })
        .unwrap()
    }

    fn spec() -> NetworkSpec {
        NetworkSpec::new(
            "base_fit",
            8,
            vec![
                LayerSpec::Dense { units: 16, activation: ActivationFunction::ReLU },
                LayerSpec::Dense { units: 1, activation: ActivationFunction::Sigmoid },
            ],
            LossType::BinaryCrossEntropy,
        )
    }

    #[test]
    fn fit_requires_compile() {
        let mut model = Sequential::new(spec(), Some(1)).unwrap();
        let err = model.fit(&data(), &FitConfig::new(1), None).unwrap_err();
        assert!(matches!(err, Error::NotCompiled));
    }

    #[test]
    fn fit_records_every_epoch_and_learns() {
        let ds = data();
        let mut model = Sequential::new(spec(), Some(1)).unwrap();
        model.compile(&OptimizerConfig::adam(0.01)).unwrap();
        let config = FitConfig { seed: Some(3), ..FitConfig::new(15) };
        let history = model.fit(&ds, &config, Some(&ds)).unwrap();

        assert_eq!(history.len(), 15);
        assert_eq!(history.val_loss().len(), 15);
        assert_eq!(history.backend, Backend::Fit);
        let loss = history.loss();
        assert!(loss[14] < loss[0], "{loss:?}");
        assert!(history.last().unwrap().train_accuracy.unwrap() > 0.7);

        let metrics = model.evaluate(&ds).unwrap();
        assert!((metrics.loss - history.last().unwrap().val_loss.unwrap()).abs() < 1e-9);
    }

    #[test]
    fn fit_without_validation_leaves_val_empty() {
        let mut model = Sequential::new(spec(), Some(1)).unwrap();
        model.compile(&OptimizerConfig::Sgd { learning_rate: 0.1 }).unwrap();
        let history = model.fit(&data(), &FitConfig::new(2), None).unwrap();
        assert!(history.val_loss().is_empty());
        assert!(history.epochs.iter().all(|s| s.val_accuracy.is_none()));
    }

    #[test]
    fn epoch_loss_weights_batches_by_sample_count() {
        // 70 rows in batches of 32, 32 and 6.
        let ds = make_classification(&ClassificationConfig {
            n_samples: 70,
            n_features: 8,
            n_informative: 4,
            seed: Some(5),
            ..ClassificationConfig::default()
        })
        .unwrap();
        let mut model = Sequential::new(spec(), Some(2)).unwrap();
        // A zero learning rate keeps the weights fixed through the epoch.
        model.optimizer = Some(Box::new(Sgd::new(0.0)));
        let config = FitConfig { batch_size: 32, shuffle: false, ..FitConfig::new(1) };
        let history = model.fit(&ds, &config, None).unwrap();

        let mut loader = DataLoader::new(&ds, 32, false, None).unwrap();
        let batches: Vec<(f64, usize)> = loader.iter()
            .map(|b| (LossType::BinaryCrossEntropy.loss(&model.network.predict(&b.inputs).unwrap(), &b.targets), b.len()))
            .collect();
        assert_eq!(batches.iter().map(|&(_, n)| n).collect::<Vec<_>>(), vec![32, 32, 6]);

        let weighted = batches.iter().map(|&(l, n)| l * n as f64).sum::<f64>() / 70.0;
        let mean_of_means = batches.iter().map(|&(l, _)| l).sum::<f64>() / 3.0;
        assert!((history.loss()[0] - weighted).abs() < 1e-12);
        assert!((weighted - mean_of_means).abs() > 1e-6);
    }
}
