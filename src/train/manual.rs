use std::time::Instant;

use log::info;

use crate::data::loader::DataLoader;
use crate::error::{Error, Result};
use crate::loss::loss_type::LossType;
use crate::network::network::Network;
use crate::optim::optimizer::Optimizer;
use crate::train::backend::Backend;
use crate::train::epoch_stats::{EpochStats, History};
use crate::train::metrics::count_correct;

/// Runs the explicit training loop for `epochs` epochs.
///
/// Every batch goes through zero_grad, forward, loss, backward and step.
/// Epoch losses are the mean of the per-batch mean losses, so a short final
/// batch counts as much as a full one. Validation runs in eval mode without
/// touching gradients.
pub fn train_manual(
    network: &mut Network,
    optimizer: &mut dyn Optimizer,
    criterion: LossType,
    train_loader: &mut DataLoader<'_>,
    val_loader: &mut DataLoader<'_>,
    epochs: usize,
    label: &str,
) -> Result<History> {
    if train_loader.is_empty() || val_loader.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let mut history = History::new(&network.name, label, Backend::Manual);

    for epoch in 1..=epochs {
        let t_start = Instant::now();

        network.train();
        let mut train_loss = 0.0;
        let mut train_correct = 0;
        for batch in train_loader.iter() {
            optimizer.zero_grad(network);
            let y_pred = network.forward(&batch.inputs)?;
            let loss = criterion.loss(&y_pred, &batch.targets);
            network.backward(&criterion.derivative(&y_pred, &batch.targets));
            optimizer.step(network)?;

            train_loss += loss;
            train_correct += count_correct(&y_pred, &batch.targets);
        }
        let train_loss = train_loss / train_loader.len() as f64;

        network.eval();
        let mut val_loss = 0.0;
        let mut val_correct = 0;
        for batch in val_loader.iter() {
            let y_pred = network.forward(&batch.inputs)?;
            val_loss += criterion.loss(&y_pred, &batch.targets);
            val_correct += count_correct(&y_pred, &batch.targets);
        }
        let val_loss = val_loss / val_loader.len() as f64;

        info!(
            "Epoch {}/{}, train loss: {:.4}, val loss: {:.4}",
            epoch, epochs, train_loss, val_loss
        );

        history.push(EpochStats {
            epoch,
            total_epochs: epochs,
            train_loss,
            val_loss: Some(val_loss),
            train_accuracy: Some(train_correct as f64 / train_loader.dataset().len() as f64),
            val_accuracy: Some(val_correct as f64 / val_loader.dataset().len() as f64),
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        });
    }

    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::data::split::train_test_split;
    use crate::data::synthetic::{make_classification, ClassificationConfig};
    use crate::network::spec::{LayerSpec, NetworkSpec};
    use crate::optim::adam::Adam;
    use crate::optim::sgd::Sgd;

    #[test]
    fn manual_loop_learns_and_averages_per_batch() {
        let ds = make_classification(&ClassificationConfig {
            n_samples: 300,
            n_features: 6,
            n_informative: 3,
            n_redundant: 1,
            seed: Some(2022),
            ..ClassificationConfig::default()
        })
        .unwrap();
        let (train, val) = train_test_split(&ds, 0.25, Some(42)).unwrap();

        let spec = NetworkSpec::new(
            "base_manual",
            6,
            vec![
                LayerSpec::Dense { units: 12, activation: ActivationFunction::ReLU },
                LayerSpec::Dense { units: 1, activation: ActivationFunction::Sigmoid },
            ],
            LossType::BinaryCrossEntropy,
        );
        let mut network = Network::from_spec(&spec, Backend::Manual.weight_init(), Some(4)).unwrap();
        let mut optimizer = Adam::new(0.01, Backend::Manual.default_adam_epsilon());
        let mut train_loader = DataLoader::new(&train, 64, true, Some(1)).unwrap();
        let mut val_loader = DataLoader::new(&val, 64, false, None).unwrap();

        let history = train_manual(
            &mut network,
            &mut optimizer,
            LossType::BinaryCrossEntropy,
            &mut train_loader,
            &mut val_loader,
            12,
            "Base",
        )
        .unwrap();

        assert_eq!(history.len(), 12);
        assert_eq!(history.label, "Base");
        let loss = history.loss();
        assert!(loss[11] < loss[0], "{loss:?}");

        // Recompute the last validation loss as a mean of batch means.
        let mut check = DataLoader::new(&val, 64, false, None).unwrap();
        let batch_losses: Vec<f64> = check.iter()
            .map(|b| LossType::BinaryCrossEntropy.loss(&network.predict(&b.inputs).unwrap(), &b.targets))
            .collect();
        let expected = batch_losses.iter().sum::<f64>() / batch_losses.len() as f64;
        assert!((history.last().unwrap().val_loss.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn train_loss_is_mean_of_batch_means() {
        // 70 rows in batches of 32, 32 and 6.
        let ds = make_classification(&ClassificationConfig {
            n_samples: 70,
            n_features: 6,
            n_informative: 3,
            n_redundant: 1,
            seed: Some(5),
            ..ClassificationConfig::default()
        })
        .unwrap();
        let spec = NetworkSpec::new(
            "frozen",
            6,
            vec![
                LayerSpec::Dense { units: 5, activation: ActivationFunction::Tanh },
                LayerSpec::Dense { units: 1, activation: ActivationFunction::Sigmoid },
            ],
            LossType::BinaryCrossEntropy,
        );
        let mut network = Network::from_spec(&spec, Backend::Manual.weight_init(), Some(8)).unwrap();
        // A zero learning rate keeps the weights fixed through the epoch.
        let mut optimizer = Sgd::new(0.0);
        let mut train_loader = DataLoader::new(&ds, 32, false, None).unwrap();
        let mut val_loader = DataLoader::new(&ds, 32, false, None).unwrap();

        let history = train_manual(
            &mut network,
            &mut optimizer,
            LossType::BinaryCrossEntropy,
            &mut train_loader,
            &mut val_loader,
            1,
            "Frozen",
        )
        .unwrap();

        let mut check = DataLoader::new(&ds, 32, false, None).unwrap();
        let batches: Vec<(f64, usize)> = check.iter()
            .map(|b| (LossType::BinaryCrossEntropy.loss(&network.predict(&b.inputs).unwrap(), &b.targets), b.len()))
            .collect();
        assert_eq!(batches.iter().map(|&(_, n)| n).collect::<Vec<_>>(), vec![32, 32, 6]);

        let mean_of_means = batches.iter().map(|&(l, _)| l).sum::<f64>() / 3.0;
        let weighted = batches.iter().map(|&(l, n)| l * n as f64).sum::<f64>() / 70.0;
        let stats = history.last().unwrap();
        assert!((stats.train_loss - mean_of_means).abs() < 1e-12);
        assert!((stats.val_loss.unwrap() - mean_of_means).abs() < 1e-12);
        assert!((weighted - mean_of_means).abs() > 1e-6);
    }
}
