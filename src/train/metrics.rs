use serde::{Serialize, Deserialize};

use crate::data::{dataset::Dataset, loader::DataLoader};
use crate::error::{Error, Result};
use crate::loss::loss_type::LossType;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Loss and accuracy of a model over one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub loss: f64,
    pub accuracy: f64,
}

/// Number of rows whose prediction matches the target.
///
/// Single-output models threshold at 0.5; wider outputs compare argmax.
pub fn count_correct(predicted: &Matrix, targets: &Matrix) -> usize {
    predicted.data.iter().zip(targets.data.iter())
        .filter(|(p, t)| {
            if p.len() == 1 {
                (p[0] >= 0.5) == (t[0] >= 0.5)
            } else {
                argmax(p) == argmax(t)
            }
        })
        .count()
}

/// Eval-mode loss and accuracy, averaged over samples.
pub fn evaluate(network: &mut Network, loss: LossType, dataset: &Dataset, batch_size: usize) -> Result<Metrics> {
    if dataset.is_empty() {
        return Err(Error::EmptyDataset);
    }
    let mut loader = DataLoader::new(dataset, batch_size, false, None)?;
    let mut total_loss = 0.0;
    let mut correct = 0;
    for batch in loader.iter() {
        let predicted = network.predict(&batch.inputs)?;
        total_loss += loss.loss(&predicted, &batch.targets) * batch.len() as f64;
        correct += count_correct(&predicted, &batch.targets);
    }
    let n = dataset.len() as f64;
    Ok(Metrics {
        loss: total_loss / n,
        accuracy: correct as f64 / n,
    })
}

/// Index of the maximum element in a slice.
fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
