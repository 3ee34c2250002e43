use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::train::backend::Backend;

/// Per-epoch training statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    pub train_loss: f64,
    /// Mean validation loss, if a validation set was provided.
    pub val_loss: Option<f64>,
    /// Fraction of training samples classified correctly, in [0, 1].
    pub train_accuracy: Option<f64>,
    pub val_accuracy: Option<f64>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Loss history of one training run, in epoch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub name: String,
    /// Legend label (e.g. "Base").
    pub label: String,
    pub backend: Backend,
    pub epochs: Vec<EpochStats>,
}

impl History {
    pub fn new(name: impl Into<String>, label: impl Into<String>, backend: Backend) -> Self {
        History {
            name: name.into(),
            label: label.into(),
            backend,
            epochs: Vec::new(),
        }
    }

    pub fn push(&mut self, stats: EpochStats) {
        self.epochs.push(stats);
    }

    pub fn loss(&self) -> Vec<f64> {
        self.epochs.iter().map(|s| s.train_loss).collect()
    }

    /// Validation losses; empty when the run had no validation set.
    pub fn val_loss(&self) -> Vec<f64> {
        self.epochs.iter().filter_map(|s| s.val_loss).collect()
    }

    pub fn accuracy(&self) -> Vec<f64> {
        self.epochs.iter().filter_map(|s| s.train_accuracy).collect()
    }

    pub fn val_accuracy(&self) -> Vec<f64> {
        self.epochs.iter().filter_map(|s| s.val_accuracy).collect()
    }

    pub fn last(&self) -> Option<&EpochStats> {
        self.epochs.last()
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn total_elapsed_ms(&self) -> u64 {
        self.epochs.iter().map(|s| s.elapsed_ms).sum()
    }
}

/// Writes several histories as one pretty-printed JSON array.
pub fn save_histories(histories: &[History], path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, histories)?;
    Ok(())
}

pub fn load_histories(path: impl AsRef<Path>) -> Result<Vec<History>> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}
