use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::loss::loss_type::LossType;
use crate::network::metadata::ModelMetadata;

/// Describes one layer in a network specification. The input width of each
/// layer is implied by the previous Dense layer (or the network's `input_dim`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    Dense {
        units: usize,
        activation: ActivationFunction,
    },
    Dropout {
        rate: f64,
    },
}

/// A fully serializable description of a network architecture plus its
/// training loss type and optional metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Used as the model file stem when trained weights are saved.
    pub name: String,
    /// Number of input features.
    pub input_dim: usize,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    /// Loss function to pair with this network during training.
    pub loss: LossType,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl NetworkSpec {
    pub fn new(name: impl Into<String>, input_dim: usize, layers: Vec<LayerSpec>, loss: LossType) -> Self {
        NetworkSpec {
            name: name.into(),
            input_dim,
            layers,
            loss,
            metadata: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.metadata.get_or_insert_with(ModelMetadata::default).label = Some(label.into());
        self
    }

    /// Legend label, falling back to the spec name.
    pub fn label(&self) -> &str {
        self.metadata.as_ref()
            .and_then(|m| m.label.as_deref())
            .unwrap_or(&self.name)
    }

    /// Width of the final Dense layer.
    pub fn output_dim(&self) -> Option<usize> {
        self.layers.iter().rev().find_map(|l| match l {
            LayerSpec::Dense { units, .. } => Some(*units),
            LayerSpec::Dropout { .. } => None,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidConfig("network name must not be empty".into()));
        }
        if self.input_dim == 0 {
            return Err(Error::InvalidConfig(format!("network '{}' has input_dim 0", self.name)));
        }
        match self.layers.last() {
            Some(LayerSpec::Dense { .. }) => {}
            Some(LayerSpec::Dropout { .. }) => {
                return Err(Error::InvalidConfig(format!(
                    "network '{}' must end with a dense layer", self.name
                )))
            }
            None => {
                return Err(Error::InvalidConfig(format!("network '{}' has no layers", self.name)))
            }
        }
        for layer in &self.layers {
            match layer {
                LayerSpec::Dense { units: 0, .. } => {
                    return Err(Error::InvalidConfig(format!(
                        "network '{}' has a dense layer with 0 units", self.name
                    )))
                }
                LayerSpec::Dropout { rate } if !(0.0..1.0).contains(rate) => {
                    return Err(Error::InvalidConfig(format!(
                        "network '{}' has dropout rate {rate} outside [0, 1)", self.name
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
