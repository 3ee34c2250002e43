use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::layers::{Dense, Dropout, Layer, Param, WeightInit};
use crate::math::matrix::Matrix;
use crate::network::spec::{LayerSpec, NetworkSpec};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub input_dim: usize,
    pub layers: Vec<Layer>,
    #[serde(skip)]
    training: bool,
}

impl Network {
    /// Builds a freshly initialized network from a validated spec.
    ///
    /// With `seed` set, weights and dropout masks are reproducible.
    pub fn from_spec(spec: &NetworkSpec, init: WeightInit, seed: Option<u64>) -> Result<Network> {
        spec.validate()?;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut width = spec.input_dim;
        let mut layers = Vec::with_capacity(spec.layers.len());
        for layer in &spec.layers {
            match *layer {
                LayerSpec::Dense { units, activation } => {
                    layers.push(Layer::Dense(Dense::new(width, units, activation, init, &mut rng)));
                    width = units;
                }
                LayerSpec::Dropout { rate } => {
                    let dropout_seed = seed.map(|_| rng.gen::<u64>());
                    layers.push(Layer::Dropout(Dropout::new(rate, dropout_seed)?));
                }
            }
        }

        Ok(Network {
            name: spec.name.clone(),
            input_dim: spec.input_dim,
            layers,
            training: false,
        })
    }

    pub fn train(&mut self) {
        self.training = true;
    }

    pub fn eval(&mut self) {
        self.training = false;
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Batch forward pass; each layer caches what it needs for `backward`.
    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        if input.cols != self.input_dim {
            return Err(Error::shape(
                format!("{} input features", self.input_dim),
                format!("{} input features", input.cols),
            ));
        }
        let training = self.training;
        let mut current = input.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current, training);
        }
        Ok(current)
    }

    /// Back-propagates ∂L/∂output through every layer, accumulating gradients.
    pub fn backward(&mut self, grad_output: &Matrix) {
        let mut delta = grad_output.clone();
        for layer in self.layers.iter_mut().rev() {
            delta = layer.backward(&delta);
        }
    }

    /// Eval-mode forward pass that leaves the current mode untouched.
    pub fn predict(&mut self, input: &Matrix) -> Result<Matrix> {
        let was_training = self.training;
        self.training = false;
        let out = self.forward(input);
        self.training = was_training;
        out
    }

    pub fn zero_grad(&mut self) {
        for param in self.parameters_mut() {
            param.zero_grad();
        }
    }

    /// Weights then biases of each dense layer, in layer order.
    pub fn parameters_mut(&mut self) -> Vec<&mut Param> {
        let mut params = Vec::new();
        for layer in &mut self.layers {
            if let Layer::Dense(Dense { weights, biases, .. }) = layer {
                params.push(weights);
                params.push(biases);
            }
        }
        params
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter()
            .map(|layer| match layer {
                Layer::Dense(dense) => dense.weights.len() + dense.biases.len(),
                Layer::Dropout(_) => 0,
            })
            .sum()
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
