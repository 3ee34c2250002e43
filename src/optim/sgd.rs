use crate::error::{Error, Result};
use crate::network::network::Network;
use crate::optim::optimizer::Optimizer;

#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, network: &mut Network) -> Result<()> {
        let lr = self.learning_rate;
        let mut params = network.parameters_mut();

        // A freshly loaded network has no gradients until its first backward pass.
        for param in params.iter() {
            if param.grad.shape() != param.value.shape() {
                return Err(Error::shape(
                    format!("{:?}", param.value.shape()),
                    format!("{:?} (grad {:?})", param.value.shape(), param.grad.shape()),
                ));
            }
        }

        for param in params.iter_mut() {
            param.value = param.value.zip_map(&param.grad, |p, g| p - lr * g);
        }
        Ok(())
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}
