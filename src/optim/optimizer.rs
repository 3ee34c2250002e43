use crate::error::Result;
use crate::network::network::Network;

/// Updates a network's parameters from the gradients accumulated by
/// `Network::backward`.
pub trait Optimizer {
    /// Applies one update using the current gradients.
    fn step(&mut self, network: &mut Network) -> Result<()>;

    /// Clears every accumulated gradient in `network`.
    fn zero_grad(&self, network: &mut Network) {
        network.zero_grad();
    }

    fn learning_rate(&self) -> f64;
}
