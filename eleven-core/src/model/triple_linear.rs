use rand::Rng;

use crate::error::ElevenError;
use crate::model::sequential::Sequential;
use crate::nn::{Flatten, Linear, Module, ReLU};
use crate::node::Node;
use crate::tensor::Tensor;

/// Input pixels of one MNIST image.
pub const INPUT_FEATURES: usize = 28 * 28;
const HIDDEN_FEATURES: usize = 512;
/// Digit classes.
pub const CLASSES: usize = 10;

/// Three-layer perceptron for 28x28 digits:
/// `784 -> 512 -> relu -> 512 -> relu -> 10`.
///
/// Accepts `(b, 784)` or any `(b, ..)` input holding 784 values per sample.
#[derive(Debug)]
pub struct TripleLinear {
    layers: Sequential,
}

impl TripleLinear {
    pub fn new() -> Result<Self, ElevenError> {
        TripleLinear::new_with_rng(&mut rand::thread_rng())
    }

    pub fn new_with_rng<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, ElevenError> {
        let layers = Sequential::new()
            .with("flatten", Flatten)?
            .with("fc1", Linear::new_with_rng(INPUT_FEATURES, HIDDEN_FEATURES, rng)?)?
            .with("relu1", ReLU)?
            .with("fc2", Linear::new_with_rng(HIDDEN_FEATURES, HIDDEN_FEATURES, rng)?)?
            .with("relu2", ReLU)?
            .with("fc3", Linear::new_with_rng(HIDDEN_FEATURES, CLASSES, rng)?)?;
        Ok(TripleLinear { layers })
    }
}

impl Module for TripleLinear {
    fn forward(&self, input: &Node) -> Result<Node, ElevenError> {
        self.layers.forward(input)
    }

    fn parameters(&self) -> Vec<(String, Tensor)> {
        self.layers.parameters()
    }
}

#[cfg(test)]
#[path = "triple_linear_test.rs"]
mod tests;
