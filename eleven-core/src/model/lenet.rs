use rand::Rng;

use crate::error::ElevenError;
use crate::model::sequential::Sequential;
use crate::nn::{Conv2d, Conv2dOptions, Flatten, Linear, MaxPool2d, Module, ReLU};
use crate::node::Node;
use crate::tensor::Tensor;

/// Flattened width of the feature extractor's output for a 28x28 input:
/// 6 channels of 4x4.
const FEATURES: usize = 6 * 4 * 4;
const IMAGE_SHAPE: [usize; 3] = [1, 28, 28];

/// A small LeNet for `(b, 1, 28, 28)` digits.
///
/// ```text
/// conv 1->3 k5, relu, pool 2   (b, 3, 12, 12)
/// conv 3->6 k5, relu, pool 2   (b, 6, 4, 4)
/// flatten                      (b, 96)
/// fc 96->64, relu, fc 64->64, relu, fc 64->10
/// ```
#[derive(Debug)]
pub struct LeNet {
    features: Sequential,
    classifier: Sequential,
}

impl LeNet {
    pub fn new() -> Result<Self, ElevenError> {
        LeNet::new_with_rng(&mut rand::thread_rng())
    }

    pub fn new_with_rng<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, ElevenError> {
        let options = Conv2dOptions::default();
        let features = Sequential::new()
            .with("conv1", Conv2d::new_with_rng(1, 3, 5, options, rng)?)?
            .with("relu1", ReLU)?
            .with("pool1", MaxPool2d::new(2))?
            .with("conv2", Conv2d::new_with_rng(3, 6, 5, options, rng)?)?
            .with("relu2", ReLU)?
            .with("pool2", MaxPool2d::new(2))?;
        let classifier = Sequential::new()
            .with("flatten", Flatten)?
            .with("fc1", Linear::new_with_rng(FEATURES, 64, rng)?)?
            .with("relu3", ReLU)?
            .with("fc2", Linear::new_with_rng(64, 64, rng)?)?
            .with("relu4", ReLU)?
            .with("fc3", Linear::new_with_rng(64, 10, rng)?)?;
        Ok(LeNet { features, classifier })
    }
}

impl Module for LeNet {
    fn forward(&self, input: &Node) -> Result<Node, ElevenError> {
        let shape = input.shape();
        if shape.len() != 4 || shape[1..] != IMAGE_SHAPE[..] {
            return Err(ElevenError::ShapeMismatch {
                expected: vec![shape.first().copied().unwrap_or(0), 1, 28, 28],
                actual: shape,
                operation: "LeNet::forward".to_string(),
            });
        }
        let features = self.features.forward(input)?;
        self.classifier.forward(&features)
    }

    fn parameters(&self) -> Vec<(String, Tensor)> {
        let mut params = self.features.parameters();
        params.extend(self.classifier.parameters());
        params
    }
}

#[cfg(test)]
#[path = "lenet_test.rs"]
mod tests;
