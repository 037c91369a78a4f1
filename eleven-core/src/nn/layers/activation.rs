use crate::error::ElevenError;
use crate::nn::module::Module;
use crate::node::Node;
use crate::ops::activation::{relu_op, sigmoid_op};

/// Rectified linear unit as a layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReLU;

impl Module for ReLU {
    fn forward(&self, input: &Node) -> Result<Node, ElevenError> {
        relu_op(input)?.materialize()
    }
}

/// Logistic sigmoid as a layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl Module for Sigmoid {
    fn forward(&self, input: &Node) -> Result<Node, ElevenError> {
        sigmoid_op(input)?.materialize()
    }
}

#[cfg(test)]
#[path = "activation_test.rs"]
mod tests;
