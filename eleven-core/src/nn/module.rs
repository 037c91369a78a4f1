use std::fmt::Debug;

use crate::error::ElevenError;
use crate::node::Node;
use crate::tensor::Tensor;

/// The base trait for all neural network modules (layers and models).
pub trait Module: Debug {
    /// Performs a forward pass of the module, recording it in the graph.
    fn forward(&self, input: &Node) -> Result<Node, ElevenError>;

    /// All learnable parameters with hierarchical names such as
    /// `"fc1.weight"`. Parameter-free modules return an empty vector.
    fn parameters(&self) -> Vec<(String, Tensor)> {
        Vec::new()
    }
}

/// Prefixes each parameter name of a child module with `prefix.`.
pub fn prefixed(prefix: &str, params: Vec<(String, Tensor)>) -> Vec<(String, Tensor)> {
    params
        .into_iter()
        .map(|(name, tensor)| (format!("{}.{}", prefix, name), tensor))
        .collect()
}

#[cfg(test)]
#[path = "module_test.rs"]
mod tests;
