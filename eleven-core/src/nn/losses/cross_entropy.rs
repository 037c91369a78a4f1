// src/nn/losses/cross_entropy.rs

use crate::error::ElevenError;
use crate::node::Node;
use crate::ops::loss::{log_softmax_op, nll_loss_op};
use crate::tensor::Tensor;

/// Softmax cross-entropy of raw scores against integer class targets,
/// averaged over the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    pub fn new() -> Self {
        CrossEntropyLoss
    }

    /// `scores` is `(batch, classes)`, `target` holds `batch` class indices.
    /// Returns a materialized `[1]` loss node ready for `backward`.
    pub fn forward(&self, scores: &Node, target: &Tensor) -> Result<Node, ElevenError> {
        nll_loss_op(&log_softmax_op(scores)?, target)?.materialize()
    }
}

#[cfg(test)]
#[path = "cross_entropy_test.rs"]
mod tests;
