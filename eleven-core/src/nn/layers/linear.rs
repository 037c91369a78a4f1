use rand::Rng;

use crate::error::ElevenError;
use crate::nn::init::uniform_;
use crate::nn::module::Module;
use crate::node::Node;
use crate::ops::arithmetic::add_op;
use crate::ops::linalg::bmm_op;
use crate::tensor::{zeros, Tensor};

/// Applies an affine map to each row of a `(batch, in)` input:
/// `y = W x + b`.
///
/// The weight is stored as `(1, out, in)` and the bias as `(1, out, 1)` so
/// that a single batched product serves the whole batch.
#[derive(Debug)]
pub struct Linear {
    weight: Tensor,
    bias: Tensor,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Creates a layer initialized from the thread-local RNG.
    pub fn new(in_features: usize, out_features: usize) -> Result<Self, ElevenError> {
        Linear::new_with_rng(in_features, out_features, &mut rand::thread_rng())
    }

    /// Creates a layer whose weight and bias are drawn from
    /// `U(-1/sqrt(in), 1/sqrt(in))`.
    pub fn new_with_rng<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        rng: &mut R,
    ) -> Result<Self, ElevenError> {
        if in_features == 0 || out_features == 0 {
            return Err(ElevenError::InvalidArgument(format!(
                "Linear needs positive feature counts, got {} -> {}",
                in_features, out_features
            )));
        }
        let bound = 1.0 / (in_features as f32).sqrt();
        let weight = zeros(&[1, out_features, in_features])?;
        let bias = zeros(&[1, out_features, 1])?;
        uniform_(&weight, -bound, bound, rng)?;
        uniform_(&bias, -bound, bound, rng)?;
        weight.set_requires_grad(true)?;
        bias.set_requires_grad(true)?;
        Ok(Linear {
            weight,
            bias,
            in_features,
            out_features,
        })
    }

    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for Linear {
    /// `(batch, in) -> (batch, out)`.
    fn forward(&self, input: &Node) -> Result<Node, ElevenError> {
        let shape = input.shape();
        if shape.len() != 2 || shape[1] != self.in_features {
            return Err(ElevenError::ShapeMismatch {
                expected: vec![shape.first().copied().unwrap_or(0), self.in_features],
                actual: shape,
                operation: "Linear::forward".to_string(),
            });
        }
        let columns = input.to_tensor_node()?.unsqueeze(2)?;
        let product = bmm_op(&self.weight.node(), &columns)?;
        let out = add_op(&product, &self.bias.node())?.materialize()?;
        out.squeeze_dim(2)
    }

    fn parameters(&self) -> Vec<(String, Tensor)> {
        vec![
            ("weight".to_string(), self.weight.clone()),
            ("bias".to_string(), self.bias.clone()),
        ]
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
