use crate::error::ElevenError;
use crate::nn::module::Module;
use crate::node::Node;

/// Collapses every dimension after the batch dimension:
/// `(b, d1, .., dn) -> (b, d1·..·dn)`.
///
/// Non-contiguous inputs are materialized first so the reshape stays a view.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flatten;

impl Module for Flatten {
    fn forward(&self, input: &Node) -> Result<Node, ElevenError> {
        let shape = input.shape();
        let Some((&batch, rest)) = shape.split_first() else {
            return Err(ElevenError::InvalidArgument(
                "Flatten needs at least one dimension".to_string(),
            ));
        };
        let features: usize = rest.iter().product();
        let mut source = input.to_tensor_node()?;
        if !source.tensor()?.is_contiguous() {
            source = source.materialize()?;
        }
        source.view(&[batch, features])
    }
}

#[cfg(test)]
#[path = "flatten_test.rs"]
mod tests;
