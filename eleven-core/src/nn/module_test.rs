use super::{prefixed, Module};
use crate::error::ElevenError;
use crate::node::Node;
use crate::tensor::{zeros, Tensor};

#[derive(Debug)]
struct MockModule {
    param: Tensor,
}

impl Module for MockModule {
    fn forward(&self, input: &Node) -> Result<Node, ElevenError> {
        Ok(input.clone())
    }

    fn parameters(&self) -> Vec<(String, Tensor)> {
        vec![("param".to_string(), self.param.clone())]
    }
}

#[derive(Debug)]
struct Identity;

impl Module for Identity {
    fn forward(&self, input: &Node) -> Result<Node, ElevenError> {
        Ok(input.clone())
    }
}

#[test]
fn test_module_parameters_retrieval() -> Result<(), ElevenError> {
    let module = MockModule { param: zeros(&[1])? };
    let params = prefixed("block", module.parameters());
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].0, "block.param");
    assert!(params[0].1.shares_storage(&module.param));
    assert!(Identity.parameters().is_empty());
    Ok(())
}

#[test]
fn test_module_forward_passes_node() -> Result<(), ElevenError> {
    let module = MockModule { param: zeros(&[1])? };
    let input = zeros(&[2, 2])?.node();
    assert_eq!(module.forward(&input)?.shape(), vec![2, 2]);
    Ok(())
}
