use crate::error::ElevenError;
use crate::nn::module::Module;
use crate::node::Node;
use crate::ops::pooling::max_pool2d_op;

/// Non-overlapping square max pooling.
#[derive(Debug, Clone, Copy)]
pub struct MaxPool2d {
    kernel: usize,
}

impl MaxPool2d {
    pub fn new(kernel: usize) -> Self {
        MaxPool2d { kernel }
    }
}

impl Module for MaxPool2d {
    fn forward(&self, input: &Node) -> Result<Node, ElevenError> {
        max_pool2d_op(input, (self.kernel, self.kernel))?.materialize()
    }
}
