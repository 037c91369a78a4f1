use crate::error::ElevenError;
use crate::nn::module::{prefixed, Module};
use crate::node::Node;
use crate::tensor::Tensor;

/// A chain of named modules applied in insertion order.
#[derive(Debug, Default)]
pub struct Sequential {
    modules: Vec<(String, Box<dyn Module>)>,
}

impl Sequential {
    pub fn new() -> Self {
        Sequential { modules: Vec::new() }
    }

    /// Appends `module`; its parameters are reported as `name.<param>`.
    ///
    /// # Errors
    /// `InvalidArgument` if `name` is already taken.
    pub fn add_module(&mut self, name: &str, module: Box<dyn Module>) -> Result<(), ElevenError> {
        if self.modules.iter().any(|(existing, _)| existing == name) {
            return Err(ElevenError::InvalidArgument(format!(
                "Sequential already has a module named '{}'",
                name
            )));
        }
        self.modules.push((name.to_string(), module));
        Ok(())
    }

    /// Builder form of [`add_module`](Self::add_module).
    pub fn with(mut self, name: &str, module: impl Module + 'static) -> Result<Self, ElevenError> {
        self.add_module(name, Box::new(module))?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|(name, _)| name.as_str())
    }
}

impl Module for Sequential {
    fn forward(&self, input: &Node) -> Result<Node, ElevenError> {
        let mut current = input.clone();
        for (_, module) in &self.modules {
            current = module.forward(&current)?;
        }
        Ok(current)
    }

    fn parameters(&self) -> Vec<(String, Tensor)> {
        self.modules
            .iter()
            .flat_map(|(name, module)| prefixed(name, module.parameters()))
            .collect()
    }
}

#[cfg(test)]
#[path = "sequential_test.rs"]
mod tests;
