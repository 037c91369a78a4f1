use crate::error::ElevenError;
use crate::node::Expr;
use crate::ops::arithmetic::{mul_op, sub_op};
use crate::ops::constant_op;
use crate::optim::optimizer_trait::Optimizer;
use crate::tensor::Tensor;

/// Stochastic gradient descent: `p ← p − lr · ∇p`.
#[derive(Debug)]
pub struct Sgd {
    params: Vec<(String, Tensor)>,
    lr: f32,
}

impl Sgd {
    /// Optimizes `params`, typically the output of
    /// [`Module::parameters`](crate::nn::Module::parameters).
    pub fn new(params: Vec<(String, Tensor)>, lr: f32) -> Self {
        Sgd { params, lr }
    }

    pub fn lr(&self) -> f32 {
        self.lr
    }

    pub fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    pub fn params(&self) -> &[(String, Tensor)] {
        &self.params
    }
}

impl Optimizer for Sgd {
    fn step(&mut self) -> Result<(), ElevenError> {
        let lr: Expr = constant_op(self.lr, &[1])?;
        for (name, param) in &self.params {
            if !param.requires_grad() {
                continue;
            }
            let grad = param.grad()?;
            let update = sub_op(&param.expr(), &mul_op(&lr, &grad.expr())?)?;
            param.assign(&update)?;
            log::debug!("sgd step on {} (lr {})", name, self.lr);
        }
        Ok(())
    }

    fn zero_grad(&mut self) -> Result<(), ElevenError> {
        for (_, param) in &self.params {
            if param.requires_grad() {
                param.zero_grad()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "sgd_test.rs"]
mod tests;
