// src/ops/activation/sigmoid.rs

use crate::autograd::expr_kind::ExprKind;
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::arithmetic::unary_elementwise;

pub(crate) fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Logistic sigmoid. Backward: `grad · s · (1 − s)`.
pub fn sigmoid_op<O: Operand>(x: &O) -> Result<O, ElevenError> {
    unary_elementwise(ExprKind::Sigmoid, x)
}

#[cfg(test)]
#[path = "sigmoid_test.rs"]
mod tests;
