// src/ops/activation/relu.rs

use crate::autograd::expr_kind::ExprKind;
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::arithmetic::unary_elementwise;

/// Rectified linear unit, `max(x, 0)`.
///
/// The gradient passes where `x > 0` and is zero elsewhere, including at 0.
pub fn relu_op<O: Operand>(x: &O) -> Result<O, ElevenError> {
    unary_elementwise(ExprKind::Relu, x)
}

#[cfg(test)]
#[path = "relu_test.rs"]
mod tests;
