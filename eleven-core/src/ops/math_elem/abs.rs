// src/ops/math_elem/abs.rs

use crate::autograd::expr_kind::ExprKind;
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::arithmetic::unary_elementwise;

/// Element-wise absolute value.
///
/// The gradient is `grad · sign(x)`, taking 0 at `x == 0`.
pub fn abs_op<O: Operand>(x: &O) -> Result<O, ElevenError> {
    unary_elementwise(ExprKind::Abs, x)
}

#[cfg(test)]
#[path = "abs_test.rs"]
mod tests;
