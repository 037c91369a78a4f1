// src/ops/arithmetic/mul.rs

use crate::autograd::expr_kind::ExprKind;
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::arithmetic::binary_elementwise;

/// Element-wise product with broadcasting.
///
/// Each operand's gradient is the incoming gradient times the other operand.
pub fn mul_op<O: Operand>(lhs: &O, rhs: &O) -> Result<O, ElevenError> {
    binary_elementwise(ExprKind::Mul, lhs, rhs)
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
