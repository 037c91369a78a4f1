// src/ops/arithmetic/sub.rs

use crate::autograd::expr_kind::ExprKind;
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::arithmetic::binary_elementwise;

/// Element-wise difference `lhs - rhs` with broadcasting.
///
/// Backward: `grad` for `lhs`, `-grad` for `rhs`.
pub fn sub_op<O: Operand>(lhs: &O, rhs: &O) -> Result<O, ElevenError> {
    binary_elementwise(ExprKind::Sub, lhs, rhs)
}

#[cfg(test)]
#[path = "sub_test.rs"]
mod tests;
