// src/ops/arithmetic/add.rs

use crate::autograd::expr_kind::ExprKind;
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::arithmetic::binary_elementwise;

/// Element-wise sum with broadcasting.
///
/// The gradient passes through unchanged to both operands and is summed
/// over the dimensions each operand was broadcast along.
///
/// # Errors
/// `BroadcastError` if a pair of extents differs and neither is 1.
pub fn add_op<O: Operand>(lhs: &O, rhs: &O) -> Result<O, ElevenError> {
    binary_elementwise(ExprKind::Add, lhs, rhs)
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
