// src/ops/constant.rs

use crate::autograd::expr_kind::ExprKind;
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::build_op;

/// An expression of `shape` whose every element is `value`.
///
/// A constant has no operands and never requires grad, so gradients never
/// flow into it.
pub fn constant_op<O: Operand>(value: f32, shape: &[usize]) -> Result<O, ElevenError> {
    build_op(|arena| arena.alloc_op(ExprKind::Constant { value }, &[], O::WITH_GRAD, shape.to_vec()))
}

#[cfg(test)]
#[path = "constant_test.rs"]
mod tests;
