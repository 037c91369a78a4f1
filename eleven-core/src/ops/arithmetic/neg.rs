// src/ops/arithmetic/neg.rs

use crate::autograd::expr_kind::ExprKind;
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::arithmetic::unary_elementwise;

/// Element-wise negation.
pub fn neg_op<O: Operand>(x: &O) -> Result<O, ElevenError> {
    unary_elementwise(ExprKind::Neg, x)
}

#[cfg(test)]
#[path = "neg_test.rs"]
mod tests;
