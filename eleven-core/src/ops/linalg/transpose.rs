// src/ops/linalg/transpose.rs

use crate::autograd::expr_kind::ExprKind;
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::{build_op, expect_rank};

/// Transpose of a matrix as a deferred expression.
///
/// Unlike [`Tensor::transpose`](crate::Tensor::transpose) this does not
/// alias storage: the result reads its operand with swapped coordinates.
///
/// # Errors
/// `DimNotMatch` if `x` is not rank 2.
pub fn transpose_op<O: Operand>(x: &O) -> Result<O, ElevenError> {
    build_op(|arena| {
        let shape = arena.shape_of(x.node_id())?;
        expect_rank(&shape, 2, "transpose")?;
        arena.alloc_op(ExprKind::Transpose, &[x.node_id()], O::WITH_GRAD, vec![shape[1], shape[0]])
    })
}

#[cfg(test)]
#[path = "transpose_test.rs"]
mod tests;
