// src/ops/linalg/matmul.rs

use crate::autograd::expr_kind::ExprKind;
use crate::autograd::graph::{Arena, Slot};
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::{build_op, expect_rank};
use crate::tensor::broadcast_utils::broadcast_shapes;
use crate::tensor::utils::localize_coords;

/// Matrix product of `a` (m, k) and `b` (k, n).
///
/// # Errors
/// - `DimNotMatch` if either operand is not rank 2.
/// - `ShapeMismatch` if the inner dimensions differ.
pub fn mm_op<O: Operand>(a: &O, b: &O) -> Result<O, ElevenError> {
    build_op(|arena| {
        let a_shape = arena.shape_of(a.node_id())?;
        let b_shape = arena.shape_of(b.node_id())?;
        expect_rank(&a_shape, 2, "mm")?;
        expect_rank(&b_shape, 2, "mm")?;
        if a_shape[1] != b_shape[0] {
            return Err(ElevenError::ShapeMismatch {
                expected: vec![a_shape[1], b_shape[1]],
                actual: b_shape,
                operation: "mm".to_string(),
            });
        }
        arena.alloc_op(
            ExprKind::MatMul,
            &[a.node_id(), b.node_id()],
            O::WITH_GRAD,
            vec![a_shape[0], b_shape[1]],
        )
    })
}

/// Batched matrix product of `a` (b, m, k) and `b` (b, k, n).
///
/// The batch extents broadcast, so a single (1, m, k) weight can multiply
/// every item of a batch.
///
/// # Errors
/// - `DimNotMatch` if either operand is not rank 3.
/// - `BroadcastError` if the batch extents are incompatible.
/// - `ShapeMismatch` if the inner dimensions differ.
pub fn bmm_op<O: Operand>(a: &O, b: &O) -> Result<O, ElevenError> {
    build_op(|arena| {
        let a_shape = arena.shape_of(a.node_id())?;
        let b_shape = arena.shape_of(b.node_id())?;
        expect_rank(&a_shape, 3, "bmm")?;
        expect_rank(&b_shape, 3, "bmm")?;
        let batch = broadcast_shapes(&a_shape[..1], &b_shape[..1])?;
        if a_shape[2] != b_shape[1] {
            return Err(ElevenError::ShapeMismatch {
                expected: vec![b_shape[0], a_shape[2], b_shape[2]],
                actual: b_shape,
                operation: "bmm".to_string(),
            });
        }
        arena.alloc_op(
            ExprKind::BatchMatMul,
            &[a.node_id(), b.node_id()],
            O::WITH_GRAD,
            vec![batch[0], a_shape[1], b_shape[2]],
        )
    })
}

pub(crate) fn eval_mm(arena: &Arena, slot: &Slot, coords: &[usize]) -> f32 {
    let c = localize_coords(&slot.shape, coords);
    let (a, b) = (slot.inputs[0].target, slot.inputs[1].target);
    let inner = arena.live(a).shape[1];
    (0..inner)
        .map(|k| arena.eval(a, &[c[0], k]) * arena.eval(b, &[k, c[1]]))
        .sum()
}

pub(crate) fn eval_bmm(arena: &Arena, slot: &Slot, coords: &[usize]) -> f32 {
    let c = localize_coords(&slot.shape, coords);
    let (a, b) = (slot.inputs[0].target, slot.inputs[1].target);
    let inner = arena.live(a).shape[2];
    (0..inner)
        .map(|k| arena.eval(a, &[c[0], c[1], k]) * arena.eval(b, &[c[0], k, c[2]]))
        .sum()
}

#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;
