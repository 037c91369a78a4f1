// src/ops/loss/log_softmax.rs

use crate::autograd::expr_kind::ExprKind;
use crate::autograd::graph::{Arena, Slot};
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::{build_op, expect_rank};
use crate::tensor::utils::localize_coords;

/// Row-wise `x - max - ln(Σ exp(x - max))` of a 2D input.
///
/// The per-row max and exp-sum are computed once, from the input values at
/// construction time.
///
/// Backward: `g - softmax(x) · Σ_row g`.
///
/// # Errors
/// `DimNotMatch` if `x` is not rank 2.
pub fn log_softmax_op<O: Operand>(x: &O) -> Result<O, ElevenError> {
    build_op(|arena| {
        let shape = arena.shape_of(x.node_id())?;
        expect_rank(&shape, 2, "log_softmax")?;
        let (rows, cols) = (shape[0], shape[1]);
        let mut row_max = Vec::with_capacity(rows);
        let mut row_exp_sum = Vec::with_capacity(rows);
        for r in 0..rows {
            let row: Vec<f32> = (0..cols).map(|c| arena.eval(x.node_id(), &[r, c])).collect();
            let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            row_exp_sum.push(row.iter().map(|v| (v - max).exp()).sum());
            row_max.push(max);
        }
        arena.alloc_op(
            ExprKind::LogSoftmax { row_max, row_exp_sum },
            &[x.node_id()],
            O::WITH_GRAD,
            shape,
        )
    })
}

pub(crate) fn eval_log_softmax_grad(arena: &Arena, slot: &Slot, row_grad_sum: &[f32], coords: &[usize]) -> f32 {
    let c = localize_coords(&slot.shape, coords);
    let (grad, log_probs) = (slot.inputs[0].target, slot.inputs[1].target);
    let softmax = arena.eval(log_probs, &c).exp();
    arena.eval(grad, &c) - softmax * row_grad_sum[c[0]]
}

#[cfg(test)]
#[path = "log_softmax_test.rs"]
mod tests;
