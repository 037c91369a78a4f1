// src/ops/loss/nll_loss.rs

use crate::autograd::expr_kind::ExprKind;
use crate::autograd::graph::{Arena, Slot};
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::{build_op, expect_rank};
use crate::tensor::utils::localize_coords;
use crate::tensor::Tensor;

/// Negative log-likelihood averaged over the batch:
/// `-(1/batch) · Σ_b input[b, target[b]]`, with shape `[1]`.
///
/// `target` holds one class index per row of `input`. It is read when the
/// node is built; later writes to it do not affect the loss.
///
/// # Errors
/// - `DimNotMatch` if `input` is not rank 2 or `target` not rank 1.
/// - `ShapeMismatch` if the batch extents differ or the batch is empty.
/// - `InvalidArgument` if a target is not an integer class index.
pub fn nll_loss_op<O: Operand>(input: &O, target: &Tensor) -> Result<O, ElevenError> {
    let target_shape = target.shape();
    expect_rank(&target_shape, 1, "nll_loss target")?;
    let raw_targets = target.to_vec();
    build_op(|arena| {
        let shape = arena.shape_of(input.node_id())?;
        expect_rank(&shape, 2, "nll_loss")?;
        let (batch, classes) = (shape[0], shape[1]);
        if batch == 0 || target_shape[0] != batch {
            return Err(ElevenError::ShapeMismatch {
                expected: vec![batch],
                actual: target_shape.clone(),
                operation: "nll_loss".to_string(),
            });
        }
        let targets = class_indices(&raw_targets, classes)?;
        arena.alloc_op(ExprKind::NllLoss { targets }, &[input.node_id()], O::WITH_GRAD, vec![1])
    })
}

fn class_indices(raw: &[f32], classes: usize) -> Result<Vec<usize>, ElevenError> {
    raw.iter()
        .map(|&t| {
            if t.fract() != 0.0 || t < 0.0 || t >= classes as f32 {
                Err(ElevenError::InvalidArgument(format!(
                    "nll_loss target {} is not a class index below {}",
                    t, classes
                )))
            } else {
                Ok(t as usize)
            }
        })
        .collect()
}

pub(crate) fn eval_nll_loss(arena: &Arena, slot: &Slot, targets: &[usize]) -> f32 {
    let input = slot.inputs[0].target;
    let total: f32 = targets
        .iter()
        .enumerate()
        .map(|(b, &t)| arena.eval(input, &[b, t]))
        .sum();
    -total / targets.len() as f32
}

pub(crate) fn eval_nll_loss_grad(
    arena: &Arena,
    slot: &Slot,
    targets: &[usize],
    classes: usize,
    coords: &[usize],
) -> f32 {
    let c = localize_coords(&slot.shape, coords);
    debug_assert!(c[1] < classes);
    if targets[c[0]] == c[1] {
        -arena.eval(slot.inputs[0].target, &[0]) / targets.len() as f32
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "nll_loss_test.rs"]
mod tests;
