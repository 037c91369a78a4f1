// src/ops/reduction/mean.rs

use crate::autograd::expr_kind::ExprKind;
use crate::autograd::graph::{Arena, Slot};
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::build_op;
use crate::ops::reduction::utils::{input_coords, output_coords, reduced_shape};
use crate::tensor::utils::localize_coords;

/// Arithmetic mean along `dim`.
///
/// Backward spreads the gradient evenly, `grad / extent`, over the reduced
/// dimension.
///
/// # Errors
/// `DimNotExist` if `dim` is out of range.
pub fn mean_op<O: Operand>(x: &O, dim: usize) -> Result<O, ElevenError> {
    build_op(|arena| {
        let shape = reduced_shape(&arena.shape_of(x.node_id())?, dim)?;
        arena.alloc_op(ExprKind::Mean { dim }, &[x.node_id()], O::WITH_GRAD, shape)
    })
}

pub(crate) fn eval_mean(arena: &Arena, slot: &Slot, dim: usize, coords: &[usize]) -> f32 {
    let c = localize_coords(&slot.shape, coords);
    let input = slot.inputs[0].target;
    let input_shape = &arena.live(input).shape;
    let extent = input_shape[dim];
    let total: f32 = (0..extent)
        .map(|i| arena.eval(input, &input_coords(&c, input_shape.len(), dim, i)))
        .sum();
    total / extent as f32
}

pub(crate) fn eval_mean_grad(arena: &Arena, slot: &Slot, dim: usize, extent: usize, coords: &[usize]) -> f32 {
    let c = localize_coords(&slot.shape, coords);
    arena.eval(slot.inputs[0].target, &output_coords(&c, dim)) / extent as f32
}

#[cfg(test)]
#[path = "mean_test.rs"]
mod tests;
