// src/ops/reduction/argmax.rs

use crate::autograd::expr_kind::ExprKind;
use crate::autograd::graph::{Arena, Slot};
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::build_op;
use crate::ops::reduction::utils::{input_coords, reduced_shape};
use crate::tensor::utils::localize_coords;

/// Index of the maximum along `dim`, as `f32`. Ties resolve to the
/// smallest index.
///
/// Argmax has no gradient: a backward pass reaching it fails with
/// `GradNotImplemented`.
pub fn argmax_op<O: Operand>(x: &O, dim: usize) -> Result<O, ElevenError> {
    build_op(|arena| {
        let shape = reduced_shape(&arena.shape_of(x.node_id())?, dim)?;
        arena.alloc_op(ExprKind::Argmax { dim }, &[x.node_id()], O::WITH_GRAD, shape)
    })
}

pub(crate) fn eval_argmax(arena: &Arena, slot: &Slot, dim: usize, coords: &[usize]) -> f32 {
    let c = localize_coords(&slot.shape, coords);
    let input = slot.inputs[0].target;
    let input_shape = &arena.live(input).shape;
    let mut best = (0, f32::NEG_INFINITY);
    for i in 0..input_shape[dim] {
        let value = arena.eval(input, &input_coords(&c, input_shape.len(), dim, i));
        if value > best.1 {
            best = (i, value);
        }
    }
    best.0 as f32
}

#[cfg(test)]
#[path = "argmax_test.rs"]
mod tests;
