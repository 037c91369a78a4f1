// src/ops/pooling/max_pool2d.rs

use crate::autograd::expr_kind::ExprKind;
use crate::autograd::graph::{Arena, NodeId, Slot};
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::{build_op, expect_rank};
use crate::tensor::utils::localize_coords;

/// Max over non-overlapping `kernel` windows of `x` (b, c, h, w).
///
/// The output is `(b, c, h / kh, w / kw)`; trailing rows and columns that
/// do not fill a whole window are ignored. In backward the gradient of a
/// window goes to its first maximum in row-major order.
///
/// # Errors
/// - `DimNotMatch` if `x` is not rank 4.
/// - `InvalidArgument` for a zero kernel extent.
/// - `KernelTooLarge` if the kernel exceeds the image.
pub fn max_pool2d_op<O: Operand>(x: &O, kernel: (usize, usize)) -> Result<O, ElevenError> {
    build_op(|arena| {
        let shape = arena.shape_of(x.node_id())?;
        expect_rank(&shape, 4, "max_pool2d")?;
        if kernel.0 == 0 || kernel.1 == 0 {
            return Err(ElevenError::InvalidArgument(format!(
                "max_pool2d needs a positive kernel, got {:?}",
                kernel
            )));
        }
        for (k, extent) in [(kernel.0, shape[2]), (kernel.1, shape[3])] {
            if k > extent {
                return Err(ElevenError::KernelTooLarge { kernel: k, extent });
            }
        }
        let out = vec![shape[0], shape[1], shape[2] / kernel.0, shape[3] / kernel.1];
        arena.alloc_op(ExprKind::MaxPool2d { kernel }, &[x.node_id()], O::WITH_GRAD, out)
    })
}

/// Position and value of the first maximum of the window at output cell
/// `(b, c, oy, ox)`.
fn window_argmax(arena: &Arena, image: NodeId, kernel: (usize, usize), cell: &[usize]) -> ((usize, usize), f32) {
    let (y0, x0) = (cell[2] * kernel.0, cell[3] * kernel.1);
    let mut best = ((y0, x0), f32::NEG_INFINITY);
    for y in y0..y0 + kernel.0 {
        for x in x0..x0 + kernel.1 {
            let value = arena.eval(image, &[cell[0], cell[1], y, x]);
            if value > best.1 {
                best = ((y, x), value);
            }
        }
    }
    best
}

pub(crate) fn eval_max_pool2d(arena: &Arena, slot: &Slot, kernel: (usize, usize), coords: &[usize]) -> f32 {
    let c = localize_coords(&slot.shape, coords);
    window_argmax(arena, slot.inputs[0].target, kernel, &c).1
}

/// Gradient at input pixel `coords`: the window's gradient if this pixel is
/// the window's first maximum, otherwise 0.
pub(crate) fn eval_max_pool2d_grad(arena: &Arena, slot: &Slot, kernel: (usize, usize), coords: &[usize]) -> f32 {
    let c = localize_coords(&slot.shape, coords);
    let (grad, image) = (slot.inputs[0].target, slot.inputs[1].target);
    let cell = [c[0], c[1], c[2] / kernel.0, c[3] / kernel.1];
    let out_shape = &arena.live(grad).shape;
    if cell[2] >= out_shape[2] || cell[3] >= out_shape[3] {
        return 0.0;
    }
    let (position, _) = window_argmax(arena, image, kernel, &cell);
    if position == (c[2], c[3]) {
        arena.eval(grad, &cell)
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "max_pool2d_test.rs"]
mod tests;
