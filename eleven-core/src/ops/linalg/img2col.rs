// src/ops/linalg/img2col.rs

use crate::autograd::expr_kind::ExprKind;
use crate::autograd::graph::{Arena, Slot};
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::{build_op, expect_rank};
use crate::tensor::utils::localize_coords;

/// Window geometry of an img2col expression, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Img2ColGeometry {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub kernel: (usize, usize),
    pub stride: usize,
    pub padding: usize,
    pub out_height: usize,
    pub out_width: usize,
}

impl Img2ColGeometry {
    /// Validates the window against an image of `(channels, height, width)`.
    pub fn new(
        channels: usize,
        height: usize,
        width: usize,
        kernel: (usize, usize),
        stride: usize,
        padding: usize,
    ) -> Result<Self, ElevenError> {
        if stride == 0 || kernel.0 == 0 || kernel.1 == 0 {
            return Err(ElevenError::InvalidArgument(format!(
                "img2col needs a positive kernel and stride, got kernel {:?} stride {}",
                kernel, stride
            )));
        }
        let padded = (height + 2 * padding, width + 2 * padding);
        if kernel.0 > padded.0 {
            return Err(ElevenError::KernelTooLarge {
                kernel: kernel.0,
                extent: padded.0,
            });
        }
        if kernel.1 > padded.1 {
            return Err(ElevenError::KernelTooLarge {
                kernel: kernel.1,
                extent: padded.1,
            });
        }
        Ok(Img2ColGeometry {
            channels,
            height,
            width,
            kernel,
            stride,
            padding,
            out_height: (padded.0 - kernel.0) / stride + 1,
            out_width: (padded.1 - kernel.1) / stride + 1,
        })
    }

    fn window(&self) -> usize {
        self.kernel.0 * self.kernel.1
    }

    /// Shape of the column matrix for a batch of `batch` images.
    pub fn output_shape(&self, batch: usize) -> Vec<usize> {
        vec![batch, self.channels * self.window(), self.out_height * self.out_width]
    }
}

/// Unfolds every kernel-sized window of `x` (b, c, h, w) into a column.
///
/// The result has shape `(b, c·kh·kw, oh·ow)` where
/// `oh = (h + 2·padding − kh) / stride + 1` (likewise `ow`). Row
/// `ci·kh·kw + ki·kw + kj` of column `oy·ow + ox` holds pixel
/// `(ci, oy·stride + ki − padding, ox·stride + kj − padding)`, or 0 when
/// that lands in the padding.
///
/// # Errors
/// - `DimNotMatch` if `x` is not rank 4.
/// - `InvalidArgument` for a zero kernel extent or stride.
/// - `KernelTooLarge` if the kernel exceeds the padded image.
pub fn img2col_op<O: Operand>(
    x: &O,
    kernel: (usize, usize),
    stride: usize,
    padding: usize,
) -> Result<O, ElevenError> {
    build_op(|arena| {
        let shape = arena.shape_of(x.node_id())?;
        expect_rank(&shape, 4, "img2col")?;
        let geometry = Img2ColGeometry::new(shape[1], shape[2], shape[3], kernel, stride, padding)?;
        arena.alloc_op(
            ExprKind::Img2Col(geometry),
            &[x.node_id()],
            O::WITH_GRAD,
            geometry.output_shape(shape[0]),
        )
    })
}

pub(crate) fn eval_img2col(arena: &Arena, slot: &Slot, g: &Img2ColGeometry, coords: &[usize]) -> f32 {
    let c = localize_coords(&slot.shape, coords);
    let (batch, row, col) = (c[0], c[1], c[2]);
    let channel = row / g.window();
    let ki = (row % g.window()) / g.kernel.1;
    let kj = row % g.kernel.1;
    let y = (col / g.out_width) * g.stride + ki;
    let x = (col % g.out_width) * g.stride + kj;
    // padded coordinates -> image coordinates
    if y < g.padding || x < g.padding || y - g.padding >= g.height || x - g.padding >= g.width {
        return 0.0;
    }
    arena.eval(slot.inputs[0].target, &[batch, channel, y - g.padding, x - g.padding])
}

/// Gradient of one input pixel: the sum over every (window, column) pair
/// that read it.
pub(crate) fn eval_img2col_grad(arena: &Arena, slot: &Slot, g: &Img2ColGeometry, coords: &[usize]) -> f32 {
    let c = localize_coords(&slot.shape, coords);
    let (batch, channel) = (c[0], c[1]);
    let (y, x) = (c[2] + g.padding, c[3] + g.padding);
    let grad = slot.inputs[0].target;
    let mut total = 0.0;
    for ki in 0..g.kernel.0.min(y + 1) {
        let dy = y - ki;
        if dy % g.stride != 0 || dy / g.stride >= g.out_height {
            continue;
        }
        for kj in 0..g.kernel.1.min(x + 1) {
            let dx = x - kj;
            if dx % g.stride != 0 || dx / g.stride >= g.out_width {
                continue;
            }
            let row = channel * g.window() + ki * g.kernel.1 + kj;
            let col = (dy / g.stride) * g.out_width + dx / g.stride;
            total += arena.eval(grad, &[batch, row, col]);
        }
    }
    total
}

#[cfg(test)]
#[path = "img2col_test.rs"]
mod tests;
