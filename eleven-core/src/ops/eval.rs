use crate::autograd::expr_kind::ExprKind;
use crate::autograd::graph::{Arena, NodeId};
use crate::ops::activation::sigmoid::sigmoid;
use crate::ops::{linalg, loss, pooling, reduction};
use crate::tensor::utils::{broadcast_offset, localize_coords};

impl Arena {
    /// Evaluates one element of node `id`.
    ///
    /// `coords` may address a larger broadcast shape: leading coordinates
    /// are ignored and extent-1 dimensions read index 0.
    pub(crate) fn eval(&self, id: NodeId, coords: &[usize]) -> f32 {
        let slot = self.live(id);
        let input = |i: usize| slot.inputs[i].target;
        match &slot.kind {
            ExprKind::Tensor(t) => {
                let buffer = self.live_buffer(t.buffer);
                buffer.data[t.offset + broadcast_offset(&slot.shape, &t.strides, coords)]
            }
            ExprKind::Constant { value } => *value,
            ExprKind::Add => self.eval(input(0), coords) + self.eval(input(1), coords),
            ExprKind::Sub => self.eval(input(0), coords) - self.eval(input(1), coords),
            ExprKind::Mul => self.eval(input(0), coords) * self.eval(input(1), coords),
            ExprKind::Neg => -self.eval(input(0), coords),
            ExprKind::Abs => self.eval(input(0), coords).abs(),
            ExprKind::Sigmoid => sigmoid(self.eval(input(0), coords)),
            ExprKind::Relu => self.eval(input(0), coords).max(0.0),
            ExprKind::Transpose => {
                let c = localize_coords(&slot.shape, coords);
                self.eval(input(0), &[c[1], c[0]])
            }
            ExprKind::MatMul => linalg::matmul::eval_mm(self, slot, coords),
            ExprKind::BatchMatMul => linalg::matmul::eval_bmm(self, slot, coords),
            ExprKind::Img2Col(geometry) => linalg::img2col::eval_img2col(self, slot, geometry, coords),
            ExprKind::MaxPool2d { kernel } => pooling::max_pool2d::eval_max_pool2d(self, slot, *kernel, coords),
            ExprKind::Mean { dim } => reduction::mean::eval_mean(self, slot, *dim, coords),
            ExprKind::Argmax { dim } => reduction::argmax::eval_argmax(self, slot, *dim, coords),
            ExprKind::LogSoftmax { row_max, row_exp_sum } => {
                let c = localize_coords(&slot.shape, coords);
                self.eval(input(0), &c) - row_max[c[0]] - row_exp_sum[c[0]].ln()
            }
            ExprKind::NllLoss { targets } => loss::nll_loss::eval_nll_loss(self, slot, targets),

            ExprKind::Dense { data, strides } => data[broadcast_offset(&slot.shape, strides, coords)],
            ExprKind::BatchTranspose => {
                let c = localize_coords(&slot.shape, coords);
                self.eval(input(0), &[c[0], c[2], c[1]])
            }
            ExprKind::AbsGrad => {
                let x = self.eval(input(1), coords);
                let sign = if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                };
                self.eval(input(0), coords) * sign
            }
            ExprKind::SigmoidGrad => {
                let s = sigmoid(self.eval(input(1), coords));
                self.eval(input(0), coords) * s * (1.0 - s)
            }
            ExprKind::ReluGrad => {
                if self.eval(input(1), coords) > 0.0 {
                    self.eval(input(0), coords)
                } else {
                    0.0
                }
            }
            ExprKind::Img2ColGrad(geometry) => linalg::img2col::eval_img2col_grad(self, slot, geometry, coords),
            ExprKind::MaxPool2dGrad { kernel } => {
                pooling::max_pool2d::eval_max_pool2d_grad(self, slot, *kernel, coords)
            }
            ExprKind::MeanGrad { dim, extent } => {
                reduction::mean::eval_mean_grad(self, slot, *dim, *extent, coords)
            }
            ExprKind::LogSoftmaxGrad { row_grad_sum } => {
                loss::log_softmax::eval_log_softmax_grad(self, slot, row_grad_sum, coords)
            }
            ExprKind::NllLossGrad { targets, classes } => {
                loss::nll_loss::eval_nll_loss_grad(self, slot, targets, *classes, coords)
            }
        }
    }
}
