use crate::buffer::BufferId;
use crate::ops::linalg::img2col::Img2ColGeometry;

/// How a tensor slot obtained its current contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Created from raw data or written only through graph-inert paths.
    Leaf,
    /// Materialized from the expression held by `inputs[0]` when the buffer
    /// was at `version`.
    Produced { version: u64 },
    /// Zero-copy view of the tensor held by `inputs[0]`; shares its buffer
    /// and therefore its gradient region.
    View,
}

/// A materialized array: a buffer plus the (offset, strides) descriptor of
/// this view into it. The shape lives on the owning slot.
#[derive(Debug, Clone)]
pub(crate) struct TensorSlot {
    pub(crate) buffer: BufferId,
    pub(crate) strides: Vec<usize>,
    pub(crate) offset: usize,
    pub(crate) origin: Origin,
}

/// Closed set of expression kinds.
///
/// Operands are the owning slot's `inputs`, in the order documented per
/// variant. Variants after `NllLoss` are backward helpers: they only ever
/// live in a backward scope and have no gradient rule of their own.
#[derive(Debug, Clone)]
pub(crate) enum ExprKind {
    Tensor(TensorSlot),
    /// Literal fill with no operands.
    Constant { value: f32 },
    /// [lhs, rhs]
    Add,
    /// [lhs, rhs]
    Sub,
    /// [lhs, rhs]
    Mul,
    /// [x]
    Neg,
    /// [x]
    Abs,
    /// [x]
    Sigmoid,
    /// [x]
    Relu,
    /// [x], rank 2
    Transpose,
    /// [a (m,k), b (k,n)]
    MatMul,
    /// [a (b,m,k), b (b,k,n)]
    BatchMatMul,
    /// [image (b,c,h,w)]
    Img2Col(Img2ColGeometry),
    /// [image (b,c,h,w)]
    MaxPool2d { kernel: (usize, usize) },
    /// [x]
    Mean { dim: usize },
    /// [x]
    Argmax { dim: usize },
    /// [x (rows, classes)], with the per-row max and exp-sum of `x - max`.
    LogSoftmax {
        row_max: Vec<f32>,
        row_exp_sum: Vec<f32>,
    },
    /// [log_probs (batch, classes)]
    NllLoss { targets: Vec<usize> },

    /// Dense row-major values, used for joined gradients.
    Dense { data: Vec<f32>, strides: Vec<usize> },
    /// [x (b,m,n)] -> (b,n,m)
    BatchTranspose,
    /// [grad, x]
    AbsGrad,
    /// [grad, x]
    SigmoidGrad,
    /// [grad, x]
    ReluGrad,
    /// [grad (b, c·kh·kw, oh·ow)]
    Img2ColGrad(Img2ColGeometry),
    /// [grad, image]
    MaxPool2dGrad { kernel: (usize, usize) },
    /// [grad], re-inserts `dim` of the given extent.
    MeanGrad { dim: usize, extent: usize },
    /// [grad, log_softmax node], with the per-row sum of `grad`.
    LogSoftmaxGrad { row_grad_sum: Vec<f32> },
    /// [grad (1)]
    NllLossGrad { targets: Vec<usize>, classes: usize },
}

impl ExprKind {
    /// Name used in diagnostics.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            ExprKind::Tensor(_) => "tensor",
            ExprKind::Constant { .. } => "constant",
            ExprKind::Add => "add",
            ExprKind::Sub => "sub",
            ExprKind::Mul => "mul",
            ExprKind::Neg => "neg",
            ExprKind::Abs => "abs",
            ExprKind::Sigmoid => "sigmoid",
            ExprKind::Relu => "relu",
            ExprKind::Transpose => "transpose",
            ExprKind::MatMul => "mm",
            ExprKind::BatchMatMul => "bmm",
            ExprKind::Img2Col(_) => "img2col",
            ExprKind::MaxPool2d { .. } => "max_pool2d",
            ExprKind::Mean { .. } => "mean",
            ExprKind::Argmax { .. } => "argmax",
            ExprKind::LogSoftmax { .. } => "log_softmax",
            ExprKind::NllLoss { .. } => "nll_loss",
            ExprKind::Dense { .. } => "dense gradient",
            ExprKind::BatchTranspose => "batch transpose",
            ExprKind::AbsGrad => "abs gradient",
            ExprKind::SigmoidGrad => "sigmoid gradient",
            ExprKind::ReluGrad => "relu gradient",
            ExprKind::Img2ColGrad(_) => "img2col gradient",
            ExprKind::MaxPool2dGrad { .. } => "max_pool2d gradient",
            ExprKind::MeanGrad { .. } => "mean gradient",
            ExprKind::LogSoftmaxGrad { .. } => "log_softmax gradient",
            ExprKind::NllLossGrad { .. } => "nll_loss gradient",
        }
    }
}
