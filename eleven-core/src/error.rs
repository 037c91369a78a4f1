use thiserror::Error;

/// Custom error type for the eleven engine.
///
/// Every variant is a fail-fast signal raised synchronously by the call that
/// violated a precondition. No operation leaves a partially built graph behind.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ElevenError {
    #[error("Index out of range: index {index} for dimension {dim} of extent {extent}")]
    IndexOutOfRange {
        index: usize,
        dim: usize,
        extent: usize,
    },

    #[error("Dimension {dim} does not exist for a tensor of rank {rank}")]
    DimNotExist { dim: usize, rank: usize },

    #[error("Rank mismatch during {operation}: expected {expected}, got {actual}")]
    DimNotMatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("Cannot broadcast shapes: {shape1:?} and {shape2:?}")]
    BroadcastError {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Operation {operation} requires a contiguous tensor (shape {shape:?}, strides {strides:?})")]
    TensorNotContiguous {
        operation: String,
        shape: Vec<usize>,
        strides: Vec<usize>,
    },

    #[error("Element count mismatch: cannot view {from:?} as {to:?}")]
    SizeNotEqual { from: Vec<usize>, to: Vec<usize> },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Tensor does not require grad")]
    TensorNoGrad,

    #[error("Node kind mismatch: {0}")]
    NodeKindMismatch(String),

    #[error("Backward is not implemented for {op}")]
    GradNotImplemented { op: String },

    #[error("Kernel {kernel} is larger than the padded input extent {extent}")]
    KernelTooLarge { kernel: usize, extent: usize },

    #[error("Tensor was modified after it was recorded for backward (recorded version {recorded}, current {current})")]
    StaleTensor { recorded: u64, current: u64 },

    #[error("Gradient already delivered through this edge; backward ran twice over the same graph")]
    BackwardTwice,

    #[error("Backward started on a tensor that still waits for {pending} gradient contribution(s)")]
    GradientPending { pending: usize },

    #[error("In-place assignment would make the tensor an input of its own producer")]
    InplaceCycle,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
