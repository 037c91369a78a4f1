//! The operator algebra.
//!
//! Every constructor validates its operands' shapes before allocating, then
//! returns a deferred expression of the same handle kind it was given: an
//! [`Expr`](crate::Expr) for value-only computation or a
//! [`Node`](crate::Node) wired into the gradient graph.

use crate::autograd::graph::{with_arena, Arena, NodeId};
use crate::error::ElevenError;
use crate::node::Operand;

pub mod activation;
pub mod arithmetic;
pub mod constant;
pub(crate) mod eval;
pub mod linalg;
pub mod loss;
pub mod math_elem;
pub mod pooling;
pub mod reduction;

pub use activation::{relu_op, sigmoid_op};
pub use arithmetic::{add_op, mul_op, neg_op, sub_op};
pub use constant::constant_op;
pub use linalg::{bmm_op, img2col_op, mm_op, transpose_op};
pub use loss::{log_softmax_op, nll_loss_op};
pub use math_elem::abs_op;
pub use pooling::max_pool2d_op;
pub use reduction::{argmax_op, mean_op};

/// Runs a validating constructor against the arena and wraps the new node.
pub(crate) fn build_op<O: Operand>(
    f: impl FnOnce(&mut Arena) -> Result<NodeId, ElevenError>,
) -> Result<O, ElevenError> {
    let id = with_arena(f)?;
    Ok(O::from_new(id))
}

/// Shape check shared by the rank-restricted operators.
pub(crate) fn expect_rank(shape: &[usize], rank: usize, operation: &str) -> Result<(), ElevenError> {
    if shape.len() != rank {
        return Err(ElevenError::DimNotMatch {
            expected: rank,
            actual: shape.len(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}
