// src/ops/arithmetic/mod.rs

pub mod add;
pub mod mul;
pub mod neg;
pub mod sub;

pub use add::add_op;
pub use mul::mul_op;
pub use neg::neg_op;
pub use sub::sub_op;

use crate::autograd::expr_kind::ExprKind;
use crate::error::ElevenError;
use crate::node::Operand;
use crate::ops::build_op;
use crate::tensor::broadcast_utils::broadcast_shapes;

/// Builds a broadcasting elementwise binary node after checking that the
/// operand shapes are compatible.
pub(crate) fn binary_elementwise<O: Operand>(kind: ExprKind, lhs: &O, rhs: &O) -> Result<O, ElevenError> {
    build_op(|arena| {
        let shape = broadcast_shapes(&arena.shape_of(lhs.node_id())?, &arena.shape_of(rhs.node_id())?)?;
        arena.alloc_op(kind, &[lhs.node_id(), rhs.node_id()], O::WITH_GRAD, shape)
    })
}

/// Builds a shape-preserving unary node.
pub(crate) fn unary_elementwise<O: Operand>(kind: ExprKind, x: &O) -> Result<O, ElevenError> {
    build_op(|arena| {
        let shape = arena.shape_of(x.node_id())?;
        arena.alloc_op(kind, &[x.node_id()], O::WITH_GRAD, shape)
    })
}
