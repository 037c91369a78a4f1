// Gradient rules of every expression kind.

use crate::autograd::expr_kind::ExprKind;
use crate::autograd::graph::{Arena, Incoming, NodeId};
use crate::error::ElevenError;
use crate::tensor::iter_utils::for_each_coord;

/// Builds the gradient contribution of node `id` for each of its operands
/// that expects one, given the node's completed gradient `grad`.
///
/// Contributions are scoped helper expressions over `grad` and the node's
/// operands; they may keep the node's (broadcast) output shape, in which
/// case the receiver sums them down to its own shape.
///
/// # Errors
/// `GradNotImplemented` for kinds without a gradient rule (argmax, constant
/// fills and the helpers themselves).
pub(crate) fn gradient_terms(
    arena: &mut Arena,
    id: NodeId,
    grad: NodeId,
) -> Result<Vec<(usize, Incoming)>, ElevenError> {
    let slot = arena.slot(id)?;
    let kind = slot.kind.clone();
    let operands: Vec<NodeId> = slot.inputs.iter().map(|edge| edge.target).collect();
    let wants: Vec<bool> = slot.inputs.iter().map(|edge| edge.carries_grad()).collect();
    let grad_shape = arena.shape_of(grad)?;

    let mut terms = Vec::with_capacity(operands.len());
    match kind {
        ExprKind::Add => {
            for index in 0..2 {
                if wants[index] {
                    terms.push((index, Incoming::Value(grad)));
                }
            }
        }
        ExprKind::Sub => {
            if wants[0] {
                terms.push((0, Incoming::Value(grad)));
            }
            if wants[1] {
                let negated = arena.alloc_scoped(ExprKind::Neg, &[grad], grad_shape);
                terms.push((1, Incoming::Value(negated)));
            }
        }
        ExprKind::Mul => {
            for index in 0..2 {
                if wants[index] {
                    let other = operands[1 - index];
                    let term = arena.alloc_scoped(ExprKind::Mul, &[grad, other], grad_shape.clone());
                    terms.push((index, Incoming::Value(term)));
                }
            }
        }
        ExprKind::Neg => {
            if wants[0] {
                let term = arena.alloc_scoped(ExprKind::Neg, &[grad], grad_shape);
                terms.push((0, Incoming::Value(term)));
            }
        }
        ExprKind::Abs | ExprKind::Sigmoid | ExprKind::Relu => {
            if wants[0] {
                let helper = match kind {
                    ExprKind::Abs => ExprKind::AbsGrad,
                    ExprKind::Sigmoid => ExprKind::SigmoidGrad,
                    _ => ExprKind::ReluGrad,
                };
                let shape = arena.shape_of(operands[0])?;
                let term = arena.alloc_scoped(helper, &[grad, operands[0]], shape);
                terms.push((0, Incoming::Value(term)));
            }
        }
        ExprKind::Transpose => {
            if wants[0] {
                let shape = arena.shape_of(operands[0])?;
                let term = arena.alloc_scoped(ExprKind::Transpose, &[grad], shape);
                terms.push((0, Incoming::Value(term)));
            }
        }
        ExprKind::MatMul => {
            let (a, b) = (operands[0], operands[1]);
            // grad_a = grad · bᵗ
            if wants[0] {
                let b_shape = arena.shape_of(b)?;
                let bt = arena.alloc_scoped(ExprKind::Transpose, &[b], vec![b_shape[1], b_shape[0]]);
                let term = arena.alloc_scoped(ExprKind::MatMul, &[grad, bt], vec![grad_shape[0], b_shape[0]]);
                terms.push((0, Incoming::Value(term)));
            }
            // grad_b = aᵗ · grad
            if wants[1] {
                let a_shape = arena.shape_of(a)?;
                let at = arena.alloc_scoped(ExprKind::Transpose, &[a], vec![a_shape[1], a_shape[0]]);
                let term = arena.alloc_scoped(ExprKind::MatMul, &[at, grad], vec![a_shape[1], grad_shape[1]]);
                terms.push((1, Incoming::Value(term)));
            }
        }
        ExprKind::BatchMatMul => {
            let (a, b) = (operands[0], operands[1]);
            let batch = grad_shape[0];
            if wants[0] {
                let b_shape = arena.shape_of(b)?;
                let bt = arena.alloc_scoped(
                    ExprKind::BatchTranspose,
                    &[b],
                    vec![b_shape[0], b_shape[2], b_shape[1]],
                );
                let term = arena.alloc_scoped(
                    ExprKind::BatchMatMul,
                    &[grad, bt],
                    vec![batch, grad_shape[1], b_shape[1]],
                );
                terms.push((0, Incoming::Value(term)));
            }
            if wants[1] {
                let a_shape = arena.shape_of(a)?;
                let at = arena.alloc_scoped(
                    ExprKind::BatchTranspose,
                    &[a],
                    vec![a_shape[0], a_shape[2], a_shape[1]],
                );
                let term = arena.alloc_scoped(
                    ExprKind::BatchMatMul,
                    &[at, grad],
                    vec![batch, a_shape[2], grad_shape[2]],
                );
                terms.push((1, Incoming::Value(term)));
            }
        }
        ExprKind::Img2Col(geometry) => {
            if wants[0] {
                let shape = arena.shape_of(operands[0])?;
                let term = arena.alloc_scoped(ExprKind::Img2ColGrad(geometry), &[grad], shape);
                terms.push((0, Incoming::Value(term)));
            }
        }
        ExprKind::MaxPool2d { kernel } => {
            if wants[0] {
                let shape = arena.shape_of(operands[0])?;
                let term = arena.alloc_scoped(ExprKind::MaxPool2dGrad { kernel }, &[grad, operands[0]], shape);
                terms.push((0, Incoming::Value(term)));
            }
        }
        ExprKind::Mean { dim } => {
            if wants[0] {
                let shape = arena.shape_of(operands[0])?;
                let extent = shape[dim];
                let term = arena.alloc_scoped(ExprKind::MeanGrad { dim, extent }, &[grad], shape);
                terms.push((0, Incoming::Value(term)));
            }
        }
        ExprKind::LogSoftmax { .. } => {
            if wants[0] {
                let shape = arena.shape_of(operands[0])?;
                let mut row_grad_sum = vec![0.0; shape[0]];
                for_each_coord(&shape, |c| row_grad_sum[c[0]] += arena.eval(grad, c));
                let term = arena.alloc_scoped(ExprKind::LogSoftmaxGrad { row_grad_sum }, &[grad, id], shape);
                terms.push((0, Incoming::Value(term)));
            }
        }
        ExprKind::NllLoss { targets } => {
            if wants[0] {
                let shape = arena.shape_of(operands[0])?;
                let classes = shape[1];
                let term = arena.alloc_scoped(ExprKind::NllLossGrad { targets, classes }, &[grad], shape);
                terms.push((0, Incoming::Value(term)));
            }
        }
        ExprKind::Tensor(_) => {
            return Err(ElevenError::InternalError(
                "tensor gradients are forwarded by their origin, not by a rule".to_string(),
            ));
        }
        ExprKind::Argmax { .. }
        | ExprKind::Constant { .. }
        | ExprKind::Dense { .. }
        | ExprKind::BatchTranspose
        | ExprKind::AbsGrad
        | ExprKind::SigmoidGrad
        | ExprKind::ReluGrad
        | ExprKind::Img2ColGrad(_)
        | ExprKind::MaxPool2dGrad { .. }
        | ExprKind::MeanGrad { .. }
        | ExprKind::LogSoftmaxGrad { .. }
        | ExprKind::NllLossGrad { .. } => {
            return Err(ElevenError::GradNotImplemented {
                op: kind.name().to_string(),
            });
        }
    }
    Ok(terms)
}
