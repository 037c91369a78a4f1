use crate::autograd::expr_kind::{ExprKind, Origin};
use crate::autograd::graph::with_arena;
use crate::error::ElevenError;
use crate::node::{Expr, Node};
use crate::tensor::iter_utils::for_each_coord;
use crate::tensor::utils::broadcast_offset;
use crate::tensor::Tensor;

impl Tensor {
    /// Returns `true` if gradients flow into this tensor.
    pub fn requires_grad(&self) -> bool {
        self.parts().2
    }

    /// Whether this tensor was created from data rather than produced by an
    /// expression or derived as a view.
    pub fn is_leaf(&self) -> bool {
        with_arena(|arena| {
            matches!(arena.live(self.id()).tensor(), Some(t) if t.origin == Origin::Leaf)
        })
    }

    /// Turns gradient tracking on or off for future consumers.
    ///
    /// Only leaf tensors (created from data, not produced by an expression)
    /// may change this flag.
    pub fn set_requires_grad(&self, requires_grad: bool) -> Result<(), ElevenError> {
        let id = self.id();
        with_arena(|arena| {
            let slot = arena.slot_mut(id)?;
            match &slot.kind {
                ExprKind::Tensor(t) if t.origin == Origin::Leaf => {
                    slot.requires_grad = requires_grad;
                    Ok(())
                }
                _ => Err(ElevenError::InvalidArgument(
                    "requires_grad can only be changed on a leaf tensor".to_string(),
                )),
            }
        })
    }

    /// Graph handle to this tensor, recording its current version.
    pub fn node(&self) -> Node {
        Node::from(self)
    }

    /// Graph-inert handle to this tensor.
    pub fn expr(&self) -> Expr {
        Expr::from(self)
    }

    /// The accumulated gradient, as a tensor aliasing this tensor's region of
    /// the gradient buffer. Writes through it change the gradient.
    ///
    /// # Errors
    /// `TensorNoGrad` if this tensor does not require grad.
    pub fn grad(&self) -> Result<Tensor, ElevenError> {
        let (buffer, layout, requires_grad) = self.parts();
        if !requires_grad {
            return Err(ElevenError::TensorNoGrad);
        }
        let id = with_arena(|arena| {
            let grad = arena.grad_buffer(buffer)?;
            Ok::<_, ElevenError>(arena.alloc_tensor(grad, layout, Origin::Leaf, Vec::new(), false))
        })?;
        Ok(Tensor::adopt(id))
    }

    /// Resets this tensor's gradient region to zero.
    pub fn zero_grad(&self) -> Result<(), ElevenError> {
        let (buffer, layout, requires_grad) = self.parts();
        if !requires_grad {
            return Err(ElevenError::TensorNoGrad);
        }
        with_arena(|arena| {
            let Some(grad) = arena.buffer(buffer)?.grad else {
                return Ok(());
            };
            let grad = arena.buffer_mut(grad)?;
            for_each_coord(&layout.shape, |coords| {
                grad.data[layout.offset + broadcast_offset(&layout.shape, &layout.strides, coords)] = 0.0;
            });
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "autograd_methods_test.rs"]
mod tests;
