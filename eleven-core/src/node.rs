// src/node.rs

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::autograd::graph::{release_handle, with_arena, NodeId};
use crate::error::ElevenError;
use crate::tensor::Tensor;

/// One counted reference to an arena node.
///
/// The arena is thread-local, so handles are neither `Send` nor `Sync`.
pub(crate) struct Handle {
    id: NodeId,
    _not_send: PhantomData<Rc<()>>,
}

impl Handle {
    /// Takes over a reference the arena already counted for the caller.
    pub(crate) fn adopt(id: NodeId) -> Self {
        Handle {
            id,
            _not_send: PhantomData,
        }
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }
}

impl Clone for Handle {
    fn clone(&self) -> Self {
        with_arena(|arena| arena.retain(self.id));
        Handle::adopt(self.id)
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        release_handle(self.id);
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Expr {}
    impl Sealed for super::Node {}
}

/// Something the operator algebra can consume and produce.
///
/// Implemented by [`Expr`] (graph-inert: no gradient wiring) and [`Node`]
/// (participates in the graph). An operator returns the same kind it was
/// given.
pub trait Operand: private::Sealed + Sized {
    #[doc(hidden)]
    const WITH_GRAD: bool;
    #[doc(hidden)]
    fn node_id(&self) -> NodeId;
    #[doc(hidden)]
    fn from_new(id: NodeId) -> Self;
}

/// Graph-inert handle to an expression or tensor.
///
/// Operators applied to `Expr` values compute values only. Nothing built
/// from them can be differentiated.
#[derive(Clone)]
pub struct Expr {
    handle: Handle,
}

impl Operand for Expr {
    const WITH_GRAD: bool = false;

    fn node_id(&self) -> NodeId {
        self.handle.id()
    }

    fn from_new(id: NodeId) -> Self {
        Expr {
            handle: Handle::adopt(id),
        }
    }
}

impl Expr {
    pub fn shape(&self) -> Vec<usize> {
        with_arena(|arena| arena.live(self.node_id()).shape.clone())
    }

    pub fn dim(&self) -> usize {
        self.shape().len()
    }

    /// Evaluates every element into a new contiguous tensor without gradient.
    pub fn materialize(&self) -> Result<Tensor, ElevenError> {
        Tensor::materialize_from(self.node_id(), false)
    }
}

impl From<&Tensor> for Expr {
    fn from(tensor: &Tensor) -> Self {
        Expr {
            handle: tensor.handle().clone(),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, shape) = with_arena(|arena| {
            let slot = arena.live(self.node_id());
            (slot.kind.name(), slot.shape.clone())
        });
        f.debug_struct("Expr").field("kind", &kind).field("shape", &shape).finish()
    }
}

/// Graph handle: an expression or tensor plus, for tensors, the buffer
/// version observed when the handle was made.
///
/// Only a node wrapping a materialized tensor can start a backward pass,
/// and only while that tensor is unmodified since the node was created.
#[derive(Clone)]
pub struct Node {
    handle: Handle,
    version: Option<u64>,
}

impl Operand for Node {
    const WITH_GRAD: bool = true;

    fn node_id(&self) -> NodeId {
        self.handle.id()
    }

    fn from_new(id: NodeId) -> Self {
        let version = with_arena(|arena| arena.tensor_version(id).ok().flatten());
        Node {
            handle: Handle::adopt(id),
            version,
        }
    }
}

impl From<&Tensor> for Node {
    fn from(tensor: &Tensor) -> Self {
        Node {
            handle: tensor.handle().clone(),
            version: Some(tensor.version()),
        }
    }
}

impl Node {
    /// Whether this node wraps a materialized tensor.
    pub fn contains_tensor(&self) -> bool {
        self.version.is_some()
    }

    /// Buffer version recorded when the node was created.
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn tensor(&self) -> Result<Tensor, ElevenError> {
        if !self.contains_tensor() {
            return Err(ElevenError::NodeKindMismatch(
                "cannot get a tensor from a node not containing a tensor".to_string(),
            ));
        }
        Ok(Tensor::from_handle(self.handle.clone()))
    }

    /// Graph-inert handle to the same expression.
    pub fn expr(&self) -> Expr {
        Expr {
            handle: self.handle.clone(),
        }
    }

    pub fn shape(&self) -> Vec<usize> {
        with_arena(|arena| arena.live(self.node_id()).shape.clone())
    }

    pub fn dim(&self) -> usize {
        self.shape().len()
    }

    pub fn size(&self, dim: usize) -> Result<usize, ElevenError> {
        let shape = self.shape();
        shape
            .get(dim)
            .copied()
            .ok_or(ElevenError::DimNotExist { dim, rank: shape.len() })
    }

    pub fn requires_grad(&self) -> bool {
        with_arena(|arena| arena.live(self.node_id()).requires_grad)
    }

    /// Runs reverse-mode differentiation from this tensor node, seeding its
    /// gradient with ones.
    ///
    /// # Errors
    /// - `NodeKindMismatch` if the node does not wrap a tensor.
    /// - `TensorNoGrad` if the tensor does not require grad.
    /// - `StaleTensor` if the tensor was modified after this node was made.
    /// - `GradientPending` if other live consumers of the tensor still owe
    ///   it a gradient.
    /// - `GradNotImplemented` if the graph contains an operator without a
    ///   gradient rule.
    pub fn backward(&self) -> Result<(), ElevenError> {
        if !self.contains_tensor() {
            return Err(ElevenError::NodeKindMismatch(
                "backward() requires a node wrapping a materialized tensor".to_string(),
            ));
        }
        with_arena(|arena| arena.backward_from(self.node_id(), self.version))
    }

    /// Evaluates this node into a new tensor whose gradient flows back into
    /// this expression.
    pub fn materialize(&self) -> Result<Node, ElevenError> {
        let tensor = Tensor::materialize_from(self.node_id(), true)?;
        Ok(Node::from(&tensor))
    }

    /// Returns `self` when it already wraps a tensor, otherwise materializes.
    pub fn to_tensor_node(&self) -> Result<Node, ElevenError> {
        if self.contains_tensor() {
            Ok(self.clone())
        } else {
            self.materialize()
        }
    }

    // --- Graph-linked views ---

    pub fn slice(&self, index: usize, dim: usize) -> Result<Node, ElevenError> {
        Ok(Node::from(&self.tensor()?.linked_view(|v| v.slice(index, dim))?))
    }

    pub fn slice_range(&self, start: usize, end: usize, dim: usize) -> Result<Node, ElevenError> {
        Ok(Node::from(&self.tensor()?.linked_view(|v| v.slice_range(start, end, dim))?))
    }

    pub fn transpose(&self, dim1: usize, dim2: usize) -> Result<Node, ElevenError> {
        Ok(Node::from(&self.tensor()?.linked_view(|v| v.transpose(dim1, dim2))?))
    }

    pub fn view(&self, shape: &[usize]) -> Result<Node, ElevenError> {
        Ok(Node::from(&self.tensor()?.linked_view(|v| v.view(shape))?))
    }

    pub fn squeeze(&self) -> Result<Node, ElevenError> {
        Ok(Node::from(&self.tensor()?.linked_view(|v| Ok(v.squeeze()))?))
    }

    pub fn squeeze_dim(&self, dim: usize) -> Result<Node, ElevenError> {
        Ok(Node::from(&self.tensor()?.linked_view(|v| v.squeeze_dim(dim))?))
    }

    pub fn unsqueeze(&self, dim: usize) -> Result<Node, ElevenError> {
        Ok(Node::from(&self.tensor()?.linked_view(|v| v.unsqueeze(dim))?))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, shape, requires_grad) = with_arena(|arena| {
            let slot = arena.live(self.node_id());
            (slot.kind.name(), slot.shape.clone(), slot.requires_grad)
        });
        f.debug_struct("Node")
            .field("kind", &kind)
            .field("shape", &shape)
            .field("requires_grad", &requires_grad)
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod tests;
