// src/tensor/mod.rs

use crate::autograd::expr_kind::{ExprKind, Origin, TensorSlot};
use crate::autograd::graph::{with_arena, Arena, Edge, NodeId};
use crate::buffer::BufferId;
use crate::error::ElevenError;
use crate::node::{Handle, Operand};

mod autograd_methods;
pub mod create;
mod debug;
mod view_methods;

pub mod broadcast_utils;
pub mod iter_utils;
pub mod utils;

pub use create::{full, ones, zeros, zeros_like};
pub(crate) use view_methods::Layout;

use broadcast_utils::broadcasts_to;
use utils::{broadcast_offset, check_coords, dsize, is_contiguous_layout};

/// A materialized multi-dimensional `f32` array.
///
/// A `Tensor` is a counted handle to a tensor node in the thread-local
/// arena. Cloning the handle aliases the same node. Views created with
/// `slice`, `transpose`, `view` and friends are new nodes sharing the same
/// buffer (and gradient buffer) through their own offset and strides.
#[derive(Clone)]
pub struct Tensor {
    handle: Handle,
}

impl Arena {
    /// Allocates a tensor node viewing `buffer` and hands its first
    /// reference to the caller.
    pub(crate) fn alloc_tensor(
        &mut self,
        buffer: BufferId,
        layout: Layout,
        origin: Origin,
        inputs: Vec<Edge>,
        requires_grad: bool,
    ) -> NodeId {
        self.retain_buffer(buffer);
        self.alloc_slot_raw(
            ExprKind::Tensor(TensorSlot {
                buffer,
                strides: layout.strides,
                offset: layout.offset,
                origin,
            }),
            inputs,
            layout.shape,
            requires_grad,
        )
    }

    /// Whether `target` is reachable from `from` through operand and origin
    /// edges.
    pub(crate) fn reaches(&self, from: NodeId, target: NodeId) -> bool {
        let mut stack = vec![from];
        let mut seen = std::collections::HashSet::new();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Ok(slot) = self.slot(id) {
                stack.extend(slot.inputs.iter().map(|edge| edge.target));
            }
        }
        false
    }
}

impl Tensor {
    pub(crate) fn from_handle(handle: Handle) -> Self {
        Tensor { handle }
    }

    pub(crate) fn adopt(id: NodeId) -> Self {
        Tensor {
            handle: Handle::adopt(id),
        }
    }

    pub(crate) fn handle(&self) -> &Handle {
        &self.handle
    }

    pub(crate) fn id(&self) -> NodeId {
        self.handle.id()
    }

    pub(crate) fn parts(&self) -> (BufferId, Layout, bool) {
        with_arena(|arena| {
            let slot = arena.live(self.id());
            match &slot.kind {
                ExprKind::Tensor(t) => (
                    t.buffer,
                    Layout {
                        shape: slot.shape.clone(),
                        strides: t.strides.clone(),
                        offset: t.offset,
                    },
                    slot.requires_grad,
                ),
                _ => unreachable!("tensor handle over a non-tensor node"),
            }
        })
    }

    /// Evaluates expression `id` into a fresh contiguous tensor. With
    /// `with_grad`, a gradient-requiring expression becomes the producer of
    /// the new tensor.
    pub(crate) fn materialize_from(id: NodeId, with_grad: bool) -> Result<Tensor, ElevenError> {
        let new_id = with_arena(|arena| {
            let shape = arena.shape_of(id)?;
            log::debug!("materialize expression into tensor of shape {:?}", shape);
            let values = arena.collect(id, &shape);
            let buffer = arena.alloc_buffer(values);
            let requires_grad = with_grad && arena.slot(id)?.requires_grad;
            let (origin, inputs) = if requires_grad {
                let version = arena.buffer(buffer)?.version();
                (Origin::Produced { version }, vec![arena.counted_edge(id, true)?])
            } else {
                (Origin::Leaf, Vec::new())
            };
            let layout = Layout::contiguous(shape);
            Ok::<_, ElevenError>(arena.alloc_tensor(buffer, layout, origin, inputs, requires_grad))
        })?;
        Ok(Tensor::adopt(new_id))
    }

    // --- Accessors ---

    pub fn shape(&self) -> Vec<usize> {
        self.parts().1.shape
    }

    pub fn strides(&self) -> Vec<usize> {
        self.parts().1.strides
    }

    /// Element offset of this view inside its buffer.
    pub fn offset(&self) -> usize {
        self.parts().1.offset
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

    pub fn numel(&self) -> usize {
        dsize(&self.shape())
    }

    pub fn is_contiguous(&self) -> bool {
        let layout = self.parts().1;
        is_contiguous_layout(&layout.shape, &layout.strides)
    }

    /// Mutation version of the underlying buffer, shared by every view.
    pub fn version(&self) -> u64 {
        let buffer = self.parts().0;
        with_arena(|arena| arena.live_buffer(buffer).version())
    }

    /// Whether `self` and `other` view the same buffer.
    pub fn shares_storage(&self, other: &Tensor) -> bool {
        self.parts().0 == other.parts().0
    }

    /// Reads one element.
    pub fn get(&self, coords: &[usize]) -> Result<f32, ElevenError> {
        let (buffer, layout, _) = self.parts();
        check_coords(&layout.shape, coords)?;
        with_arena(|arena| {
            let data = &arena.buffer(buffer)?.data;
            Ok(data[layout.offset + broadcast_offset(&layout.shape, &layout.strides, coords)])
        })
    }

    /// Value of a single-element tensor.
    pub fn item(&self) -> Result<f32, ElevenError> {
        let shape = self.shape();
        if dsize(&shape) != 1 {
            return Err(ElevenError::ShapeMismatch {
                expected: vec![1],
                actual: shape,
                operation: "item".to_string(),
            });
        }
        Ok(self.to_vec()[0])
    }

    /// Elements in logical row-major order.
    pub fn to_vec(&self) -> Vec<f32> {
        let shape = self.shape();
        with_arena(|arena| arena.collect(self.id(), &shape))
    }

    // --- Mutation ---

    /// Writes one element and bumps the buffer version.
    pub fn set(&self, coords: &[usize], value: f32) -> Result<(), ElevenError> {
        self.write_element(coords, value, true)
    }

    /// Writes one element WITHOUT bumping the buffer version.
    ///
    /// Dangerous: a pending backward pass that recorded this tensor cannot
    /// notice the change. Meant for initializers and data loaders that fill
    /// tensors nobody has consumed yet.
    pub fn write_untracked(&self, coords: &[usize], value: f32) -> Result<(), ElevenError> {
        self.write_element(coords, value, false)
    }

    fn write_element(&self, coords: &[usize], value: f32, tracked: bool) -> Result<(), ElevenError> {
        let (buffer, layout, _) = self.parts();
        check_coords(&layout.shape, coords)?;
        let id = self.id();
        with_arena(|arena| {
            if tracked {
                arena.detach_producer(id)?;
            }
            let buffer = arena.buffer_mut(buffer)?;
            buffer.data[layout.offset + broadcast_offset(&layout.shape, &layout.strides, coords)] = value;
            if tracked {
                buffer.version_forward();
            }
            Ok(())
        })
    }

    /// Sets every element to `value` (tracked).
    pub fn fill(&self, value: f32) -> Result<(), ElevenError> {
        let values = vec![value; self.numel()];
        with_arena(|arena| arena.write_values(self.id(), &values, true))
    }

    /// Overwrites the tensor with row-major `values` (tracked).
    pub fn copy_from_slice(&self, values: &[f32]) -> Result<(), ElevenError> {
        let shape = self.shape();
        if values.len() != dsize(&shape) {
            return Err(ElevenError::TensorCreationError {
                data_len: values.len(),
                shape,
            });
        }
        with_arena(|arena| arena.write_values(self.id(), values, true))
    }

    /// Materializes `src` into this tensor in place.
    ///
    /// `src` must broadcast to this tensor's shape. Every value is computed
    /// before the first write, so `src` may read this tensor. The version is
    /// bumped once. When `src` is a gradient-requiring [`crate::Node`], it
    /// becomes this tensor's producer.
    ///
    /// # Errors
    /// - `BroadcastError` if `src` does not broadcast to this shape.
    /// - `InplaceCycle` if a gradient-requiring `src` depends on this tensor.
    pub fn assign<O: Operand>(&self, src: &O) -> Result<(), ElevenError> {
        let dst = self.id();
        let src = src.node_id();
        with_arena(|arena| {
            let dst_shape = arena.shape_of(dst)?;
            let src_shape = arena.shape_of(src)?;
            if !broadcasts_to(&src_shape, &dst_shape) {
                return Err(ElevenError::BroadcastError {
                    shape1: dst_shape,
                    shape2: src_shape,
                });
            }
            let link = O::WITH_GRAD && arena.slot(src)?.requires_grad;
            if link && arena.reaches(src, dst) {
                return Err(ElevenError::InplaceCycle);
            }
            log::debug!("assign into tensor of shape {:?}", dst_shape);
            let values = arena.collect(src, &dst_shape);
            arena.write_values(dst, &values, true)?;
            if link {
                let edge = arena.counted_edge(src, true)?;
                arena.set_producer(dst, edge)?;
            }
            Ok(())
        })
    }

    /// Evaluates into a new contiguous tensor with no gradient link.
    pub fn contiguous(&self) -> Result<Tensor, ElevenError> {
        Tensor::materialize_from(self.id(), false)
    }
}

impl Arena {
    /// Replaces a tensor's origin with a producer edge.
    fn set_producer(&mut self, id: NodeId, edge: Edge) -> Result<(), ElevenError> {
        let buffer = self
            .slot(id)?
            .tensor()
            .map(|t| t.buffer)
            .ok_or_else(|| ElevenError::NodeKindMismatch("assign target is not a tensor".to_string()))?;
        let version = self.buffer(buffer)?.version();
        let slot = self.slot_mut(id)?;
        let old = std::mem::replace(&mut slot.inputs, vec![edge]);
        slot.requires_grad = true;
        if let ExprKind::Tensor(t) = &mut slot.kind {
            t.origin = Origin::Produced { version };
        }
        for edge in old {
            self.unregister_consumer(&edge);
            self.release(edge.target);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tensor_test.rs"]
mod tests;
