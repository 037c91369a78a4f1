//! Thread-local arena holding every expression node and buffer.
//!
//! Nodes are addressed by `NodeId` and carry two counters:
//! - `refcount`: live handles plus counted edges from other nodes. A counted
//!   node is destroyed exactly when it reaches zero.
//! - `gradcount`: gradient contributions still expected from live consumers
//!   that opted into gradient flow. A node forwards its own backward rule
//!   only once this reaches zero, which is the fan-in join.
//!
//! Backward helpers are `Scoped`: they are never refcounted, observe their
//! operands through `Uncontrolled` edges, and are freed when the backward
//! step that created them returns.

use std::cell::RefCell;

use crate::autograd::expr_kind::{ExprKind, Origin, TensorSlot};
use crate::buffer::{Buffer, BufferId};
use crate::error::ElevenError;
use crate::tensor::iter_utils::for_each_coord;
use crate::tensor::utils::{broadcast_offset, calculate_strides, dsize};

/// Index of a node in the thread-local arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// How an edge participates in the target's lifetime and gradient count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    /// Holds one reference; with `with_grad` it also registered one expected
    /// gradient contribution.
    Counted { with_grad: bool },
    /// Observes the target only. Used by backward helpers.
    Uncontrolled,
}

#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub(crate) target: NodeId,
    pub(crate) control: Control,
    /// Buffer version of a tensor target when the gradient edge was made.
    pub(crate) version: Option<u64>,
    pub(crate) delivered: bool,
}

impl Edge {
    pub(crate) fn carries_grad(&self) -> bool {
        matches!(self.control, Control::Counted { with_grad: true })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ownership {
    Counted,
    Scoped,
}

#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) kind: ExprKind,
    pub(crate) inputs: Vec<Edge>,
    pub(crate) shape: Vec<usize>,
    pub(crate) requires_grad: bool,
    pub(crate) refcount: usize,
    pub(crate) gradcount: usize,
    /// Sum of contributions received so far by a composite node with more
    /// than one gradient consumer.
    pub(crate) join: Option<Vec<f32>>,
    pub(crate) ownership: Ownership,
}

impl Slot {
    pub(crate) fn tensor(&self) -> Option<&TensorSlot> {
        match &self.kind {
            ExprKind::Tensor(t) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn rank(&self) -> usize {
        self.shape.len()
    }
}

/// A gradient contribution travelling along one edge.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Incoming {
    /// An expression with a shape the target broadcasts to.
    Value(NodeId),
    /// The contribution already sits in the target's gradient region
    /// (sent by a view to its base).
    Accumulated,
}

#[derive(Debug, Default)]
pub(crate) struct Arena {
    nodes: Vec<Option<Slot>>,
    free_nodes: Vec<usize>,
    buffers: Vec<Option<Buffer>>,
    free_buffers: Vec<usize>,
    scope: Vec<NodeId>,
}

thread_local! {
    static ARENA: RefCell<Arena> = RefCell::new(Arena::default());
}

/// Runs `f` with exclusive access to this thread's arena.
pub(crate) fn with_arena<R>(f: impl FnOnce(&mut Arena) -> R) -> R {
    ARENA.with(|arena| f(&mut arena.borrow_mut()))
}

/// Drops one handle reference. Silently leaks if the arena is gone
/// (thread teardown) or busy.
pub(crate) fn release_handle(id: NodeId) {
    let _ = ARENA.try_with(|arena| {
        if let Ok(mut arena) = arena.try_borrow_mut() {
            arena.release(id);
        }
    });
}

/// Number of live (counted or scoped) nodes on the current thread.
pub fn live_nodes() -> usize {
    with_arena(|arena| arena.nodes.iter().filter(|n| n.is_some()).count())
}

/// Number of live buffers (data and gradient) on the current thread.
pub fn live_buffers() -> usize {
    with_arena(|arena| arena.buffers.iter().filter(|b| b.is_some()).count())
}

impl Arena {
    // --- Slots ---

    pub(crate) fn slot(&self, id: NodeId) -> Result<&Slot, ElevenError> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| ElevenError::InternalError(format!("dangling node handle {}", id.0)))
    }

    pub(crate) fn slot_mut(&mut self, id: NodeId) -> Result<&mut Slot, ElevenError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| ElevenError::InternalError(format!("dangling node handle {}", id.0)))
    }

    /// Slot lookup for paths where the id is known to be live (operands of
    /// a live node). Evaluation cannot fail, so a dangling id is a bug.
    pub(crate) fn live(&self, id: NodeId) -> &Slot {
        match self.nodes.get(id.0).and_then(Option::as_ref) {
            Some(slot) => slot,
            None => unreachable!("operand {} outlived by its consumer", id.0),
        }
    }

    pub(crate) fn shape_of(&self, id: NodeId) -> Result<Vec<usize>, ElevenError> {
        Ok(self.slot(id)?.shape.clone())
    }

    fn insert_slot(&mut self, slot: Slot) -> NodeId {
        match self.free_nodes.pop() {
            Some(index) => {
                self.nodes[index] = Some(slot);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(slot));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Inserts a counted node with prepared edges; the caller owns the first
    /// reference.
    pub(crate) fn alloc_slot_raw(
        &mut self,
        kind: ExprKind,
        inputs: Vec<Edge>,
        shape: Vec<usize>,
        requires_grad: bool,
    ) -> NodeId {
        self.insert_slot(Slot {
            kind,
            inputs,
            shape,
            requires_grad,
            refcount: 1,
            gradcount: 0,
            join: None,
            ownership: Ownership::Counted,
        })
    }

    /// Allocates a counted node over `operands` and hands its first reference
    /// to the caller. With `with_grad`, every operand that requires grad gets
    /// a gradient edge, and the node requires grad if any operand does.
    pub(crate) fn alloc_op(
        &mut self,
        kind: ExprKind,
        operands: &[NodeId],
        with_grad: bool,
        shape: Vec<usize>,
    ) -> Result<NodeId, ElevenError> {
        let mut inputs = Vec::with_capacity(operands.len());
        let mut requires_grad = false;
        for &operand in operands {
            let edge = self.counted_edge(operand, with_grad)?;
            requires_grad |= edge.carries_grad();
            inputs.push(edge);
        }
        Ok(self.alloc_slot_raw(kind, inputs, shape, requires_grad))
    }

    /// Registers a new consumer of `target`. The caller stores the edge.
    pub(crate) fn counted_edge(&mut self, target: NodeId, with_grad: bool) -> Result<Edge, ElevenError> {
        let version = self.tensor_version(target)?;
        let slot = self.slot_mut(target)?;
        let carries = with_grad && slot.requires_grad;
        slot.refcount += 1;
        if carries {
            slot.gradcount += 1;
        }
        Ok(Edge {
            target,
            control: Control::Counted { with_grad: carries },
            version: if carries { version } else { None },
            delivered: false,
        })
    }

    /// Allocates a helper living until the enclosing backward scope ends.
    pub(crate) fn alloc_scoped(&mut self, kind: ExprKind, operands: &[NodeId], shape: Vec<usize>) -> NodeId {
        let inputs = operands
            .iter()
            .map(|&target| Edge {
                target,
                control: Control::Uncontrolled,
                version: None,
                delivered: false,
            })
            .collect();
        if let ExprKind::Tensor(t) = &kind {
            self.retain_buffer(t.buffer);
        }
        let id = self.insert_slot(Slot {
            kind,
            inputs,
            shape,
            requires_grad: false,
            refcount: 0,
            gradcount: 0,
            join: None,
            ownership: Ownership::Scoped,
        });
        self.scope.push(id);
        id
    }

    /// Runs `f` and frees every scoped helper it allocated.
    pub(crate) fn scoped<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, ElevenError>,
    ) -> Result<R, ElevenError> {
        let mark = self.scope.len();
        let result = f(self);
        while self.scope.len() > mark {
            if let Some(id) = self.scope.pop() {
                if let Some(slot) = self.nodes[id.0].take() {
                    self.free_nodes.push(id.0);
                    if let ExprKind::Tensor(t) = slot.kind {
                        self.release_buffer(t.buffer);
                    }
                }
            }
        }
        result
    }

    pub(crate) fn retain(&mut self, id: NodeId) {
        if let Some(Some(slot)) = self.nodes.get_mut(id.0) {
            slot.refcount += 1;
        }
    }

    /// Drops one reference and destroys every node whose count reaches zero.
    pub(crate) fn release(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let Some(Some(slot)) = self.nodes.get_mut(id.0) else {
                continue;
            };
            if slot.ownership == Ownership::Scoped {
                continue;
            }
            slot.refcount = slot.refcount.saturating_sub(1);
            if slot.refcount > 0 {
                continue;
            }
            let Some(slot) = self.nodes[id.0].take() else {
                continue;
            };
            self.free_nodes.push(id.0);
            for edge in slot.inputs {
                if let Control::Counted { .. } = edge.control {
                    self.unregister_consumer(&edge);
                    pending.push(edge.target);
                }
            }
            if let ExprKind::Tensor(t) = slot.kind {
                self.release_buffer(t.buffer);
            }
        }
    }

    /// Withdraws the gradient contribution an edge promised but never sent.
    pub(crate) fn unregister_consumer(&mut self, edge: &Edge) {
        if edge.carries_grad() && !edge.delivered {
            if let Some(Some(target)) = self.nodes.get_mut(edge.target.0) {
                target.gradcount = target.gradcount.saturating_sub(1);
            }
        }
    }

    // --- Buffers ---

    pub(crate) fn alloc_buffer(&mut self, data: Vec<f32>) -> BufferId {
        let buffer = Buffer::new(data);
        match self.free_buffers.pop() {
            Some(index) => {
                self.buffers[index] = Some(buffer);
                BufferId(index)
            }
            None => {
                self.buffers.push(Some(buffer));
                BufferId(self.buffers.len() - 1)
            }
        }
    }

    pub(crate) fn buffer(&self, id: BufferId) -> Result<&Buffer, ElevenError> {
        self.buffers
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| ElevenError::InternalError(format!("dangling buffer {}", id.0)))
    }

    pub(crate) fn buffer_mut(&mut self, id: BufferId) -> Result<&mut Buffer, ElevenError> {
        self.buffers
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| ElevenError::InternalError(format!("dangling buffer {}", id.0)))
    }

    pub(crate) fn live_buffer(&self, id: BufferId) -> &Buffer {
        match self.buffers.get(id.0).and_then(Option::as_ref) {
            Some(buffer) => buffer,
            None => unreachable!("buffer {} released while viewed", id.0),
        }
    }

    pub(crate) fn retain_buffer(&mut self, id: BufferId) {
        if let Some(Some(buffer)) = self.buffers.get_mut(id.0) {
            buffer.holders += 1;
        }
    }

    pub(crate) fn release_buffer(&mut self, id: BufferId) {
        let mut next = Some(id);
        while let Some(id) = next.take() {
            let Some(Some(buffer)) = self.buffers.get_mut(id.0) else {
                continue;
            };
            buffer.holders = buffer.holders.saturating_sub(1);
            if buffer.holders == 0 {
                if let Some(buffer) = self.buffers[id.0].take() {
                    self.free_buffers.push(id.0);
                    next = buffer.grad;
                }
            }
        }
    }

    /// Gradient buffer of `data`, allocated (zeroed) on first use.
    pub(crate) fn grad_buffer(&mut self, data: BufferId) -> Result<BufferId, ElevenError> {
        let buffer = self.buffer(data)?;
        if let Some(grad) = buffer.grad {
            return Ok(grad);
        }
        let len = buffer.len();
        let grad = self.alloc_buffer(vec![0.0; len]);
        self.retain_buffer(grad);
        self.buffer_mut(data)?.grad = Some(grad);
        Ok(grad)
    }

    /// Current version of a tensor node's buffer; `None` for expressions.
    pub(crate) fn tensor_version(&self, id: NodeId) -> Result<Option<u64>, ElevenError> {
        match self.slot(id)?.tensor() {
            Some(t) => Ok(Some(self.buffer(t.buffer)?.version())),
            None => Ok(None),
        }
    }

    // --- Evaluation ---

    /// Evaluates every coordinate of `shape` (which `id` must broadcast to),
    /// in row-major order.
    pub(crate) fn collect(&self, id: NodeId, shape: &[usize]) -> Vec<f32> {
        let mut values = Vec::with_capacity(dsize(shape));
        for_each_coord(shape, |coords| values.push(self.eval(id, coords)));
        values
    }

    /// Writes row-major `values` through a tensor view.
    pub(crate) fn write_values(&mut self, id: NodeId, values: &[f32], tracked: bool) -> Result<(), ElevenError> {
        let slot = self.slot(id)?;
        let t = slot
            .tensor()
            .ok_or_else(|| ElevenError::NodeKindMismatch("write target is not a tensor".to_string()))?;
        let (buffer_id, offset, strides, shape) = (t.buffer, t.offset, t.strides.clone(), slot.shape.clone());
        if tracked {
            self.detach_producer(id)?;
        }
        let buffer = self.buffer_mut(buffer_id)?;
        let mut index = 0;
        for_each_coord(&shape, |coords| {
            buffer.data[offset + broadcast_offset(&shape, &strides, coords)] = values[index];
            index += 1;
        });
        if tracked {
            buffer.version_forward();
        }
        Ok(())
    }

    /// Turns a produced tensor back into a leaf before an in-place write,
    /// releasing its producer. Other origins are left alone.
    pub(crate) fn detach_producer(&mut self, id: NodeId) -> Result<(), ElevenError> {
        let slot = self.slot_mut(id)?;
        match &mut slot.kind {
            ExprKind::Tensor(t) if matches!(t.origin, Origin::Produced { .. }) => t.origin = Origin::Leaf,
            _ => return Ok(()),
        }
        log::debug!("in-place write detaches tensor {} from its producer", id.0);
        for edge in std::mem::take(&mut slot.inputs) {
            self.unregister_consumer(&edge);
            self.release(edge.target);
        }
        Ok(())
    }

    // --- Backward protocol ---

    /// Seeds a gradient of ones at a tensor node and runs the backward pass.
    pub(crate) fn backward_from(&mut self, root: NodeId, snapshot: Option<u64>) -> Result<(), ElevenError> {
        let slot = self.slot(root)?;
        let Some(tensor) = slot.tensor() else {
            return Err(ElevenError::NodeKindMismatch(
                "backward() requires a node wrapping a materialized tensor".to_string(),
            ));
        };
        if !slot.requires_grad {
            return Err(ElevenError::TensorNoGrad);
        }
        let current = self.buffer(tensor.buffer)?.version();
        if let Some(recorded) = snapshot {
            if recorded != current {
                return Err(ElevenError::StaleTensor { recorded, current });
            }
        }
        if slot.gradcount > 0 {
            return Err(ElevenError::GradientPending { pending: slot.gradcount });
        }
        if slot.inputs.first().map_or(false, |edge| edge.delivered) {
            return Err(ElevenError::BackwardTwice);
        }
        let shape = slot.shape.clone();
        log::debug!("backward from tensor of shape {:?}", shape);
        self.scoped(|arena| {
            let seed = arena.alloc_scoped(ExprKind::Constant { value: 1.0 }, &[], shape);
            arena.accumulate_grad(root, seed)?;
            arena.fire_tensor(root)
        })
    }

    /// Sends a contribution through `consumer.inputs[index]`.
    pub(crate) fn deliver(&mut self, consumer: NodeId, index: usize, incoming: Incoming) -> Result<(), ElevenError> {
        let edge = self
            .slot_mut(consumer)?
            .inputs
            .get_mut(index)
            .ok_or_else(|| ElevenError::InternalError(format!("missing input {}", index)))?;
        if !edge.carries_grad() {
            return Ok(());
        }
        if edge.delivered {
            return Err(ElevenError::BackwardTwice);
        }
        edge.delivered = true;
        let (target, recorded) = (edge.target, edge.version);
        if let (Some(recorded), Some(current)) = (recorded, self.tensor_version(target)?) {
            if recorded != current {
                return Err(ElevenError::StaleTensor { recorded, current });
            }
        }
        log::trace!("deliver gradient {} -> {}", consumer.0, target.0);
        self.receive(target, incoming)
    }

    fn receive(&mut self, target: NodeId, incoming: Incoming) -> Result<(), ElevenError> {
        let is_tensor = self.slot(target)?.tensor().is_some();
        if is_tensor {
            if let Incoming::Value(value) = incoming {
                self.accumulate_grad(target, value)?;
            }
            if self.count_down(target)? {
                self.fire_tensor(target)?;
            }
            return Ok(());
        }

        let Incoming::Value(value) = incoming else {
            return Err(ElevenError::InternalError(
                "accumulated gradient signal sent to an expression".to_string(),
            ));
        };
        let ready = self.count_down(target)?;
        let pass_through = ready
            && self.slot(target)?.join.is_none()
            && self.slot(value)?.shape == self.slot(target)?.shape;
        if pass_through {
            return self.fire_expr(target, Some(value));
        }
        self.accumulate_join(target, value)?;
        if ready {
            self.fire_expr(target, None)?;
        }
        Ok(())
    }

    /// Consumes one expected contribution; true when the join is complete.
    fn count_down(&mut self, id: NodeId) -> Result<bool, ElevenError> {
        let slot = self.slot_mut(id)?;
        slot.gradcount = slot.gradcount.checked_sub(1).ok_or_else(|| {
            ElevenError::InternalError("gradient received by a node with no pending consumers".to_string())
        })?;
        if slot.gradcount == 0 {
            log::trace!("join fired at node {}", id.0);
        }
        Ok(slot.gradcount == 0)
    }

    /// Forwards a tensor's completed gradient along its origin edge.
    fn fire_tensor(&mut self, id: NodeId) -> Result<(), ElevenError> {
        let slot = self.slot(id)?;
        let Some(tensor) = slot.tensor() else {
            return Err(ElevenError::InternalError("fire_tensor on an expression".to_string()));
        };
        let (origin, buffer, strides, offset, shape) = (
            tensor.origin,
            tensor.buffer,
            tensor.strides.clone(),
            tensor.offset,
            slot.shape.clone(),
        );
        match origin {
            Origin::Leaf => Ok(()),
            Origin::View => self.deliver(id, 0, Incoming::Accumulated),
            Origin::Produced { version: recorded } => {
                let current = self.buffer(buffer)?.version();
                if recorded != current {
                    return Err(ElevenError::StaleTensor { recorded, current });
                }
                self.scoped(|arena| {
                    let grad = arena.grad_buffer(buffer)?;
                    let view = arena.alloc_scoped(
                        ExprKind::Tensor(TensorSlot {
                            buffer: grad,
                            strides,
                            offset,
                            origin: Origin::Leaf,
                        }),
                        &[],
                        shape,
                    );
                    arena.deliver(id, 0, Incoming::Value(view))
                })
            }
        }
    }

    /// Applies an expression's backward rule to its completed gradient,
    /// either `grad` or the joined sum.
    fn fire_expr(&mut self, id: NodeId, grad: Option<NodeId>) -> Result<(), ElevenError> {
        self.scoped(|arena| {
            let grad = match grad {
                Some(grad) => grad,
                None => {
                    let slot = arena.slot_mut(id)?;
                    let data = slot.join.take().unwrap_or_default();
                    let shape = slot.shape.clone();
                    let strides = calculate_strides(&shape);
                    arena.alloc_scoped(ExprKind::Dense { data, strides }, &[], shape)
                }
            };
            let terms = crate::autograd::backward_op::gradient_terms(arena, id, grad)?;
            for (index, incoming) in terms {
                arena.deliver(id, index, incoming)?;
            }
            Ok(())
        })
    }

    /// Adds `value` into a tensor's gradient region, summing over any
    /// dimensions the tensor was broadcast along.
    fn accumulate_grad(&mut self, target: NodeId, value: NodeId) -> Result<(), ElevenError> {
        let slot = self.slot(target)?;
        let Some(tensor) = slot.tensor() else {
            return Err(ElevenError::InternalError("gradient accumulation into an expression".to_string()));
        };
        let (buffer, strides, offset, shape) = (tensor.buffer, tensor.strides.clone(), tensor.offset, slot.shape.clone());
        let updates = self.reduced_updates(value, &shape, &strides)?;
        let grad = self.grad_buffer(buffer)?;
        let grad = self.buffer_mut(grad)?;
        for (position, v) in updates {
            grad.data[offset + position] += v;
        }
        Ok(())
    }

    fn accumulate_join(&mut self, target: NodeId, value: NodeId) -> Result<(), ElevenError> {
        let shape = self.shape_of(target)?;
        let strides = calculate_strides(&shape);
        let updates = self.reduced_updates(value, &shape, &strides)?;
        let slot = self.slot_mut(target)?;
        let join = slot.join.get_or_insert_with(|| vec![0.0; dsize(&shape)]);
        for (position, v) in updates {
            join[position] += v;
        }
        Ok(())
    }

    /// Evaluates `value` over its own shape and maps every element onto the
    /// layout (`shape`, `strides`) it reduces into.
    fn reduced_updates(
        &self,
        value: NodeId,
        shape: &[usize],
        strides: &[usize],
    ) -> Result<Vec<(usize, f32)>, ElevenError> {
        let value_shape = self.shape_of(value)?;
        if !crate::tensor::broadcast_utils::broadcasts_to(shape, &value_shape) {
            return Err(ElevenError::ShapeMismatch {
                expected: shape.to_vec(),
                actual: value_shape,
                operation: "gradient accumulation".to_string(),
            });
        }
        let mut updates = Vec::with_capacity(dsize(&value_shape));
        for_each_coord(&value_shape, |coords| {
            updates.push((broadcast_offset(shape, strides, coords), self.eval(value, coords)));
        });
        Ok(updates)
    }
}
