// src/tensor/debug.rs
use crate::autograd::expr_kind::ExprKind;
use crate::autograd::graph::with_arena;
use crate::tensor::Tensor;
use std::fmt;

/// Elements shown before the data preview is cut off.
const PREVIEW_LEN: usize = 16;

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (_, layout, requires_grad) = self.parts();
        let (origin, version) = with_arena(|arena| {
            let slot = arena.live(self.id());
            match &slot.kind {
                ExprKind::Tensor(t) => (Some(t.origin), arena.live_buffer(t.buffer).version()),
                _ => (None, 0),
            }
        });
        let data = self.to_vec();
        let preview = &data[..data.len().min(PREVIEW_LEN)];
        write!(
            f,
            "Tensor(shape={:?}, strides={:?}, offset={}, requires_grad={}, origin={:?}, version={}, data={:?}{})",
            layout.shape,
            layout.strides,
            layout.offset,
            requires_grad,
            origin,
            version,
            preview,
            if data.len() > PREVIEW_LEN { " ..." } else { "" }
        )
    }
}
