use std::fmt::Debug;

/// Index of a buffer in the thread-local arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) usize);

/// A fixed-size element buffer shared by every tensor view over it.
///
/// Views never copy the buffer: they hold its `BufferId` plus their own
/// offset and strides. The mutation version lives here, so all views of one
/// buffer observe the same counter.
#[derive(Debug, Clone)]
pub(crate) struct Buffer {
    pub(crate) data: Vec<f32>,
    version: u64,
    /// Number of tensor slots currently viewing this buffer.
    pub(crate) holders: usize,
    /// Gradient accumulator, same length as `data`. A view's gradient region
    /// is found at the view's own offset and strides inside it.
    pub(crate) grad: Option<BufferId>,
}

impl Buffer {
    pub(crate) fn new(data: Vec<f32>) -> Self {
        Buffer {
            data,
            version: 0,
            holders: 0,
            grad: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    /// Must be called after every tracked element write.
    pub(crate) fn version_forward(&mut self) {
        self.version += 1;
    }
}
