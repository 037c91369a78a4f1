use crate::autograd::expr_kind::Origin;
use crate::autograd::graph::with_arena;
use crate::error::ElevenError;
use crate::tensor::utils::{calculate_strides, check_dim, dsize, is_contiguous_layout};
use crate::tensor::Tensor;

/// Shape, strides and starting offset of a view into a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) shape: Vec<usize>,
    pub(crate) strides: Vec<usize>,
    pub(crate) offset: usize,
}

impl Layout {
    pub(crate) fn contiguous(shape: Vec<usize>) -> Self {
        let strides = calculate_strides(&shape);
        Layout {
            shape,
            strides,
            offset: 0,
        }
    }

    /// Selects `index` along `dim` and drops that dimension.
    pub(crate) fn slice(&self, index: usize, dim: usize) -> Result<Layout, ElevenError> {
        check_dim(dim, self.shape.len())?;
        let extent = self.shape[dim];
        if index >= extent {
            return Err(ElevenError::IndexOutOfRange { index, dim, extent });
        }
        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        let offset = self.offset + index * strides[dim];
        shape.remove(dim);
        strides.remove(dim);
        Ok(Layout { shape, strides, offset })
    }

    /// Keeps `[start, end)` along `dim`.
    pub(crate) fn slice_range(&self, start: usize, end: usize, dim: usize) -> Result<Layout, ElevenError> {
        check_dim(dim, self.shape.len())?;
        let extent = self.shape[dim];
        if end > extent {
            return Err(ElevenError::IndexOutOfRange { index: end, dim, extent });
        }
        if start > end {
            return Err(ElevenError::IndexOutOfRange { index: start, dim, extent: end });
        }
        let mut layout = self.clone();
        if start < end {
            layout.offset += start * self.strides[dim];
        }
        layout.shape[dim] = end - start;
        Ok(layout)
    }

    pub(crate) fn transpose(&self, dim1: usize, dim2: usize) -> Result<Layout, ElevenError> {
        let rank = self.shape.len();
        check_dim(dim1, rank)?;
        check_dim(dim2, rank)?;
        let mut layout = self.clone();
        layout.shape.swap(dim1, dim2);
        layout.strides.swap(dim1, dim2);
        Ok(layout)
    }

    /// Reinterprets a contiguous layout with another shape of equal size.
    pub(crate) fn view(&self, shape: &[usize]) -> Result<Layout, ElevenError> {
        if !is_contiguous_layout(&self.shape, &self.strides) {
            return Err(ElevenError::TensorNotContiguous {
                operation: "view".to_string(),
                shape: self.shape.clone(),
                strides: self.strides.clone(),
            });
        }
        if dsize(shape) != dsize(&self.shape) {
            return Err(ElevenError::SizeNotEqual {
                from: self.shape.clone(),
                to: shape.to_vec(),
            });
        }
        Ok(Layout {
            shape: shape.to_vec(),
            strides: calculate_strides(shape),
            offset: self.offset,
        })
    }

    /// Drops every extent-1 dimension.
    pub(crate) fn squeeze(&self) -> Layout {
        let mut shape = Vec::new();
        let mut strides = Vec::new();
        for (&extent, &stride) in self.shape.iter().zip(&self.strides) {
            if extent != 1 {
                shape.push(extent);
                strides.push(stride);
            }
        }
        Layout {
            shape,
            strides,
            offset: self.offset,
        }
    }

    /// Drops `dim`, which must have extent 1.
    pub(crate) fn squeeze_dim(&self, dim: usize) -> Result<Layout, ElevenError> {
        check_dim(dim, self.shape.len())?;
        if self.shape[dim] != 1 {
            return Err(ElevenError::ShapeMismatch {
                expected: vec![1],
                actual: vec![self.shape[dim]],
                operation: format!("squeeze_dim({})", dim),
            });
        }
        let mut layout = self.clone();
        layout.shape.remove(dim);
        layout.strides.remove(dim);
        Ok(layout)
    }

    /// Inserts an extent-1 dimension before position `dim` (`dim <= rank`).
    pub(crate) fn unsqueeze(&self, dim: usize) -> Result<Layout, ElevenError> {
        let rank = self.shape.len();
        if dim > rank {
            return Err(ElevenError::DimNotExist { dim, rank: rank + 1 });
        }
        let mut layout = self.clone();
        layout.shape.insert(dim, 1);
        layout.strides.insert(dim, 0);
        Ok(layout)
    }
}

impl Tensor {
    /// Builds a zero-copy view sharing this tensor's buffer and gradient
    /// region. With `linked`, the view becomes a gradient consumer of this
    /// tensor and forwards its completed gradient to it.
    fn derive_view(
        &self,
        f: impl FnOnce(&Layout) -> Result<Layout, ElevenError>,
        linked: bool,
    ) -> Result<Tensor, ElevenError> {
        let (buffer, layout, requires_grad) = self.parts();
        let layout = f(&layout)?;
        let base = self.id();
        let id = with_arena(|arena| {
            let link = linked && requires_grad;
            let (origin, inputs) = if link {
                (Origin::View, vec![arena.counted_edge(base, true)?])
            } else {
                (Origin::Leaf, Vec::new())
            };
            Ok::<_, ElevenError>(arena.alloc_tensor(buffer, layout, origin, inputs, requires_grad))
        })?;
        Ok(Tensor::adopt(id))
    }

    pub(crate) fn linked_view(
        &self,
        f: impl FnOnce(&Layout) -> Result<Layout, ElevenError>,
    ) -> Result<Tensor, ElevenError> {
        self.derive_view(f, true)
    }

    /// Selects `index` along `dim`, returning a view of rank one less.
    ///
    /// The view shares storage with `self`; when `self` requires grad, the
    /// view reads and accumulates into the matching region of the same
    /// gradient. The view is graph-inert: use [`crate::Node::slice`] for a view
    /// that forwards gradients to its base.
    ///
    /// # Errors
    /// `DimNotExist` if `dim >= rank`; `IndexOutOfRange` if `index` is outside
    /// `[0, extent)`.
    pub fn slice(&self, index: usize, dim: usize) -> Result<Tensor, ElevenError> {
        self.derive_view(|l| l.slice(index, dim), false)
    }

    /// Keeps the half-open range `[start, end)` along `dim` (same rank).
    pub fn slice_range(&self, start: usize, end: usize, dim: usize) -> Result<Tensor, ElevenError> {
        self.derive_view(|l| l.slice_range(start, end, dim), false)
    }

    /// Swaps two dimensions without moving data.
    pub fn transpose(&self, dim1: usize, dim2: usize) -> Result<Tensor, ElevenError> {
        self.derive_view(|l| l.transpose(dim1, dim2), false)
    }

    /// Reinterprets a contiguous tensor with a new shape of the same size.
    ///
    /// # Errors
    /// `TensorNotContiguous` for non-contiguous layouts and `SizeNotEqual`
    /// when the element counts differ.
    pub fn view(&self, shape: &[usize]) -> Result<Tensor, ElevenError> {
        self.derive_view(|l| l.view(shape), false)
    }

    /// Drops every dimension of extent 1.
    pub fn squeeze(&self) -> Result<Tensor, ElevenError> {
        self.derive_view(|l| Ok(l.squeeze()), false)
    }

    pub fn squeeze_dim(&self, dim: usize) -> Result<Tensor, ElevenError> {
        self.derive_view(|l| l.squeeze_dim(dim), false)
    }

    /// Inserts a dimension of extent 1 at `dim`.
    pub fn unsqueeze(&self, dim: usize) -> Result<Tensor, ElevenError> {
        self.derive_view(|l| l.unsqueeze(dim), false)
    }
}

#[cfg(test)]
#[path = "view_methods_test.rs"]
mod tests;
