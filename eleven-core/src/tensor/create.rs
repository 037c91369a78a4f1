// src/tensor/create.rs

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::autograd::expr_kind::Origin;
use crate::autograd::graph::with_arena;
use crate::error::ElevenError;
use crate::tensor::utils::dsize;
use crate::tensor::{Layout, Tensor};

impl Tensor {
    /// Creates a contiguous tensor owning a copy of `data`.
    ///
    /// # Errors
    /// `TensorCreationError` if `data.len()` differs from the product of
    /// `shape`.
    pub fn from_vec(data: Vec<f32>, shape: &[usize], requires_grad: bool) -> Result<Tensor, ElevenError> {
        if data.len() != dsize(shape) {
            return Err(ElevenError::TensorCreationError {
                data_len: data.len(),
                shape: shape.to_vec(),
            });
        }
        let id = with_arena(|arena| {
            let buffer = arena.alloc_buffer(data);
            arena.alloc_tensor(
                buffer,
                Layout::contiguous(shape.to_vec()),
                Origin::Leaf,
                Vec::new(),
                requires_grad,
            )
        });
        Ok(Tensor::adopt(id))
    }

    /// Creates a tensor from a slice (copied).
    pub fn from_slice(data: &[f32], shape: &[usize], requires_grad: bool) -> Result<Tensor, ElevenError> {
        Tensor::from_vec(data.to_vec(), shape, requires_grad)
    }

    /// A single value with shape `[1]`.
    pub fn scalar(value: f32) -> Tensor {
        let id = with_arena(|arena| {
            let buffer = arena.alloc_buffer(vec![value]);
            arena.alloc_tensor(buffer, Layout::contiguous(vec![1]), Origin::Leaf, Vec::new(), false)
        });
        Tensor::adopt(id)
    }
}

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Result<Tensor, ElevenError> {
    full(shape, 0.0)
}

/// Creates a new tensor filled with ones with the specified shape.
pub fn ones(shape: &[usize]) -> Result<Tensor, ElevenError> {
    full(shape, 1.0)
}

/// Creates a new tensor filled with `value`.
pub fn full(shape: &[usize], value: f32) -> Result<Tensor, ElevenError> {
    Tensor::from_vec(vec![value; dsize(shape)], shape, false)
}

/// Zeros with the shape of `tensor`; never requires grad.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, ElevenError> {
    zeros(&tensor.shape())
}

/// Uniform samples in `[0, 1)`.
pub fn rand<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Result<Tensor, ElevenError> {
    let data: Vec<f32> = (0..dsize(shape)).map(|_| rng.gen::<f32>()).collect();
    Tensor::from_vec(data, shape, false)
}

/// Standard normal samples.
pub fn randn<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Result<Tensor, ElevenError> {
    let data: Vec<f32> = (0..dsize(shape)).map(|_| StandardNormal.sample(rng)).collect();
    Tensor::from_vec(data, shape, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_from_vec_length_mismatch() {
        let result = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[2, 2], false);
        assert_eq!(
            result.err(),
            Some(ElevenError::TensorCreationError {
                data_len: 3,
                shape: vec![2, 2]
            })
        );
    }

    #[test]
    fn test_zeros_ones_full() -> Result<(), ElevenError> {
        assert_eq!(zeros(&[2, 2])?.to_vec(), vec![0.0; 4]);
        assert_eq!(ones(&[3])?.to_vec(), vec![1.0; 3]);
        let t = full(&[2, 1], 7.5)?;
        assert_eq!(t.shape(), vec![2, 1]);
        assert_eq!(t.strides(), vec![1, 0]);
        assert_eq!(t.to_vec(), vec![7.5, 7.5]);
        Ok(())
    }

    #[test]
    fn test_scalar_shape() -> Result<(), ElevenError> {
        let s = Tensor::scalar(3.0);
        assert_eq!(s.shape(), vec![1]);
        assert_eq!(s.item()?, 3.0);
        Ok(())
    }

    #[test]
    fn test_seeded_randn_is_deterministic() -> Result<(), ElevenError> {
        let a = randn(&[4], &mut StdRng::seed_from_u64(7))?;
        let b = randn(&[4], &mut StdRng::seed_from_u64(7))?;
        assert_eq!(a.to_vec(), b.to_vec());
        let u = rand(&[16], &mut StdRng::seed_from_u64(1))?;
        assert!(u.to_vec().iter().all(|&v| (0.0..1.0).contains(&v)));
        Ok(())
    }
}
