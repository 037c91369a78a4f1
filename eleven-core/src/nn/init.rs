// src/nn/init.rs

//! In-place parameter initializers. Every initializer is a tracked write:
//! it bumps the tensor's version.

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::error::ElevenError;
use crate::tensor::Tensor;

/// Fills `tensor` with samples from `U(low, high)`.
///
/// # Errors
/// `InvalidArgument` unless `low < high`.
pub fn uniform_<R: Rng + ?Sized>(tensor: &Tensor, low: f32, high: f32, rng: &mut R) -> Result<(), ElevenError> {
    if !(low < high) {
        return Err(ElevenError::InvalidArgument(format!(
            "uniform_ needs low < high, got [{}, {})",
            low, high
        )));
    }
    let dist = Uniform::new(low, high);
    let values: Vec<f32> = (0..tensor.numel()).map(|_| dist.sample(rng)).collect();
    tensor.copy_from_slice(&values)
}

/// Fills `tensor` with `value`.
pub fn constant_(tensor: &Tensor, value: f32) -> Result<(), ElevenError> {
    tensor.fill(value)
}

/// Kaiming (He) uniform initialization for ReLU networks:
/// `U(-b, b)` with `b = sqrt(6 / fan_in)`.
pub fn kaiming_uniform_<R: Rng + ?Sized>(tensor: &Tensor, fan_in: usize, rng: &mut R) -> Result<(), ElevenError> {
    if fan_in == 0 {
        return Err(ElevenError::InvalidArgument("kaiming_uniform_ needs fan_in > 0".to_string()));
    }
    let bound = (6.0 / fan_in as f32).sqrt();
    uniform_(tensor, -bound, bound, rng)
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
