// src/ops/activation/mod.rs

//! # Activation Functions
//!
//! Element-wise non-linearities. Both keep the input shape.
//!
//! - [`relu_op`]: `max(x, 0)`.
//! - [`sigmoid_op`]: `1 / (1 + e^-x)`.

pub mod relu;
pub mod sigmoid;

pub use relu::relu_op;
pub use sigmoid::sigmoid_op;
