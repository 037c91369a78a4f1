// src/ops/reduction/mod.rs

//! Reductions along one dimension.
//!
//! The reduced dimension is dropped from the output shape. Reducing a
//! rank-1 input yields shape `[1]`, never a rank-0 result.

pub mod argmax;
pub mod mean;
pub(crate) mod utils;

pub use argmax::argmax_op;
pub use mean::mean_op;
