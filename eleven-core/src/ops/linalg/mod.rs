// src/ops/linalg/mod.rs

//! Matrix products, transposition and the patch extraction used by
//! convolutions.

pub mod img2col;
pub mod matmul;
pub mod transpose;

pub use img2col::img2col_op;
pub use matmul::{bmm_op, mm_op};
pub use transpose::transpose_op;
