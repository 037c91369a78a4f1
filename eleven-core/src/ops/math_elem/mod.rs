// src/ops/math_elem/mod.rs

pub mod abs;

pub use abs::abs_op;
