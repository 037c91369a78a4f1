// src/ops/pooling/mod.rs

pub mod max_pool2d;

pub use max_pool2d::max_pool2d_op;
