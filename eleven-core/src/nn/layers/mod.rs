// src/nn/layers/mod.rs

pub mod activation;
pub mod conv;
pub mod flatten;
pub mod linear;
pub mod max_pool;

pub use activation::{ReLU, Sigmoid};
pub use conv::{Conv2d, Conv2dOptions};
pub use flatten::Flatten;
pub use linear::Linear;
pub use max_pool::MaxPool2d;
