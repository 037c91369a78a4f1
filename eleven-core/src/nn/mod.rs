// src/nn/mod.rs

//! Layers, losses and parameter initializers built on the operator algebra.
//!
//! Layers consume and produce [`Node`](crate::Node)s, so a forward pass
//! records the graph that `backward` later walks. Parameters are plain leaf
//! tensors that require grad.

pub mod init;
pub mod layers;
pub mod losses;
pub mod module;

pub use layers::{Conv2d, Conv2dOptions, Flatten, Linear, MaxPool2d, ReLU, Sigmoid};
pub use losses::CrossEntropyLoss;
pub use module::Module;
