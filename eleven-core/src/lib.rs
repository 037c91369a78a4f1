//! # eleven-core
//!
//! A small tensor library with reverse-mode automatic differentiation.
//!
//! - [`Tensor`]: materialized `f32` arrays with zero-copy views.
//! - [`Expr`] and [`Node`]: deferred expressions built by the operators in
//!   [`ops`]. `Expr` computes values only; `Node` also records the
//!   gradient graph so that [`Node::backward`] can fill tensor gradients.
//! - [`nn`], [`optim`] and [`model`]: layers, SGD and reference networks
//!   on top of the operator algebra.
//!
//! All graph state lives in a thread-local arena: handles are `!Send`.

pub mod autograd;
pub mod buffer;
pub mod error;
pub mod model;
pub mod nn;
pub mod node;
pub mod ops;
pub mod optim;
pub mod tensor;
pub mod utils;

pub use error::ElevenError;
pub use node::{Expr, Node, Operand};
pub use tensor::Tensor;
