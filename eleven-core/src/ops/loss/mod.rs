// src/ops/loss/mod.rs

//! # Loss Functions
//!
//! Classification losses over `(batch, classes)` score matrices:
//! - [`log_softmax_op`]: row-wise log-probabilities.
//! - [`nll_loss_op`]: negative log-likelihood of integer targets, averaged
//!   over the batch.
//!
//! Chained, they form the cross-entropy loss used by
//! [`CrossEntropyLoss`](crate::nn::CrossEntropyLoss).

pub mod log_softmax;
pub mod nll_loss;

pub use log_softmax::log_softmax_op;
pub use nll_loss::nll_loss_op;
