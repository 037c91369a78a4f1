//! Reverse-mode differentiation over the expression arena.
//!
//! [`graph`] holds the arena and the backward protocol (reference and
//! gradient counters, fan-in joins, delivery). Per-operator gradient rules
//! live in `backward_op`. [`grad_check`] compares them against finite
//! differences.

pub(crate) mod backward_op;
pub(crate) mod expr_kind;
pub mod grad_check;
pub mod graph;

pub use grad_check::{check_grad, GradCheckConfig, GradCheckError};
pub use graph::{live_buffers, live_nodes, NodeId};
