//! Ready-made networks for 28x28 digit classification.

pub mod lenet;
pub mod sequential;
pub mod triple_linear;

pub use lenet::LeNet;
pub use sequential::Sequential;
pub use triple_linear::TripleLinear;
