use crate::error::ElevenError;

/// Trait defining the common interface for all optimizers.
///
/// Optimizers are responsible for updating model parameters based on their gradients.
pub trait Optimizer {
    /// Performs a single optimization step.
    ///
    /// Each update is a tracked in-place write, so graphs recorded before
    /// the step can no longer run backward through the parameters.
    fn step(&mut self) -> Result<(), ElevenError>;

    /// Clears the gradients of all parameters managed by the optimizer.
    ///
    /// Gradients accumulate across backward passes, so this is typically
    /// called once per training iteration.
    fn zero_grad(&mut self) -> Result<(), ElevenError>;
}
