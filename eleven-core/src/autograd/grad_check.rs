use thiserror::Error;

use crate::error::ElevenError;
use crate::node::Node;
use crate::ops::arithmetic::mul_op;
use crate::tensor::iter_utils::for_each_coord;
use crate::tensor::Tensor;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical_grad} != numerical {numerical_grad} (difference {difference})")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}")]
    NumericalGradNaNOrInfinite { input_index: usize, element_index: usize },
    #[error("Gradient check input {input_index} must be a leaf tensor")]
    InputNotLeaf { input_index: usize },
    #[error("Function output does not require grad although an input does")]
    RequiresGradPropagationError,
    #[error("Tensor error during gradient check: {0}")]
    TensorError(#[from] ElevenError),
}

/// Finite-difference settings for [`check_grad`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheckConfig {
    /// Perturbation applied on each side of an element.
    pub epsilon: f32,
    /// Accepted absolute difference.
    pub abs_tolerance: f64,
    /// Accepted difference relative to the larger gradient magnitude.
    pub rel_tolerance: f64,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        GradCheckConfig {
            epsilon: 1e-2,
            abs_tolerance: 1e-3,
            rel_tolerance: 1e-2,
        }
    }
}

/// Checks analytical gradients against central differences.
///
/// `func` builds the expression under test from graph handles of `inputs`.
/// The scalar objective is `Σ w ⊙ func(inputs)` with fixed non-uniform
/// weights `w`, so a rule that mixes up output positions fails too. Every
/// input that requires grad must be a leaf; each is perturbed element by
/// element (without bumping its version) and restored afterwards. Input
/// gradients are zeroed before and hold the analytical gradient after.
pub fn check_grad<F>(func: F, inputs: &[Tensor], config: &GradCheckConfig) -> Result<(), GradCheckError>
where
    F: Fn(&[Node]) -> Result<Node, ElevenError>,
{
    for (input_index, input) in inputs.iter().enumerate() {
        if input.requires_grad() {
            if !input.is_leaf() {
                return Err(GradCheckError::InputNotLeaf { input_index });
            }
            input.zero_grad()?;
        }
    }

    // --- Analytical pass ---
    let analytical = {
        let nodes: Vec<Node> = inputs.iter().map(Node::from).collect();
        let output = func(&nodes)?;
        if inputs.iter().any(Tensor::requires_grad) && !output.requires_grad() {
            return Err(GradCheckError::RequiresGradPropagationError);
        }
        let weights = objective_weights(&output.shape())?;
        let objective = mul_op(&output, &weights.node())?.materialize()?;
        objective.backward()?;
        inputs
            .iter()
            .map(|input| -> Result<Option<Vec<f32>>, ElevenError> {
                if input.requires_grad() {
                    Ok(Some(input.grad()?.to_vec()))
                } else {
                    Ok(None)
                }
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    // --- Numerical pass ---
    let eps = config.epsilon;
    for (input_index, input) in inputs.iter().enumerate() {
        let Some(analytical) = &analytical[input_index] else {
            continue;
        };
        let mut coords = Vec::with_capacity(input.numel());
        for_each_coord(&input.shape(), |c| coords.push(c.to_vec()));
        for (element_index, c) in coords.iter().enumerate() {
            let original = input.get(c)?;
            input.write_untracked(c, original + eps)?;
            let plus = weighted_output(&func, inputs);
            input.write_untracked(c, original - eps)?;
            let minus = weighted_output(&func, inputs);
            input.write_untracked(c, original)?;
            let (plus, minus) = (plus?, minus?);

            let numerical = (plus - minus) / (2.0 * eps as f64);
            if !numerical.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index,
                    element_index,
                });
            }
            let analytical_grad = analytical[element_index] as f64;
            let difference = (analytical_grad - numerical).abs();
            let scale = analytical_grad.abs().max(numerical.abs());
            if difference > config.abs_tolerance + config.rel_tolerance * scale {
                return Err(GradCheckError::GradientMismatch {
                    input_index,
                    element_index,
                    analytical_grad,
                    numerical_grad: numerical,
                    difference,
                });
            }
        }
        log::debug!("gradient check passed for input {}", input_index);
    }
    Ok(())
}

/// Weights `1 + 0.1 · (i mod 7)` over a row-major enumeration of `shape`.
fn objective_weights(shape: &[usize]) -> Result<Tensor, ElevenError> {
    let numel: usize = shape.iter().product();
    let data = (0..numel).map(|i| 1.0 + 0.1 * (i % 7) as f32).collect();
    Tensor::from_vec(data, shape, false)
}

fn weighted_output<F>(func: &F, inputs: &[Tensor]) -> Result<f64, ElevenError>
where
    F: Fn(&[Node]) -> Result<Node, ElevenError>,
{
    let nodes: Vec<Node> = inputs.iter().map(Node::from).collect();
    let values = func(&nodes)?.expr().materialize()?.to_vec();
    Ok(values
        .iter()
        .enumerate()
        .map(|(i, &v)| v as f64 * (1.0 + 0.1 * (i % 7) as f64))
        .sum())
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;
