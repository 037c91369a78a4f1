use super::CrossEntropyLoss;
use crate::autograd::grad_check::{check_grad, GradCheckConfig};
use crate::error::ElevenError;
use crate::utils::testing::{create_test_tensor, create_test_tensor_with_grad};
use approx::assert_relative_eq;

#[test]
fn test_uniform_scores_give_log_classes() -> Result<(), ElevenError> {
    let scores = create_test_tensor_with_grad(vec![0.0; 8], &[2, 4]);
    let target = create_test_tensor(vec![1.0, 3.0], &[2]);
    let loss = CrossEntropyLoss::new().forward(&scores.node(), &target)?;
    assert_relative_eq!(loss.tensor()?.item()?, 4.0f32.ln(), epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_cross_entropy_grad_check() -> Result<(), Box<dyn std::error::Error>> {
    let scores = create_test_tensor_with_grad(vec![0.3, -0.2, 1.0, 0.5, 0.0, -1.0], &[2, 3]);
    let target = create_test_tensor(vec![2.0, 0.0], &[2]);
    let loss = CrossEntropyLoss::new();
    check_grad(|n| loss.forward(&n[0], &target), &[scores], &GradCheckConfig::default())?;
    Ok(())
}
