use super::{bmm_op, mm_op};
use crate::autograd::grad_check::{check_grad, GradCheckConfig};
use crate::error::ElevenError;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_mm_forward() -> Result<(), ElevenError> {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let b = create_test_tensor(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], &[3, 2]);
    let result = mm_op(&a.expr(), &b.expr())?.materialize()?;
    check_tensor_near(&result, &[2, 2], &[58.0, 64.0, 139.0, 154.0], 1e-4);
    Ok(())
}

#[test]
fn test_mm_inner_dim_mismatch() {
    let a = create_test_tensor(vec![0.0; 6], &[2, 3]);
    let b = create_test_tensor(vec![0.0; 4], &[2, 2]);
    assert!(matches!(mm_op(&a.expr(), &b.expr()), Err(ElevenError::ShapeMismatch { .. })));
}

#[test]
fn test_mm_rank_check() {
    let a = create_test_tensor(vec![0.0; 3], &[3]);
    let b = create_test_tensor(vec![0.0; 3], &[3, 1]);
    assert!(matches!(mm_op(&a.expr(), &b.expr()), Err(ElevenError::DimNotMatch { .. })));
}

#[test]
fn test_mm_backward() -> Result<(), ElevenError> {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let b = create_test_tensor_with_grad(vec![5.0, 6.0, 7.0, 8.0], &[2, 2]);
    let out = mm_op(&a.node(), &b.node())?.materialize()?;
    out.backward()?;
    // ones(2,2) · bᵗ and aᵗ · ones(2,2)
    check_tensor_near(&a.grad()?, &[2, 2], &[11.0, 15.0, 11.0, 15.0], 1e-5);
    check_tensor_near(&b.grad()?, &[2, 2], &[4.0, 4.0, 6.0, 6.0], 1e-5);
    Ok(())
}

#[test]
fn test_mm_grad_check() -> Result<(), Box<dyn std::error::Error>> {
    let a = create_test_tensor_with_grad(vec![0.5, -1.0, 2.0, 0.25, 1.5, -0.5], &[2, 3]);
    let b = create_test_tensor_with_grad(vec![1.0, 0.5, -0.5, 2.0, 0.75, -1.25], &[3, 2]);
    check_grad(|n| mm_op(&n[0], &n[1]), &[a, b], &GradCheckConfig::default())?;
    Ok(())
}

#[test]
fn test_bmm_forward_broadcast_batch() -> Result<(), ElevenError> {
    // (1,2,2) weight times a batch of two (2,1) columns
    let w = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], &[1, 2, 2]);
    let x = create_test_tensor(vec![1.0, 1.0, 2.0, -1.0], &[2, 2, 1]);
    let result = bmm_op(&w.expr(), &x.expr())?.materialize()?;
    check_tensor_near(&result, &[2, 2, 1], &[3.0, 7.0, 0.0, 2.0], 1e-6);
    Ok(())
}

#[test]
fn test_bmm_batch_mismatch() {
    let a = create_test_tensor(vec![0.0; 8], &[2, 2, 2]);
    let b = create_test_tensor(vec![0.0; 12], &[3, 2, 2]);
    assert!(matches!(bmm_op(&a.expr(), &b.expr()), Err(ElevenError::BroadcastError { .. })));
}

#[test]
fn test_bmm_grad_check_shared_weight() -> Result<(), Box<dyn std::error::Error>> {
    let w = create_test_tensor_with_grad(vec![0.5, -1.0, 0.25, 1.5, -0.5, 2.0], &[1, 2, 3]);
    let x = create_test_tensor_with_grad(
        vec![1.0, -0.5, 0.75, 0.2, -1.0, 0.6, 0.3, 0.9, -0.4, 1.1, 0.8, -0.7],
        &[2, 3, 2],
    );
    check_grad(|n| bmm_op(&n[0], &n[1]), &[w, x], &GradCheckConfig::default())?;
    Ok(())
}
