use super::max_pool2d_op;
use crate::autograd::grad_check::{check_grad, GradCheckConfig};
use crate::error::ElevenError;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_max_pool2d_forward() -> Result<(), ElevenError> {
    #[rustfmt::skip]
    let x = create_test_tensor(vec![
        1.0, 3.0, 2.0, 0.0,
        4.0, 2.0, 1.0, 5.0,
        0.0, 1.0, 7.0, 6.0,
        2.0, 9.0, 8.0, 1.0,
    ], &[1, 1, 4, 4]);
    let out = max_pool2d_op(&x.expr(), (2, 2))?.materialize()?;
    check_tensor_near(&out, &[1, 1, 2, 2], &[4.0, 5.0, 9.0, 8.0], 1e-6);
    Ok(())
}

#[test]
fn test_max_pool2d_drops_partial_windows() -> Result<(), ElevenError> {
    let x = create_test_tensor((0..15).map(|v| v as f32).collect(), &[1, 1, 3, 5]);
    let out = max_pool2d_op(&x.expr(), (2, 2))?.materialize()?;
    check_tensor_near(&out, &[1, 1, 1, 2], &[6.0, 8.0], 1e-6);
    Ok(())
}

#[test]
fn test_max_pool2d_backward_first_max_wins() -> Result<(), ElevenError> {
    let x = create_test_tensor_with_grad(vec![2.0, 2.0, 1.0, 2.0], &[1, 1, 2, 2]);
    let out = max_pool2d_op(&x.node(), (2, 2))?.materialize()?;
    out.backward()?;
    check_tensor_near(&x.grad()?, &[1, 1, 2, 2], &[1.0, 0.0, 0.0, 0.0], 1e-6);
    Ok(())
}

#[test]
fn test_max_pool2d_kernel_too_large() {
    let x = create_test_tensor(vec![0.0; 4], &[1, 1, 2, 2]);
    assert!(matches!(
        max_pool2d_op(&x.expr(), (3, 1)),
        Err(ElevenError::KernelTooLarge { kernel: 3, extent: 2 })
    ));
}

#[test]
fn test_max_pool2d_grad_check() -> Result<(), Box<dyn std::error::Error>> {
    // distinct values so every window max is well separated
    let data: Vec<f32> = (0..32).map(|i| ((i * 13) % 32) as f32 * 0.25).collect();
    let x = create_test_tensor_with_grad(data, &[2, 1, 4, 4]);
    check_grad(|n| max_pool2d_op(&n[0], (2, 2)), &[x], &GradCheckConfig::default())?;
    Ok(())
}
