use super::sub_op;
use crate::autograd::grad_check::{check_grad, GradCheckConfig};
use crate::error::ElevenError;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_sub_forward() -> Result<(), ElevenError> {
    let a = create_test_tensor(vec![5.0, 7.0, 9.0], &[3]);
    let b = create_test_tensor(vec![1.0, 2.0, 3.0], &[3]);
    let result = sub_op(&a.expr(), &b.expr())?.materialize()?;
    check_tensor_near(&result, &[3], &[4.0, 5.0, 6.0], 1e-6);
    Ok(())
}

#[test]
fn test_sub_backward_negates_rhs() -> Result<(), ElevenError> {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let b = create_test_tensor_with_grad(vec![1.0, 1.0], &[2, 1]);
    let out = sub_op(&a.node(), &b.node())?.materialize()?;
    check_tensor_near(&out.tensor()?, &[2, 2], &[0.0, 1.0, 2.0, 3.0], 1e-6);
    out.backward()?;
    check_tensor_near(&a.grad()?, &[2, 2], &[1.0; 4], 1e-6);
    check_tensor_near(&b.grad()?, &[2, 1], &[-2.0, -2.0], 1e-6);
    Ok(())
}

#[test]
fn test_sub_grad_check() -> Result<(), Box<dyn std::error::Error>> {
    let a = create_test_tensor_with_grad(vec![0.5, -1.5, 2.0, 0.25, 1.0, -0.75], &[2, 3]);
    let b = create_test_tensor_with_grad(vec![0.1, 0.2, 0.3], &[3]);
    check_grad(|n| sub_op(&n[0], &n[1]), &[a, b], &GradCheckConfig::default())?;
    Ok(())
}
