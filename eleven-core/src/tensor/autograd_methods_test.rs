use crate::error::ElevenError;
use crate::ops::arithmetic::mul_op;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_grad_requires_flag() -> Result<(), ElevenError> {
    let t = create_test_tensor(vec![1.0], &[1]);
    assert!(matches!(t.grad(), Err(ElevenError::TensorNoGrad)));
    t.set_requires_grad(true)?;
    check_tensor_near(&t.grad()?, &[1], &[0.0], 1e-6);
    Ok(())
}

#[test]
fn test_set_requires_grad_only_on_leaf() -> Result<(), ElevenError> {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0], &[2]);
    let y = mul_op(&x.node(), &x.node())?.materialize()?.tensor()?;
    assert!(!y.is_leaf());
    assert!(matches!(y.set_requires_grad(false), Err(ElevenError::InvalidArgument(_))));
    Ok(())
}

#[test]
fn test_gradients_accumulate_until_zeroed() -> Result<(), ElevenError> {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0], &[2]);
    for _ in 0..2 {
        let out = mul_op(&x.node(), &x.node())?.materialize()?;
        out.backward()?;
    }
    check_tensor_near(&x.grad()?, &[2], &[4.0, 8.0], 1e-6);
    x.zero_grad()?;
    check_tensor_near(&x.grad()?, &[2], &[0.0, 0.0], 1e-6);
    Ok(())
}

#[test]
fn test_grad_tensor_writes_through() -> Result<(), ElevenError> {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0], &[2]);
    let g = x.grad()?;
    assert!(!g.requires_grad());
    g.fill(3.0)?;
    check_tensor_near(&x.grad()?, &[2], &[3.0, 3.0], 1e-6);
    Ok(())
}
