use super::mean_op;
use crate::error::ElevenError;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_mean_along_each_dim() -> Result<(), ElevenError> {
    let t = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let rows = mean_op(&t.expr(), 0)?.materialize()?;
    check_tensor_near(&rows, &[3], &[2.5, 3.5, 4.5], 1e-6);
    let cols = mean_op(&t.expr(), 1)?.materialize()?;
    check_tensor_near(&cols, &[2], &[2.0, 5.0], 1e-6);
    Ok(())
}

#[test]
fn test_mean_rank1_keeps_one_element() -> Result<(), ElevenError> {
    let t = create_test_tensor(vec![1.0, 2.0, 6.0], &[3]);
    let m = mean_op(&t.expr(), 0)?.materialize()?;
    check_tensor_near(&m, &[1], &[3.0], 1e-6);
    Ok(())
}

#[test]
fn test_mean_invalid_dim() {
    let t = create_test_tensor(vec![1.0, 2.0], &[2]);
    assert!(matches!(mean_op(&t.expr(), 1), Err(ElevenError::DimNotExist { dim: 1, rank: 1 })));
}

#[test]
fn test_mean_backward_spreads_evenly() -> Result<(), ElevenError> {
    let t = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let out = mean_op(&t.node(), 1)?.materialize()?;
    out.backward()?;
    let third = 1.0 / 3.0;
    check_tensor_near(&t.grad()?, &[2, 3], &[third; 6], 1e-6);
    Ok(())
}

#[test]
fn test_mean_of_mean_backward() -> Result<(), ElevenError> {
    let t = create_test_tensor_with_grad(vec![1.0; 8], &[2, 4]);
    let out = mean_op(&mean_op(&t.node(), 1)?, 0)?.materialize()?;
    check_tensor_near(&out.tensor()?, &[1], &[1.0], 1e-6);
    out.backward()?;
    check_tensor_near(&t.grad()?, &[2, 4], &[0.125; 8], 1e-6);
    Ok(())
}
