use super::argmax_op;
use crate::error::ElevenError;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_argmax_rows() -> Result<(), ElevenError> {
    let t = create_test_tensor(vec![0.1, 0.7, 0.2, 0.9, 0.0, 0.9], &[2, 3]);
    let idx = argmax_op(&t.expr(), 1)?.materialize()?;
    // ties resolve to the first index
    check_tensor_near(&idx, &[2], &[1.0, 0.0], 0.0);
    Ok(())
}

#[test]
fn test_argmax_rank1() -> Result<(), ElevenError> {
    let t = create_test_tensor(vec![-3.0, -1.0, -2.0], &[3]);
    let idx = argmax_op(&t.expr(), 0)?.materialize()?;
    check_tensor_near(&idx, &[1], &[1.0], 0.0);
    Ok(())
}

#[test]
fn test_argmax_backward_rejected() -> Result<(), ElevenError> {
    let t = create_test_tensor_with_grad(vec![1.0, 3.0, 2.0], &[3]);
    let out = argmax_op(&t.node(), 0)?.materialize()?;
    assert!(out.requires_grad());
    assert!(matches!(out.backward(), Err(ElevenError::GradNotImplemented { .. })));
    Ok(())
}
