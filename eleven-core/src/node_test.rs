use crate::autograd::graph::{live_buffers, live_nodes};
use crate::error::ElevenError;
use crate::ops::activation::relu_op;
use crate::ops::arithmetic::{add_op, mul_op, neg_op};
use crate::ops::reduction::mean_op;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};
use crate::Node;

#[test]
fn test_node_from_tensor_records_version() -> Result<(), ElevenError> {
    let t = create_test_tensor_with_grad(vec![1.0, 2.0], &[2]);
    t.set(&[0], 5.0)?;
    let n = Node::from(&t);
    assert!(n.contains_tensor());
    assert_eq!(n.version(), Some(1));
    assert_eq!(n.shape(), vec![2]);
    Ok(())
}

#[test]
fn test_expression_node_has_no_tensor() -> Result<(), ElevenError> {
    let t = create_test_tensor_with_grad(vec![1.0, 2.0], &[2]);
    let sum = add_op(&t.node(), &t.node())?;
    assert!(!sum.contains_tensor());
    assert!(sum.requires_grad());
    assert!(matches!(sum.tensor(), Err(ElevenError::NodeKindMismatch(_))));
    assert!(matches!(sum.backward(), Err(ElevenError::NodeKindMismatch(_))));
    let materialized = sum.to_tensor_node()?;
    assert!(materialized.contains_tensor());
    check_tensor_near(&materialized.tensor()?, &[2], &[2.0, 4.0], 1e-6);
    Ok(())
}

#[test]
fn test_backward_without_grad() {
    let t = create_test_tensor(vec![1.0], &[1]);
    assert!(matches!(t.node().backward(), Err(ElevenError::TensorNoGrad)));
}

#[test]
fn test_backward_twice_rejected() -> Result<(), ElevenError> {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0], &[2]);
    let y = mul_op(&x.node(), &x.node())?.materialize()?;
    y.backward()?;
    assert!(matches!(y.backward(), Err(ElevenError::BackwardTwice)));
    check_tensor_near(&x.grad()?, &[2], &[2.0, 4.0], 1e-6);
    Ok(())
}

#[test]
fn test_backward_waits_for_pending_consumers() -> Result<(), ElevenError> {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0], &[2]);
    let y = mul_op(&x.node(), &x.node())?.materialize()?;
    let consumer = neg_op(&y)?;
    assert!(matches!(y.backward(), Err(ElevenError::GradientPending { pending: 1 })));
    drop(consumer);
    y.backward()?;
    check_tensor_near(&x.grad()?, &[2], &[2.0, 4.0], 1e-6);
    Ok(())
}

#[test]
fn test_stale_root_rejected() -> Result<(), ElevenError> {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0], &[2]);
    let y = mul_op(&x.node(), &x.node())?.materialize()?;
    y.tensor()?.set(&[0], 0.0)?;
    assert!(matches!(y.backward(), Err(ElevenError::StaleTensor { recorded: 0, current: 1 })));
    Ok(())
}

#[test]
fn test_stale_operand_rejected() -> Result<(), ElevenError> {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0], &[2]);
    let y = mul_op(&x.node(), &x.node())?.materialize()?;
    x.set(&[1], 3.0)?;
    assert!(matches!(y.backward(), Err(ElevenError::StaleTensor { .. })));
    Ok(())
}

#[test]
fn test_untracked_write_keeps_graph_valid() -> Result<(), ElevenError> {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0], &[2]);
    let y = mul_op(&x.node(), &x.node())?.materialize()?;
    x.write_untracked(&[1], 3.0)?;
    y.backward()?;
    // gradient rules read the current values
    check_tensor_near(&x.grad()?, &[2], &[2.0, 6.0], 1e-6);
    Ok(())
}

#[test]
fn test_linked_view_forwards_to_base() -> Result<(), ElevenError> {
    let t = create_test_tensor_with_grad(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], &[2, 3]);
    let row = t.node().slice(1, 0)?;
    let out = mul_op(&row, &row)?.materialize()?;
    out.backward()?;
    check_tensor_near(&t.grad()?, &[2, 3], &[0.0, 0.0, 0.0, 6.0, 8.0, 10.0], 1e-6);
    Ok(())
}

#[test]
fn test_linked_reshape_backward() -> Result<(), ElevenError> {
    let t = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let flat = t.node().view(&[4])?;
    let out = mean_op(&flat, 0)?.materialize()?;
    check_tensor_near(&out.tensor()?, &[1], &[2.5], 1e-6);
    out.backward()?;
    check_tensor_near(&t.grad()?, &[2, 2], &[0.25; 4], 1e-6);
    Ok(())
}

#[test]
fn test_graph_released_after_use() -> Result<(), ElevenError> {
    let (nodes, buffers) = (live_nodes(), live_buffers());
    {
        let x = create_test_tensor_with_grad(vec![-1.0, 2.0, 3.0], &[3]);
        let hidden = relu_op(&mul_op(&x.node(), &x.node())?)?.materialize()?;
        let out = mean_op(&hidden, 0)?.materialize()?;
        out.backward()?;
        let _grad = x.grad()?;
        assert!(live_nodes() > nodes);
    }
    assert_eq!(live_nodes(), nodes);
    assert_eq!(live_buffers(), buffers);
    Ok(())
}

#[test]
fn test_squeeze_node_routes_gradient_to_base() -> Result<(), ElevenError> {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0], &[1, 3]);
    let s = x.node().squeeze()?;
    assert_eq!(s.shape(), vec![3]);
    let out = mul_op(&s, &s)?.materialize()?;
    out.backward()?;
    check_tensor_near(&x.grad()?, &[1, 3], &[2.0, 4.0, 6.0], 1e-6);
    Ok(())
}
