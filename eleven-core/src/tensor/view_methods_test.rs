use crate::error::ElevenError;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

fn grid() -> crate::Tensor {
    create_test_tensor((0..12).map(|v| v as f32).collect(), &[3, 4])
}

#[test]
fn test_slice_shares_storage() -> Result<(), ElevenError> {
    let t = grid();
    let row = t.slice(1, 0)?;
    check_tensor_near(&row, &[4], &[4.0, 5.0, 6.0, 7.0], 1e-6);
    assert!(row.shares_storage(&t));
    row.set(&[2], 60.0)?;
    assert_eq!(t.get(&[1, 2])?, 60.0);
    // the version is per buffer, so every view sees the write
    assert_eq!(t.version(), 1);

    let col = t.slice(3, 1)?;
    check_tensor_near(&col, &[3], &[3.0, 7.0, 11.0], 1e-6);
    assert_eq!(col.strides(), vec![4]);
    Ok(())
}

#[test]
fn test_slice_errors() {
    let t = grid();
    assert!(matches!(t.slice(3, 0), Err(ElevenError::IndexOutOfRange { index: 3, dim: 0, extent: 3 })));
    assert!(matches!(t.slice(0, 2), Err(ElevenError::DimNotExist { dim: 2, rank: 2 })));
}

#[test]
fn test_slice_range() -> Result<(), ElevenError> {
    let t = grid();
    let block = t.slice_range(1, 3, 1)?;
    check_tensor_near(&block, &[3, 2], &[1.0, 2.0, 5.0, 6.0, 9.0, 10.0], 1e-6);
    assert!(!block.is_contiguous());
    assert!(t.slice_range(2, 5, 1).is_err());
    Ok(())
}

#[test]
fn test_transpose_then_view_requires_contiguous() -> Result<(), ElevenError> {
    let t = grid();
    let tt = t.transpose(0, 1)?;
    assert_eq!(tt.shape(), vec![4, 3]);
    assert_eq!(tt.get(&[3, 1])?, 7.0);
    assert!(matches!(tt.view(&[12]), Err(ElevenError::TensorNotContiguous { .. })));
    Ok(())
}

#[test]
fn test_view_round_trip() -> Result<(), ElevenError> {
    let t = grid();
    let flat = t.view(&[12])?;
    let back = flat.view(&[3, 4])?;
    assert_eq!(back.to_vec(), t.to_vec());
    assert!(back.shares_storage(&t));
    assert!(matches!(t.view(&[5, 2]), Err(ElevenError::SizeNotEqual { .. })));
    Ok(())
}

#[test]
fn test_squeeze_and_unsqueeze() -> Result<(), ElevenError> {
    let t = create_test_tensor(vec![1.0, 2.0, 3.0], &[1, 3, 1]);
    assert_eq!(t.squeeze()?.shape(), vec![3]);
    assert_eq!(t.squeeze_dim(0)?.shape(), vec![3, 1]);
    assert!(t.squeeze_dim(1).is_err());
    let u = t.squeeze()?.unsqueeze(1)?;
    assert_eq!(u.shape(), vec![3, 1]);
    check_tensor_near(&u, &[3, 1], &[1.0, 2.0, 3.0], 1e-6);
    assert!(t.unsqueeze(4).is_err());
    Ok(())
}

#[test]
fn test_view_gradient_region_aliases_base() -> Result<(), ElevenError> {
    let t = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let row = t.slice(1, 0)?;
    assert!(row.requires_grad());
    row.grad()?.set(&[0], 5.0)?;
    check_tensor_near(&t.grad()?, &[2, 2], &[0.0, 0.0, 5.0, 0.0], 1e-6);
    row.zero_grad()?;
    check_tensor_near(&t.grad()?, &[2, 2], &[0.0; 4], 1e-6);
    Ok(())
}
