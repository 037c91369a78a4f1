use super::img2col_op;
use crate::autograd::grad_check::{check_grad, GradCheckConfig};
use crate::error::ElevenError;
use crate::ops::linalg::bmm_op;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

fn image_3x3() -> Vec<f32> {
    (1..=9).map(|v| v as f32).collect()
}

#[test]
fn test_img2col_no_padding() -> Result<(), ElevenError> {
    let x = create_test_tensor(image_3x3(), &[1, 1, 3, 3]);
    let cols = img2col_op(&x.expr(), (2, 2), 1, 0)?.materialize()?;
    // rows: kernel offsets (0,0),(0,1),(1,0),(1,1); columns: windows
    check_tensor_near(
        &cols,
        &[1, 4, 4],
        &[
            1.0, 2.0, 4.0, 5.0, //
            2.0, 3.0, 5.0, 6.0, //
            4.0, 5.0, 7.0, 8.0, //
            5.0, 6.0, 8.0, 9.0,
        ],
        1e-6,
    );
    Ok(())
}

#[test]
fn test_img2col_padding_reads_zero() -> Result<(), ElevenError> {
    let x = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], &[1, 1, 2, 2]);
    let cols = img2col_op(&x.expr(), (3, 3), 1, 1)?.materialize()?;
    assert_eq!(cols.shape(), vec![1, 9, 4]);
    // the centre row of the kernel sees each pixel once
    let centre: Vec<f32> = (0..4).map(|c| cols.get(&[0, 4, c])).collect::<Result<_, _>>()?;
    assert_eq!(centre, vec![1.0, 2.0, 3.0, 4.0]);
    // top-left kernel entry of the first window lies in the padding
    assert_eq!(cols.get(&[0, 0, 0])?, 0.0);
    assert_eq!(cols.get(&[0, 0, 3])?, 1.0);
    Ok(())
}

#[test]
fn test_img2col_stride_output_extent() -> Result<(), ElevenError> {
    let x = create_test_tensor(vec![0.0; 2 * 5 * 5], &[1, 2, 5, 5]);
    let cols = img2col_op(&x.expr(), (3, 3), 2, 0)?;
    assert_eq!(cols.shape(), vec![1, 18, 4]);
    Ok(())
}

#[test]
fn test_img2col_invalid_geometry() {
    let x = create_test_tensor(image_3x3(), &[1, 1, 3, 3]);
    assert!(matches!(
        img2col_op(&x.expr(), (4, 4), 1, 0),
        Err(ElevenError::KernelTooLarge { kernel: 4, extent: 3 })
    ));
    assert!(matches!(img2col_op(&x.expr(), (2, 2), 0, 0), Err(ElevenError::InvalidArgument(_))));
    let flat = create_test_tensor(image_3x3(), &[9]);
    assert!(matches!(img2col_op(&flat.expr(), (2, 2), 1, 0), Err(ElevenError::DimNotMatch { .. })));
}

#[test]
fn test_img2col_contraction_matches_direct_convolution() -> Result<(), ElevenError> {
    let x = create_test_tensor(image_3x3(), &[1, 1, 3, 3]);
    let kernel = [1.0, 0.0, -1.0, 2.0, 0.5, 0.0, 0.0, 1.0, -2.0];
    let w = create_test_tensor(kernel.to_vec(), &[1, 1, 9]);
    let cols = img2col_op(&x.expr(), (3, 3), 1, 1)?;
    let out = bmm_op(&w.expr(), &cols)?.materialize()?;

    let image = image_3x3();
    let mut expected = Vec::new();
    for oy in 0..3i32 {
        for ox in 0..3i32 {
            let mut acc = 0.0;
            for ky in 0..3i32 {
                for kx in 0..3i32 {
                    let (y, x) = (oy + ky - 1, ox + kx - 1);
                    if (0..3).contains(&y) && (0..3).contains(&x) {
                        acc += kernel[(ky * 3 + kx) as usize] * image[(y * 3 + x) as usize];
                    }
                }
            }
            expected.push(acc);
        }
    }
    check_tensor_near(&out, &[1, 1, 9], &expected, 1e-4);
    Ok(())
}

#[test]
fn test_img2col_backward_counts_reads() -> Result<(), ElevenError> {
    let x = create_test_tensor_with_grad(image_3x3(), &[1, 1, 3, 3]);
    let out = img2col_op(&x.node(), (2, 2), 1, 0)?.materialize()?;
    out.backward()?;
    // number of 2x2 windows covering each pixel
    check_tensor_near(
        &x.grad()?,
        &[1, 1, 3, 3],
        &[1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0],
        1e-6,
    );
    Ok(())
}

#[test]
fn test_img2col_grad_check_padded_strided() -> Result<(), Box<dyn std::error::Error>> {
    let data: Vec<f32> = (0..32).map(|i| ((i * 7) % 11) as f32 * 0.1 - 0.5).collect();
    let x = create_test_tensor_with_grad(data, &[1, 2, 4, 4]);
    check_grad(|n| img2col_op(&n[0], (3, 3), 2, 1), &[x], &GradCheckConfig::default())?;
    Ok(())
}
