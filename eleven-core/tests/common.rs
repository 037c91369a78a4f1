use approx::assert_abs_diff_eq;
use eleven_core::tensor::Tensor;

/// Builds a constant tensor; panics on a shape/data mismatch.
#[allow(dead_code)]
pub fn create_test_tensor(data: Vec<f32>, shape: &[usize]) -> Tensor {
    Tensor::from_vec(data, shape, false).expect("Test tensor creation failed")
}

#[allow(dead_code)]
pub fn create_test_tensor_with_grad(data: Vec<f32>, shape: &[usize]) -> Tensor {
    Tensor::from_vec(data, shape, true).expect("Test tensor creation failed")
}

/// `0, 1, 2, ..` laid out in `shape`.
#[allow(dead_code)]
pub fn arange(shape: &[usize]) -> Tensor {
    let n: usize = shape.iter().product();
    create_test_tensor((0..n).map(|v| v as f32).collect(), shape)
}

#[allow(dead_code)]
pub fn assert_tensor_eq(actual: &Tensor, shape: &[usize], expected: &[f32], epsilon: f32) {
    assert_eq!(actual.shape(), shape, "shape mismatch");
    let data = actual.to_vec();
    assert_eq!(data.len(), expected.len(), "length mismatch");
    for (a, e) in data.iter().zip(expected) {
        assert_abs_diff_eq!(*a, *e, epsilon = epsilon);
    }
}
