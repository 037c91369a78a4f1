// src/ops/reduction/utils.rs

use crate::error::ElevenError;
use crate::tensor::utils::check_dim;

/// Output shape of a reduction of `shape` along `dim`.
pub(crate) fn reduced_shape(shape: &[usize], dim: usize) -> Result<Vec<usize>, ElevenError> {
    check_dim(dim, shape.len())?;
    if shape[dim] == 0 {
        return Err(ElevenError::InvalidArgument(format!(
            "cannot reduce along empty dimension {}",
            dim
        )));
    }
    if shape.len() == 1 {
        return Ok(vec![1]);
    }
    let mut out = shape.to_vec();
    out.remove(dim);
    Ok(out)
}

/// Input coordinates of element `index` along `dim` for output cell `out`.
pub(crate) fn input_coords(out: &[usize], input_rank: usize, dim: usize, index: usize) -> Vec<usize> {
    if input_rank == 1 {
        return vec![index];
    }
    let mut coords = out.to_vec();
    coords.insert(dim, index);
    coords
}

/// Output cell an input coordinate reduces into.
pub(crate) fn output_coords(input: &[usize], dim: usize) -> Vec<usize> {
    if input.len() == 1 {
        return vec![0];
    }
    let mut coords = input.to_vec();
    coords.remove(dim);
    coords
}
