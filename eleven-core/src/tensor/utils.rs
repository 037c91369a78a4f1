use crate::error::ElevenError;

/// Total number of elements described by `shape` (`1` for rank 0).
pub fn dsize(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Product of the extents from dimension `k` onward.
///
/// `subsize(shape, shape.len())` is `1`.
pub fn subsize(shape: &[usize], k: usize) -> usize {
    shape.iter().skip(k).product()
}

/// Calculates the default row-major strides for a given shape.
///
/// Dimension `i` gets the subsize of the trailing dimensions, except that a
/// dimension of extent 1 gets stride 0, the broadcast marker.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 1, 4] -> strides = [4, 0, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    (0..shape.len())
        .map(|i| if shape[i] == 1 { 0 } else { subsize(shape, i + 1) })
        .collect()
}

/// A layout is contiguous when every dimension with more than one element
/// uses its default row-major stride.
pub fn is_contiguous_layout(shape: &[usize], strides: &[usize]) -> bool {
    (0..shape.len()).all(|i| shape[i] <= 1 || strides[i] == subsize(shape, i + 1))
}

/// Physical offset of `coords` relative to a view's starting offset.
///
/// `coords` may be longer than the layout rank: leading coordinates are
/// ignored, and coordinates on dimensions of extent 1 read index 0. This is
/// the broadcast read rule every expression follows.
#[inline]
pub fn broadcast_offset(shape: &[usize], strides: &[usize], coords: &[usize]) -> usize {
    let skip = coords.len() - shape.len();
    let mut offset = 0;
    for i in 0..shape.len() {
        if shape[i] != 1 {
            offset += coords[skip + i] * strides[i];
        }
    }
    offset
}

/// Restricts `coords` to the trailing `shape.len()` dimensions, zeroing the
/// coordinates of extent-1 dimensions.
pub fn localize_coords(shape: &[usize], coords: &[usize]) -> Vec<usize> {
    let skip = coords.len() - shape.len();
    shape
        .iter()
        .zip(&coords[skip..])
        .map(|(&extent, &c)| if extent == 1 { 0 } else { c })
        .collect()
}

/// Validates `dim < rank`.
pub fn check_dim(dim: usize, rank: usize) -> Result<(), ElevenError> {
    if dim >= rank {
        return Err(ElevenError::DimNotExist { dim, rank });
    }
    Ok(())
}

/// Validates a full coordinate against a shape.
pub fn check_coords(shape: &[usize], coords: &[usize]) -> Result<(), ElevenError> {
    if coords.len() != shape.len() {
        return Err(ElevenError::DimNotMatch {
            expected: shape.len(),
            actual: coords.len(),
            operation: "element access".to_string(),
        });
    }
    for (dim, (&index, &extent)) in coords.iter().zip(shape).enumerate() {
        if index >= extent {
            return Err(ElevenError::IndexOutOfRange { index, dim, extent });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;
