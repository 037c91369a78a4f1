use crate::error::ElevenError;
use std::cmp::max;

/// Determines the output shape resulting from broadcasting two input shapes.
///
/// Shapes are right-aligned; the shorter one is padded with leading 1s.
/// Paired extents are compatible when equal or when one of them is 1, and the
/// result takes the larger extent.
pub fn broadcast_shapes(shape_a: &[usize], shape_b: &[usize]) -> Result<Vec<usize>, ElevenError> {
    let rank_a = shape_a.len();
    let rank_b = shape_b.len();
    let max_rank = max(rank_a, rank_b);
    let mut result_shape = vec![0; max_rank];

    for i in 0..max_rank {
        let dim_a = shape_a.get(rank_a.wrapping_sub(1 + i)).copied().unwrap_or(1);
        let dim_b = shape_b.get(rank_b.wrapping_sub(1 + i)).copied().unwrap_or(1);

        result_shape[max_rank - 1 - i] = if dim_a == dim_b || dim_b == 1 {
            dim_a
        } else if dim_a == 1 {
            dim_b
        } else {
            return Err(ElevenError::BroadcastError {
                shape1: shape_a.to_vec(),
                shape2: shape_b.to_vec(),
            });
        };
    }
    Ok(result_shape)
}

/// Whether an expression of shape `src` can be read at every coordinate of
/// `dst` without changing `dst`'s shape.
pub fn broadcasts_to(src: &[usize], dst: &[usize]) -> bool {
    if src.len() > dst.len() {
        return false;
    }
    let skip = dst.len() - src.len();
    src.iter()
        .zip(&dst[skip..])
        .all(|(&s, &d)| s == d || s == 1)
}
