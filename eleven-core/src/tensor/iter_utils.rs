/// Odometer over every coordinate of a shape, last dimension fastest.
///
/// Iterative rather than recursive so the stack depth does not grow with
/// the rank. Yields nothing when any extent is 0, and yields the single empty
/// coordinate for rank 0.
#[derive(Debug, Clone)]
pub struct CoordCounter {
    shape: Vec<usize>,
    coords: Vec<usize>,
    started: bool,
    done: bool,
}

impl CoordCounter {
    pub fn new(shape: &[usize]) -> Self {
        CoordCounter {
            shape: shape.to_vec(),
            coords: vec![0; shape.len()],
            started: false,
            done: shape.iter().any(|&d| d == 0),
        }
    }

    /// Advances to the next coordinate and returns it, or `None` when every
    /// coordinate has been visited.
    pub fn next_coords(&mut self) -> Option<&[usize]> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(&self.coords);
        }
        let mut dim_to_increment = self.shape.len();
        loop {
            if dim_to_increment == 0 {
                self.done = true;
                return None;
            }
            dim_to_increment -= 1;
            self.coords[dim_to_increment] += 1;
            if self.coords[dim_to_increment] < self.shape[dim_to_increment] {
                return Some(&self.coords);
            }
            self.coords[dim_to_increment] = 0;
        }
    }
}

/// Calls `f` for every coordinate of `shape` in row-major order.
pub fn for_each_coord(shape: &[usize], mut f: impl FnMut(&[usize])) {
    let mut counter = CoordCounter::new(shape);
    while let Some(coords) = counter.next_coords() {
        f(coords);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_row_major_order() {
        let mut seen = Vec::new();
        for_each_coord(&[2, 3], |c| seen.push(c.to_vec()));
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], vec![0, 0]);
        assert_eq!(seen[1], vec![0, 1]);
        assert_eq!(seen[3], vec![1, 0]);
        assert_eq!(seen[5], vec![1, 2]);
    }

    #[test]
    fn test_counter_rank_zero_and_empty() {
        let mut count = 0;
        for_each_coord(&[], |c| {
            assert!(c.is_empty());
            count += 1;
        });
        assert_eq!(count, 1);

        let mut count = 0;
        for_each_coord(&[3, 0, 2], |_| count += 1);
        assert_eq!(count, 0);
    }
}
