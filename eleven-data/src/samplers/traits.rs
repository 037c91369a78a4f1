use std::fmt::Debug;

/// Decides the order in which a `DataLoader` visits a dataset.
pub trait Sampler: Debug {
    /// Returns an iterator over the indices of one pass over a dataset of
    /// `dataset_len` samples.
    fn iter(&mut self, dataset_len: usize) -> Box<dyn Iterator<Item = usize>>;

    /// Number of indices one pass yields.
    fn len(&self, dataset_len: usize) -> usize {
        dataset_len
    }
}
