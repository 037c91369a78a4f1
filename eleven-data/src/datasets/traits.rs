use crate::error::DataError;

/// Indexed access to a fixed collection of samples.
pub trait Dataset {
    /// The type of a single sample.
    type Item;

    /// Returns the sample at `index`.
    ///
    /// # Errors
    /// `DataError::IndexOutOfRange` if `index >= len()`.
    fn get(&self, index: usize) -> Result<Self::Item, DataError>;

    /// Returns the total number of samples.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One single-channel image and its class.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSample {
    /// `rows · cols` pixels in row-major order.
    pub pixels: Vec<f32>,
    pub rows: usize,
    pub cols: usize,
    pub label: usize,
}
