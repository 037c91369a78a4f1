//! # DataLoader
//!
//! Batches an image dataset into tensors ready for a model:
//!
//! ```no_run
//! use eleven_data::{DataLoader, MnistDataset};
//!
//! # fn main() -> Result<(), eleven_data::DataError> {
//! let dataset = MnistDataset::from_files("train-images-idx3-ubyte", "train-labels-idx1-ubyte")?;
//! let mut loader = DataLoader::new(dataset, 64, true)?;
//! for batch in loader.iter() {
//!     let (images, labels) = batch?;
//!     assert_eq!(images.shape()[1], 1);
//!     assert_eq!(labels.shape(), vec![images.shape()[0]]);
//! }
//! # Ok(())
//! # }
//! ```

use eleven_core::Tensor;
use log::debug;

use crate::datasets::{Dataset, ImageSample};
use crate::error::DataError;
use crate::samplers::{RandomSampler, Sampler, SequentialSampler};

/// Iterates a dataset in batches of `(images, labels)`.
///
/// Images come out as `(b, 1, rows, cols)` and labels as `(b,)` class
/// indices stored as `f32`. The last batch of a pass may be short.
#[derive(Debug)]
pub struct DataLoader<D: Dataset<Item = ImageSample>> {
    dataset: D,
    batch_size: usize,
    sampler: Box<dyn Sampler>,
}

impl<D: Dataset<Item = ImageSample>> DataLoader<D> {
    /// Creates a loader visiting the dataset in order, or in a fresh random
    /// order each pass when `shuffle` is set.
    pub fn new(dataset: D, batch_size: usize, shuffle: bool) -> Result<Self, DataError> {
        let sampler: Box<dyn Sampler> = if shuffle {
            Box::new(RandomSampler::new())
        } else {
            Box::new(SequentialSampler::new())
        };
        DataLoader::with_sampler(dataset, batch_size, sampler)
    }

    /// Creates a loader with an explicit index order.
    ///
    /// # Errors
    /// `DataError::InvalidArgument` if `batch_size` is zero.
    pub fn with_sampler(dataset: D, batch_size: usize, sampler: Box<dyn Sampler>) -> Result<Self, DataError> {
        if batch_size == 0 {
            return Err(DataError::InvalidArgument("batch_size must be positive".to_string()));
        }
        Ok(DataLoader {
            dataset,
            batch_size,
            sampler,
        })
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Batches in one pass.
    pub fn len(&self) -> usize {
        self.sampler.len(self.dataset.len()).div_ceil(self.batch_size)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts a new pass over the dataset.
    pub fn iter(&mut self) -> Batches<'_, D> {
        let indices: Vec<usize> = self.sampler.iter(self.dataset.len()).collect();
        debug!("data loader pass over {} samples", indices.len());
        Batches {
            dataset: &self.dataset,
            batch_size: self.batch_size,
            indices,
            position: 0,
        }
    }
}

/// One pass of a [`DataLoader`].
#[derive(Debug)]
pub struct Batches<'a, D: Dataset<Item = ImageSample>> {
    dataset: &'a D,
    batch_size: usize,
    indices: Vec<usize>,
    position: usize,
}

impl<D: Dataset<Item = ImageSample>> Batches<'_, D> {
    fn collate(&self, ids: &[usize]) -> Result<(Tensor, Tensor), DataError> {
        let mut pixels = Vec::new();
        let mut labels = Vec::with_capacity(ids.len());
        let mut dims = None;
        for &index in ids {
            let sample = self.dataset.get(index)?;
            let actual = (sample.rows, sample.cols);
            match dims {
                None => {
                    pixels.reserve(ids.len() * sample.pixels.len());
                    dims = Some(actual);
                }
                Some(expected) if expected != actual => {
                    return Err(DataError::InconsistentSample { index, expected, actual });
                }
                Some(_) => {}
            }
            pixels.extend_from_slice(&sample.pixels);
            labels.push(sample.label as f32);
        }
        let (rows, cols) = dims.unwrap_or((0, 0));
        let images = Tensor::from_vec(pixels, &[ids.len(), 1, rows, cols], false)?;
        let labels = Tensor::from_vec(labels, &[ids.len()], false)?;
        Ok((images, labels))
    }
}

impl<D: Dataset<Item = ImageSample>> Iterator for Batches<'_, D> {
    type Item = Result<(Tensor, Tensor), DataError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.indices.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.indices.len());
        let batch = self.collate(&self.indices[self.position..end]);
        self.position = end;
        Some(batch)
    }
}

#[cfg(test)]
#[path = "dataloader_test.rs"]
mod tests;
