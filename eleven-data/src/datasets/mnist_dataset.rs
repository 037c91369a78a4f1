use std::path::Path;

use crate::datasets::traits::{Dataset, ImageSample};
use crate::error::DataError;
use crate::mnist::{read_mnist_images, read_mnist_labels, MnistImages};

/// MNIST images and labels held in memory.
#[derive(Debug, Clone)]
pub struct MnistDataset {
    images: MnistImages,
    labels: Vec<u8>,
}

impl MnistDataset {
    /// Pairs decoded images with their labels.
    ///
    /// # Errors
    /// `DataError::Format` if the two counts differ.
    pub fn new(images: MnistImages, labels: Vec<u8>) -> Result<Self, DataError> {
        if images.count != labels.len() {
            return Err(DataError::Format(format!(
                "{} images but {} labels",
                images.count,
                labels.len()
            )));
        }
        Ok(MnistDataset { images, labels })
    }

    /// Loads an IDX3 image file and its IDX1 label file.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(images: P, labels: Q) -> Result<Self, DataError> {
        MnistDataset::new(read_mnist_images(images)?, read_mnist_labels(labels)?)
    }

    pub fn rows(&self) -> usize {
        self.images.rows
    }

    pub fn cols(&self) -> usize {
        self.images.cols
    }
}

impl Dataset for MnistDataset {
    type Item = ImageSample;

    fn get(&self, index: usize) -> Result<ImageSample, DataError> {
        if index >= self.labels.len() {
            return Err(DataError::IndexOutOfRange {
                index,
                len: self.labels.len(),
            });
        }
        let size = self.images.pixels_per_image();
        Ok(ImageSample {
            pixels: self.images.pixels[index * size..(index + 1) * size].to_vec(),
            rows: self.images.rows,
            cols: self.images.cols,
            label: usize::from(self.labels[index]),
        })
    }

    fn len(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
#[path = "mnist_dataset_test.rs"]
mod tests;
