//! # eleven-data
//!
//! Loading and batching of image-classification data for `eleven-core`.
//!
//! - [`mnist`]: readers for the big-endian IDX files MNIST ships in.
//! - [`datasets`]: the [`Dataset`] trait and the in-memory [`MnistDataset`].
//! - [`samplers`]: sequential and shuffled index orders.
//! - [`DataLoader`]: gathers samples into `(images, labels)` tensor batches.

pub mod dataloader;
pub mod datasets;
pub mod error;
pub mod mnist;
pub mod samplers;

pub use dataloader::DataLoader;
pub use datasets::{Dataset, ImageSample, MnistDataset};
pub use error::DataError;
pub use samplers::{RandomSampler, Sampler, SequentialSampler};
