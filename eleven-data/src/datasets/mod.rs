pub mod mnist_dataset;
pub mod traits;

pub use mnist_dataset::MnistDataset;
pub use traits::{Dataset, ImageSample};
