use eleven_core::ElevenError;
use thiserror::Error;

/// Errors raised while reading or batching data.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tensor error: {0}")]
    Tensor(#[from] ElevenError),

    #[error("Malformed IDX data: {0}")]
    Format(String),

    #[error("Index {index} is out of range for a dataset of {len} samples")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Sample {index} is {actual:?} but the batch holds {expected:?} images")]
    InconsistentSample {
        index: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
