//! Readers for the IDX files of the MNIST distribution.
//!
//! Both formats start with a big-endian `u32` magic number whose low byte is
//! the number of dimensions, followed by one `u32` extent per dimension and
//! then the raw `u8` payload.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, warn};

use crate::error::DataError;

/// Magic number of an IDX3 image file.
pub const IMAGES_MAGIC: u32 = 2051;
/// Magic number of an IDX1 label file.
pub const LABELS_MAGIC: u32 = 2049;

/// Decoded images, pixels scaled to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MnistImages {
    /// `count · rows · cols` values, image after image in row-major order.
    pub pixels: Vec<f32>,
    pub count: usize,
    pub rows: usize,
    pub cols: usize,
}

impl MnistImages {
    pub fn pixels_per_image(&self) -> usize {
        self.rows * self.cols
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, DataError> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_be_bytes(bytes))
}

/// Reads and checks the magic number. The dimension count must match;
/// any other difference is logged and tolerated.
fn read_magic<R: Read>(reader: &mut R, expected: u32) -> Result<(), DataError> {
    let magic = read_u32(reader)?;
    if magic & 0xff != expected & 0xff {
        return Err(DataError::Format(format!(
            "magic number {} describes {} dimensions, expected {}",
            magic,
            magic & 0xff,
            expected & 0xff
        )));
    }
    if magic != expected {
        warn!("unexpected IDX magic number {} (expected {}), reading anyway", magic, expected);
    }
    Ok(())
}

/// Reads an IDX3 image file.
pub fn read_mnist_images<P: AsRef<Path>>(path: P) -> Result<MnistImages, DataError> {
    let file = File::open(path.as_ref())?;
    debug!("reading MNIST images from {}", path.as_ref().display());
    read_mnist_images_from(BufReader::new(file))
}

/// Reads exactly `len` payload bytes without trusting `len` for the
/// allocation up front.
fn read_payload<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>, DataError> {
    let mut raw = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut raw)?;
    if raw.len() != len {
        return Err(DataError::Format(format!(
            "payload truncated: header announces {} bytes, found {}",
            len,
            raw.len()
        )));
    }
    Ok(raw)
}

/// Reads IDX3 images from any byte source.
pub fn read_mnist_images_from<R: Read>(mut reader: R) -> Result<MnistImages, DataError> {
    read_magic(&mut reader, IMAGES_MAGIC)?;
    let count = read_u32(&mut reader)? as usize;
    let rows = read_u32(&mut reader)? as usize;
    let cols = read_u32(&mut reader)? as usize;
    let len = count
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(cols))
        .ok_or_else(|| DataError::Format(format!("image payload {}x{}x{} overflows", count, rows, cols)))?;
    let raw = read_payload(&mut reader, len)?;
    debug!("read {} images of {}x{}", count, rows, cols);
    Ok(MnistImages {
        pixels: raw.iter().map(|&p| f32::from(p) / 255.0).collect(),
        count,
        rows,
        cols,
    })
}

/// Reads an IDX1 label file.
pub fn read_mnist_labels<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, DataError> {
    let file = File::open(path.as_ref())?;
    debug!("reading MNIST labels from {}", path.as_ref().display());
    read_mnist_labels_from(BufReader::new(file))
}

/// Reads IDX1 labels from any byte source.
pub fn read_mnist_labels_from<R: Read>(mut reader: R) -> Result<Vec<u8>, DataError> {
    read_magic(&mut reader, LABELS_MAGIC)?;
    let count = read_u32(&mut reader)? as usize;
    let labels = read_payload(&mut reader, count)?;
    debug!("read {} labels", count);
    Ok(labels)
}

#[cfg(test)]
#[path = "mnist_test.rs"]
mod tests;
