//! Error types for the placement dataset.
//!
//! Covers the tabular index and the `.npy` side-car caches that are read when
//! a dataset is opened.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for dataset operations in placenet-data.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Error when the CSV index cannot be read or parsed.
    #[error("Failed to read index file: {path}")]
    IndexReadFailed {
        /// The index file path.
        path: PathBuf,
        /// The underlying IO or parse error.
        #[source]
        source: std::io::Error,
    },

    /// Error when a `.npy` cache cannot be read.
    #[error("Failed to read cache file: {path}")]
    CacheReadFailed {
        /// The cache file path.
        path: PathBuf,
        /// The underlying npy error.
        #[source]
        source: ndarray_npy::ReadNpyError,
    },

    /// Error when a cache does not line up with the index or the other caches.
    #[error("Unexpected shape in {path}: expected {expected}, got {actual}")]
    CacheShapeMismatch {
        /// The offending cache file.
        path: PathBuf,
        /// The expected shape.
        expected: String,
        /// The shape found on disk.
        actual: String,
    },

    /// Error when an index row has a non-positive background size.
    #[error("Row {row} ({sample_id}) has invalid background size {width}x{height}")]
    InvalidBackgroundSize {
        /// Zero-based row in the index.
        row: usize,
        /// Sample id of the row.
        sample_id: String,
        width: f32,
        height: f32,
    },
}

/// A specialized `Result` type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;
