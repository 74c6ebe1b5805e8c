use std::path::PathBuf;

use thiserror::Error;

/// The error type for `ObjectPlaceNet` operations.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Error for when an invalid model configuration is provided.
    /// This can happen if configuration parameters are logically inconsistent.
    #[error("Invalid model configuration: {reason}")]
    InvalidConfiguration {
        /// The reason why the configuration is invalid.
        reason: String,
    },

    /// Error for when an input tensor has an invalid shape.
    #[error("Invalid input tensor shape for {input}: expected {expected}, got {actual}")]
    InvalidTensorShape {
        /// Which model input was rejected.
        input: &'static str,
        /// The expected tensor shape.
        expected: String,
        /// The actual tensor shape.
        actual: String,
    },

    /// Error for when loading model weights fails.
    #[error("Failed to load weights from {path}: {reason}")]
    WeightLoadingFailed {
        /// The checkpoint that could not be loaded.
        path: PathBuf,
        /// The reason for the weight loading failure.
        reason: String,
    },
}

/// A specialized `Result` type for `ObjectPlaceNet` operations.
pub type ModelResult<T> = Result<T, ModelError>;
