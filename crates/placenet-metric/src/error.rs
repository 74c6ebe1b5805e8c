//! Error types for placement metric computation.

use thiserror::Error;

/// Errors raised while aggregating placement predictions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricError {
    /// No prediction records were collected, so accuracy is undefined.
    #[error(
        "Empty evaluation set: no (fg, bg) pairs were evaluated, accuracy is undefined. \
         Check that the index file lists at least one sample"
    )]
    EmptyEvaluationSet,

    /// A batch supplied a different number of sample ids and predicted labels.
    #[error("Mismatched batch: {ids} sample ids but {labels} predicted labels")]
    LengthMismatch {
        /// Number of sample ids in the batch.
        ids: usize,
        /// Number of predicted labels in the batch.
        labels: usize,
    },
}

/// A specialized `Result` type for metric operations.
pub type MetricResult<T> = Result<T, MetricError>;
