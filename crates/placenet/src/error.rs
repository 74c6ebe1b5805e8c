//! Error type for an evaluation run.

use std::path::PathBuf;

use placenet_data::DatasetError;
use placenet_metric::MetricError;
use placenet_model::ModelError;
use thiserror::Error;

/// The error type for `placenet` evaluation runs.
///
/// Every variant is fatal for the run; nothing is retried and no report is
/// written once one of them is raised.
#[derive(Error, Debug)]
pub enum PlacenetError {
    /// A required input (checkpoint, artifact directory or cache) is absent.
    #[error("Missing {kind}: {path} does not exist")]
    MissingArtifact {
        /// What the path was expected to hold.
        kind: &'static str,
        /// The path that was checked.
        path: PathBuf,
    },

    /// The run configuration is inconsistent.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// The reason why the configuration is invalid.
        reason: String,
    },

    /// The checkpoint could not be loaded into the predictor.
    #[error("Failed to load predictor")]
    PredictorLoad(#[source] ModelError),

    /// The evaluation artifacts could not be read.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// A batch failed during inference; the whole pass is aborted.
    #[error("Batch {batch} failed: {reason}")]
    BatchProcessing {
        /// Zero-based index of the failing batch.
        batch: usize,
        /// What went wrong.
        reason: String,
    },

    /// The collected predictions could not be aggregated.
    #[error(transparent)]
    Metric(#[from] MetricError),

    /// The accuracy report could not be appended.
    #[error("Failed to write report: {path}")]
    ReportWrite {
        /// The report file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized `Result` type for evaluation runs.
pub type PlacenetResult<T> = Result<T, PlacenetError>;
