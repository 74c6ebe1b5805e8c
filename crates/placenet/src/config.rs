//! Run configuration and evaluation artifact layout.
//!
//! Artifacts for one experiment snapshot live under
//! `<result_dir>/<expid>/<eval_type>/<epoch>/`.

use std::path::{Path, PathBuf};

use placenet_data::PlacementDatasetPaths;

use crate::error::{PlacenetError, PlacenetResult};

/// Batch size used by the reference evaluation loader.
pub const DEFAULT_BATCH_SIZE: usize = 128;
/// Loader worker threads used by the reference evaluation loader.
pub const DEFAULT_NUM_WORKERS: usize = 2;
/// Extension the checkpoint recorder resolves paths to.
pub const CHECKPOINT_EXTENSION: &str = "mpk";

/// Immutable settings for one evaluation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Predictor checkpoint.
    pub checkpoint: PathBuf,
    /// Experiment name.
    pub expid: String,
    /// Snapshot whose precomputed artifacts are evaluated. Only used as a
    /// directory name, so any integer is accepted.
    pub epoch: i64,
    /// Artifact set, e.g. `eval` or `test`.
    pub eval_type: String,
    /// Root of the result layout.
    pub result_dir: PathBuf,
    pub batch_size: usize,
    /// Loader worker threads; `0` loads on the calling thread.
    pub num_workers: usize,
}

impl EvalConfig {
    /// Creates a configuration with the default result root, artifact set and
    /// loader settings.
    pub fn new(checkpoint: impl Into<PathBuf>, expid: impl Into<String>, epoch: i64) -> Self {
        Self {
            checkpoint: checkpoint.into(),
            expid: expid.into(),
            epoch,
            eval_type: "eval".to_owned(),
            result_dir: PathBuf::from("result"),
            batch_size: DEFAULT_BATCH_SIZE,
            num_workers: DEFAULT_NUM_WORKERS,
        }
    }

    /// Directory holding the artifacts and the report.
    pub fn artifact_dir(&self) -> PathBuf {
        self.result_dir
            .join(&self.expid)
            .join(&self.eval_type)
            .join(self.epoch.to_string())
    }

    /// Index and cache files inside [`Self::artifact_dir`].
    pub fn dataset_paths(&self) -> PlacementDatasetPaths {
        PlacementDatasetPaths::new(&self.artifact_dir(), &self.eval_type)
    }

    /// Checkpoint file the recorder reads, with the `.mpk` extension.
    pub fn checkpoint_file(&self) -> PathBuf {
        self.checkpoint.with_extension(CHECKPOINT_EXTENSION)
    }

    /// Append-only accuracy report inside [`Self::artifact_dir`].
    pub fn report_path(&self) -> PathBuf {
        self.artifact_dir()
            .join(format!("{}_acc.txt", self.eval_type))
    }

    /// Check every precondition of a run before any work starts.
    ///
    /// # Errors
    ///
    /// Returns [`PlacenetError::MissingArtifact`] for the first missing input
    /// (checkpoint, artifact directory, then index and caches) and
    /// [`PlacenetError::InvalidConfiguration`] for a zero batch size or a
    /// checkpoint that is not a `.mpk` file.
    pub fn validate(&self) -> PlacenetResult<()> {
        if self.batch_size == 0 {
            return Err(PlacenetError::InvalidConfiguration {
                reason: "batch size must be at least 1".to_owned(),
            });
        }

        if let Some(extension) = self.checkpoint.extension()
            && extension != CHECKPOINT_EXTENSION
        {
            return Err(PlacenetError::InvalidConfiguration {
                reason: format!(
                    "checkpoint {} is not a .{CHECKPOINT_EXTENSION} file",
                    self.checkpoint.display()
                ),
            });
        }

        require(&self.checkpoint_file(), "checkpoint")?;
        require(&self.artifact_dir(), "artifact directory")?;
        for (kind, path) in self.dataset_paths().files() {
            require(path, kind)?;
        }
        Ok(())
    }
}

fn require(path: &Path, kind: &'static str) -> PlacenetResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(PlacenetError::MissingArtifact {
            kind,
            path: path.to_path_buf(),
        })
    }
}
