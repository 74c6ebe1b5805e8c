use burn::tensor::backend::Backend;

use crate::{batch::PlacementInputs, error::ModelResult};

/// Maps a batch of model inputs to one class index per pair.
///
/// Implementations must return labels in input order and must not mutate
/// their parameters.
pub trait Predictor<B: Backend> {
    /// Predict the class of every pair in `inputs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are incompatible with the predictor.
    fn predict(&self, inputs: PlacementInputs<B>) -> ModelResult<Vec<i64>>;
}
