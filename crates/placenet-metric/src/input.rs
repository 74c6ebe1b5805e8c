//! Input structure for the placement accuracy metric.

use burn::{prelude::*, tensor::backend::Backend};
use derive_new::new;

/// Placement accuracy metric input.
#[derive(new, Debug, Clone)]
pub struct PlacementAccuracyInput<B: Backend> {
    /// Sample identity of each pair in the batch.
    pub sample_ids: Vec<String>,
    /// Predicted class indices with shape `[batch_size]`.
    pub predictions: Tensor<B, 1, Int>,
}
