use burn::{prelude::*, tensor::backend::Backend};
use derive_new::new;

/// Tensors consumed by a placement predictor.
///
/// Boxes are `x1 y1 x2 y2` normalized by the background size.
#[derive(new, Debug, Clone)]
pub struct PlacementInputs<B: Backend> {
    /// Target box, shape `[batch_size, 4]`.
    pub target_boxes: Tensor<B, 2>,
    /// Reference boxes, shape `[batch_size, refer_num, 4]`.
    pub refer_boxes: Tensor<B, 3>,
    /// Target features, shape `[batch_size, feat_dim]`.
    pub target_feats: Tensor<B, 2>,
    /// Reference features, shape `[batch_size, refer_num, feat_dim]`.
    pub refer_feats: Tensor<B, 3>,
}

impl<B: Backend> PlacementInputs<B> {
    /// Number of pairs in the batch.
    pub fn batch_size(&self) -> usize {
        self.target_feats.dims()[0]
    }
}

/// One batch of sample pairs as produced by the data loader.
#[derive(new, Debug, Clone)]
pub struct PlacementBatch<B: Backend> {
    /// Index row of each pair. Parallel loaders may deliver batches out of
    /// row order; these let consumers restore it.
    pub rows: Vec<usize>,
    /// Sample identity of each pair, in batch order.
    pub sample_ids: Vec<String>,
    /// Ground-truth labels, shape `[batch_size]`.
    pub labels: Tensor<B, 1, Int>,
    /// Model inputs.
    pub inputs: PlacementInputs<B>,
}
