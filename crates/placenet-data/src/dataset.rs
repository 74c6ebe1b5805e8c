//! Placement dataset backed by precomputed evaluation artifacts.
//!
//! An artifact directory holds one CSV index and three `.npy` caches, all
//! keyed by index row:
//!
//! - `<eval_type>.csv`: `sample_id,label,catnm,width,height`
//! - `<eval_type>_bboxes.npy`: `f32[N, 1 + refer_num, 4]`, target box first
//! - `<eval_type>_feats.npy`: `f32[N, refer_num, feat_dim]`
//! - `<eval_type>_fgfeats.npy`: `f32[N, feat_dim]`
//!
//! Following Burn's convention, the dataset returns plain data and the batcher
//! creates tensors on the target device.

use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
};

use burn::{
    data::{
        dataloader::batcher::Batcher,
        dataset::{Dataset, InMemDataset},
    },
    prelude::*,
    tensor::backend::Backend,
};
use ndarray::{Array2, Array3, Axis};
use ndarray_npy::read_npy;
use placenet_model::{BOX_DIM, PlacementBatch, PlacementInputs};
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult};

/// One row of the CSV index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRow {
    /// Identity shared by replica placements of the same composite.
    pub sample_id: String,
    /// Ground-truth placement label.
    pub label: i64,
    /// Category name of the foreground object.
    pub catnm: String,
    /// Background width in pixels.
    pub width: f32,
    /// Background height in pixels.
    pub height: f32,
}

/// File locations of one evaluation artifact set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementDatasetPaths {
    pub index: PathBuf,
    pub bboxes: PathBuf,
    pub refer_feats: PathBuf,
    pub target_feats: PathBuf,
}

impl PlacementDatasetPaths {
    /// Standard file names for `eval_type` inside `dir`.
    pub fn new(dir: &Path, eval_type: &str) -> Self {
        Self {
            index: dir.join(format!("{eval_type}.csv")),
            bboxes: dir.join(format!("{eval_type}_bboxes.npy")),
            refer_feats: dir.join(format!("{eval_type}_feats.npy")),
            target_feats: dir.join(format!("{eval_type}_fgfeats.npy")),
        }
    }

    /// All files paired with a short description, index first.
    pub fn files(&self) -> [(&'static str, &Path); 4] {
        [
            ("index file", self.index.as_path()),
            ("bounding-box cache", self.bboxes.as_path()),
            ("reference feature cache", self.refer_feats.as_path()),
            ("target feature cache", self.target_feats.as_path()),
        ]
    }
}

/// A single sample pair as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementItem {
    /// Row of the pair in the index.
    pub row: usize,
    pub sample_id: String,
    pub label: i64,
    /// Background size used to normalize boxes.
    pub width: f32,
    pub height: f32,
    /// Target box in pixels, `x1 y1 x2 y2`.
    pub target_box: [f32; BOX_DIM],
    /// Reference boxes in pixels, `refer_num * 4` values.
    pub refer_boxes: Vec<f32>,
    /// Target features, `feat_dim` values.
    pub target_feats: Vec<f32>,
    /// Reference features, `refer_num * feat_dim` values.
    pub refer_feats: Vec<f32>,
}

/// Evaluation dataset over an artifact directory.
pub struct PlacementDataset {
    index: InMemDataset<IndexRow>,
    bboxes: Array3<f32>,
    refer_feats: Array3<f32>,
    target_feats: Array2<f32>,
}

impl PlacementDataset {
    /// Open the index and all caches, checking that they line up.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, a cache's shape disagrees
    /// with the index or the other caches, or a row has a non-positive
    /// background size.
    pub fn open(paths: &PlacementDatasetPaths) -> DatasetResult<Self> {
        let index = InMemDataset::<IndexRow>::from_csv(&paths.index, &csv::ReaderBuilder::new())
            .map_err(|source| DatasetError::IndexReadFailed {
                path: paths.index.clone(),
                source,
            })?;
        let bboxes: Array3<f32> = read_cache(&paths.bboxes)?;
        let refer_feats: Array3<f32> = read_cache(&paths.refer_feats)?;
        let target_feats: Array2<f32> = read_cache(&paths.target_feats)?;

        let rows = index.len();
        let (_, refer_num, feat_dim) = refer_feats.dim();

        check_shape(&paths.bboxes, &[rows, refer_num + 1, BOX_DIM], bboxes.shape())?;
        check_shape(&paths.refer_feats, &[rows, refer_num, feat_dim], refer_feats.shape())?;
        check_shape(&paths.target_feats, &[rows, feat_dim], target_feats.shape())?;

        for (row, item) in index.iter().enumerate() {
            if !(item.width > 0.0 && item.height > 0.0) {
                return Err(DatasetError::InvalidBackgroundSize {
                    row,
                    sample_id: item.sample_id,
                    width: item.width,
                    height: item.height,
                });
            }
        }

        tracing::info!(
            index = %paths.index.display(),
            rows,
            refer_num,
            feat_dim,
            "opened placement dataset",
        );

        Ok(Self {
            index,
            bboxes,
            refer_feats,
            target_feats,
        })
    }

    /// Number of reference objects per pair.
    pub fn refer_num(&self) -> usize {
        self.refer_feats.shape()[1]
    }

    /// Feature dimension of the caches.
    pub fn feat_dim(&self) -> usize {
        self.target_feats.shape()[1]
    }
}

fn read_cache<A: ndarray_npy::ReadNpyExt>(path: &Path) -> DatasetResult<A> {
    read_npy(path).map_err(|source| DatasetError::CacheReadFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn check_shape(path: &Path, expected: &[usize], actual: &[usize]) -> DatasetResult<()> {
    if expected == actual {
        return Ok(());
    }
    Err(DatasetError::CacheShapeMismatch {
        path: path.to_path_buf(),
        expected: format!("{expected:?}"),
        actual: format!("{actual:?}"),
    })
}

impl Dataset<PlacementItem> for PlacementDataset {
    fn get(&self, index: usize) -> Option<PlacementItem> {
        let entry = self.index.get(index)?;
        let boxes = self.bboxes.index_axis(Axis(0), index);

        let target = boxes.index_axis(Axis(0), 0);
        let target_box = [target[0], target[1], target[2], target[3]];
        let refer_boxes = boxes.slice(ndarray::s![1.., ..]).iter().copied().collect();

        Some(PlacementItem {
            row: index,
            sample_id: entry.sample_id,
            label: entry.label,
            width: entry.width,
            height: entry.height,
            target_box,
            refer_boxes,
            target_feats: self
                .target_feats
                .index_axis(Axis(0), index)
                .iter()
                .copied()
                .collect(),
            refer_feats: self
                .refer_feats
                .index_axis(Axis(0), index)
                .iter()
                .copied()
                .collect(),
        })
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

/// Batcher turning [`PlacementItem`]s into a [`PlacementBatch`].
///
/// Boxes are divided by the background size so every coordinate lies in
/// `[0, 1]`.
#[derive(Clone, Default)]
pub struct PlacementBatcher<B: Backend> {
    _phantom: PhantomData<B>,
}

impl<B: Backend> PlacementBatcher<B> {
    /// Create a new placement batcher.
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

fn normalize_boxes(boxes: &[f32], width: f32, height: f32) -> impl Iterator<Item = f32> + '_ {
    boxes.chunks_exact(BOX_DIM).flat_map(move |b| {
        [b[0] / width, b[1] / height, b[2] / width, b[3] / height]
    })
}

impl<B: Backend> Batcher<B, PlacementItem, PlacementBatch<B>> for PlacementBatcher<B> {
    fn batch(&self, items: Vec<PlacementItem>, device: &B::Device) -> PlacementBatch<B> {
        let batch_size = items.len();
        let feat_dim = items.first().map_or(0, |item| item.target_feats.len());
        let refer_num = items
            .first()
            .map_or(0, |item| item.refer_boxes.len() / BOX_DIM);

        let mut rows = Vec::with_capacity(batch_size);
        let mut sample_ids = Vec::with_capacity(batch_size);
        let mut labels = Vec::with_capacity(batch_size);
        let mut target_boxes = Vec::with_capacity(batch_size * BOX_DIM);
        let mut refer_boxes = Vec::with_capacity(batch_size * refer_num * BOX_DIM);
        let mut target_feats = Vec::with_capacity(batch_size * feat_dim);
        let mut refer_feats = Vec::with_capacity(batch_size * refer_num * feat_dim);

        for item in items {
            target_boxes.extend(normalize_boxes(&item.target_box, item.width, item.height));
            refer_boxes.extend(normalize_boxes(&item.refer_boxes, item.width, item.height));
            target_feats.extend(item.target_feats);
            refer_feats.extend(item.refer_feats);
            labels.push(item.label);
            rows.push(item.row);
            sample_ids.push(item.sample_id);
        }

        let float = |values: Vec<f32>, shape: Vec<usize>| {
            TensorData::new(values, shape).convert::<B::FloatElem>()
        };

        let inputs = PlacementInputs::new(
            Tensor::from_data(float(target_boxes, vec![batch_size, BOX_DIM]), device),
            Tensor::from_data(
                float(refer_boxes, vec![batch_size, refer_num, BOX_DIM]),
                device,
            ),
            Tensor::from_data(float(target_feats, vec![batch_size, feat_dim]), device),
            Tensor::from_data(
                float(refer_feats, vec![batch_size, refer_num, feat_dim]),
                device,
            ),
        );
        let labels = Tensor::from_data(
            TensorData::new(labels, [batch_size]).convert::<B::IntElem>(),
            device,
        );

        PlacementBatch::new(rows, sample_ids, labels, inputs)
    }
}
