//! Evaluation driver.
//!
//! Runs a predictor over every batch of the evaluation set, keeps only the
//! `(sample_id, predicted_label)` of each pair, and aggregates the records into
//! an [`AccuracyReport`] once the data source is exhausted.

use burn::{
    data::dataloader::{DataLoaderBuilder, DataLoaderIterator},
    tensor::backend::Backend,
};
use placenet_data::{PlacementBatcher, PlacementDataset};
use placenet_metric::{AccuracyReport, PredictionRecord, aggregate};
use placenet_model::{ObjectPlaceNetConfig, PlacementBatch, Predictor};

use crate::{
    config::EvalConfig,
    error::{PlacenetError, PlacenetResult},
    report::{append_report, summary_lines},
};

/// Ordered predictions of one full pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationPass {
    /// One record per evaluated pair, in index row order.
    pub records: Vec<PredictionRecord>,
}

impl EvaluationPass {
    /// Number of evaluated pairs.
    pub fn total(&self) -> usize {
        self.records.len()
    }
}

/// Predict every batch and collect the prediction records in row order.
///
/// Batches may arrive in any order; records are sorted by their index row
/// once the source is exhausted. Batch tensors are dropped as soon as the
/// predictor returns, so memory use only grows with the number of records.
///
/// # Errors
///
/// Returns [`PlacenetError::BatchProcessing`] for the first batch the
/// predictor rejects or answers with the wrong number of labels. Records of
/// earlier batches are discarded with the pass.
pub fn collect_predictions<B, P, I>(predictor: &P, batches: I) -> PlacenetResult<EvaluationPass>
where
    B: Backend,
    P: Predictor<B>,
    I: IntoIterator<Item = PlacementBatch<B>>,
{
    let mut rows = Vec::new();

    for (batch_index, batch) in batches.into_iter().enumerate() {
        let PlacementBatch {
            rows: batch_rows,
            sample_ids,
            inputs,
            ..
        } = batch;

        let labels = predictor
            .predict(inputs)
            .map_err(|e| PlacenetError::BatchProcessing {
                batch: batch_index,
                reason: e.to_string(),
            })?;
        if labels.len() != sample_ids.len() {
            return Err(PlacenetError::BatchProcessing {
                batch: batch_index,
                reason: format!(
                    "predictor returned {} labels for {} pairs",
                    labels.len(),
                    sample_ids.len()
                ),
            });
        }

        rows.extend(
            batch_rows
                .into_iter()
                .zip(sample_ids.into_iter().zip(labels))
                .map(|(row, (sample_id, label))| (row, PredictionRecord::new(sample_id, label))),
        );
    }

    rows.sort_by_key(|(row, _)| *row);
    Ok(EvaluationPass {
        records: rows.into_iter().map(|(_, record)| record).collect(),
    })
}

/// Logs loader progress after every batch.
struct LoggedProgress<'a, O> {
    inner: Box<dyn DataLoaderIterator<O> + 'a>,
}

impl<O> Iterator for LoggedProgress<'_, O> {
    type Item = O;

    fn next(&mut self) -> Option<O> {
        let item = self.inner.next()?;
        let progress = self.inner.progress();
        tracing::info!(
            processed = progress.items_processed,
            total = progress.items_total,
            "evaluating",
        );
        Some(item)
    }
}

/// Run `predictor` over `dataset` through a burn data loader configured by
/// `config` (batch size and worker threads).
///
/// # Errors
///
/// Returns [`PlacenetError::BatchProcessing`] if any batch fails.
pub fn predict_dataset<B, P>(
    predictor: &P,
    dataset: PlacementDataset,
    config: &EvalConfig,
    device: &B::Device,
) -> PlacenetResult<EvaluationPass>
where
    B: Backend,
    P: Predictor<B>,
{
    let mut builder = DataLoaderBuilder::new(PlacementBatcher::<B>::new())
        .batch_size(config.batch_size)
        .set_device(device.clone());
    if config.num_workers > 0 {
        builder = builder.num_workers(config.num_workers);
    }
    let loader = builder.build(dataset);

    collect_predictions(
        predictor,
        LoggedProgress {
            inner: loader.iter(),
        },
    )
}

/// Evaluate a checkpoint against the artifact set named by `config`.
///
/// All artifacts are checked before the checkpoint is loaded, and the dataset
/// dimensions are checked against `model_config` before the pass starts.
///
/// # Errors
///
/// Returns an error if a precondition fails, the checkpoint cannot be loaded,
/// a batch fails, or the evaluation set is empty.
pub fn evaluate<B: Backend>(
    config: &EvalConfig,
    model_config: &ObjectPlaceNetConfig,
    device: &B::Device,
) -> PlacenetResult<AccuracyReport> {
    config.validate()?;

    tracing::info!(
        checkpoint = %config.checkpoint_file().display(),
        artifacts = %config.artifact_dir().display(),
        "running evaluation",
    );

    let dataset = PlacementDataset::open(&config.dataset_paths())?;
    check_dimensions(&dataset, model_config)?;

    let predictor = model_config
        .load_checkpoint::<B>(&config.checkpoint_file(), device)
        .map_err(PlacenetError::PredictorLoad)?;

    let pass = predict_dataset(&predictor, dataset, config, device)?;
    tracing::info!(total = pass.total(), "evaluation pass finished");

    Ok(aggregate(&pass.records)?)
}

/// Evaluate, print the summary and append it to the report file.
///
/// Nothing is written unless the whole pass succeeds.
///
/// # Errors
///
/// Returns any error from [`evaluate`] or from writing the report.
pub fn run_evaluation<B: Backend>(
    config: &EvalConfig,
    model_config: &ObjectPlaceNetConfig,
    device: &B::Device,
) -> PlacenetResult<AccuracyReport> {
    let report = evaluate::<B>(config, model_config, device)?;

    for line in summary_lines(&report) {
        println!("{line}");
    }
    append_report(&config.report_path(), &report)?;

    Ok(report)
}

fn check_dimensions(
    dataset: &PlacementDataset,
    model_config: &ObjectPlaceNetConfig,
) -> PlacenetResult<()> {
    let mismatch = |what: &str, data: usize, model: usize| PlacenetError::InvalidConfiguration {
        reason: format!("dataset has {what} {data}, model expects {model}"),
    };

    if dataset.feat_dim() != model_config.feat_dim {
        return Err(mismatch(
            "feature dimension",
            dataset.feat_dim(),
            model_config.feat_dim,
        ));
    }
    if dataset.refer_num() != model_config.refer_num {
        return Err(mismatch(
            "reference count",
            dataset.refer_num(),
            model_config.refer_num,
        ));
    }
    Ok(())
}
