//! Burn metric wrapper around [`PlacementAccumulator`].
//!
//! Lets the placement accuracies be tracked by Burn's metric tooling
//! (learner dashboards, metric loggers) alongside other numeric metrics.

use core::marker::PhantomData;
use std::sync::Arc;

use burn::{
    prelude::*,
    tensor::backend::Backend,
    train::metric::{Metric, MetricEntry, MetricMetadata, Numeric, NumericEntry},
};

use crate::{aggregator::PlacementAccumulator, error::MetricResult, input::PlacementAccuracyInput};

/// Which of the two placement accuracies a metric reports.
#[derive(Config, Debug, Copy, PartialEq, Eq)]
pub enum AccuracyMode {
    /// Fraction of all pairs predicted positive.
    Raw,
    /// Per-identity fraction averaged across identities.
    NoReplica,
}

#[derive(Config, Debug)]
pub struct PlacementAccuracyMetricConfig {
    #[config(default = "AccuracyMode::Raw")]
    pub mode: AccuracyMode,
}

#[derive(Clone)]
pub struct PlacementAccuracyMetric<B: Backend> {
    accumulator: PlacementAccumulator,
    mode: AccuracyMode,
    name: Arc<String>,
    _b: PhantomData<B>,
}

impl PlacementAccuracyMetricConfig {
    pub fn init<B: Backend>(&self) -> PlacementAccuracyMetric<B> {
        let name = match self.mode {
            AccuracyMode::Raw => "Placement Accuracy",
            AccuracyMode::NoReplica => "Placement Accuracy (no replica)",
        };
        PlacementAccuracyMetric {
            accumulator: PlacementAccumulator::new(),
            mode: self.mode,
            name: Arc::new(name.to_owned()),
            _b: PhantomData,
        }
    }
}

impl<B: Backend> Default for PlacementAccuracyMetric<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> PlacementAccuracyMetric<B> {
    pub fn new() -> Self {
        PlacementAccuracyMetricConfig::new().init()
    }

    pub fn no_replica() -> Self {
        PlacementAccuracyMetricConfig::new()
            .with_mode(AccuracyMode::NoReplica)
            .init()
    }

    /// Accumulated counts backing this metric.
    pub const fn accumulator(&self) -> &PlacementAccumulator {
        &self.accumulator
    }

    /// Add one batch and return the updated value.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::LengthMismatch`](crate::MetricError::LengthMismatch)
    /// if the ids and predictions differ in length; the state is left as it
    /// was.
    pub fn record(&mut self, item: &PlacementAccuracyInput<B>) -> MetricResult<f64> {
        let labels: Vec<i64> = item.predictions.clone().into_data().iter::<i64>().collect();
        self.accumulator.update(&item.sample_ids, &labels)?;
        Ok(self.current())
    }

    fn current(&self) -> f64 {
        let value = match self.mode {
            AccuracyMode::Raw => self.accumulator.pred_acc(),
            AccuracyMode::NoReplica => self.accumulator.pred_acc_no_replica(),
        };
        value.unwrap_or(0.0)
    }
}

impl<B: Backend> Metric for PlacementAccuracyMetric<B> {
    type Input = PlacementAccuracyInput<B>;

    fn name(&self) -> Arc<String> {
        self.name.clone()
    }

    fn update(&mut self, item: &Self::Input, _metadata: &MetricMetadata) -> MetricEntry {
        let value = self.record(item).unwrap_or_else(|e| {
            tracing::warn!(metric = %self.name, error = %e, "skipping placement batch");
            self.current()
        });
        MetricEntry::new(self.name.clone(), format!("{value:.4}"), value.to_string())
    }

    fn clear(&mut self) {
        self.accumulator.reset();
    }
}

impl<B: Backend> Numeric for PlacementAccuracyMetric<B> {
    fn value(&self) -> NumericEntry {
        NumericEntry::Value(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MetricError, tests::TestBackend};

    fn input(ids: &[&str], labels: &[i64]) -> PlacementAccuracyInput<TestBackend> {
        let device = Default::default();
        PlacementAccuracyInput::new(
            ids.iter().map(|id| (*id).to_owned()).collect(),
            Tensor::from_data(TensorData::new(labels.to_vec(), [labels.len()]), &device),
        )
    }

    fn numeric(metric: &PlacementAccuracyMetric<TestBackend>) -> f64 {
        match metric.value() {
            NumericEntry::Value(value) => value,
            _ => panic!("Expected a plain value"),
        }
    }

    #[test]
    fn metric_names_follow_mode() {
        let raw = PlacementAccuracyMetric::<TestBackend>::new();
        let no_replica = PlacementAccuracyMetric::<TestBackend>::no_replica();

        assert_eq!(raw.name().as_str(), "Placement Accuracy");
        assert_eq!(no_replica.name().as_str(), "Placement Accuracy (no replica)");
    }

    #[test]
    fn empty_metric_reports_zero() {
        let metric = PlacementAccuracyMetric::<TestBackend>::no_replica();

        assert!(metric.accumulator().pred_acc().is_none());
        assert_eq!(metric.current(), 0.0);
    }

    #[test]
    fn batches_accumulate_in_both_modes() {
        let mut raw = PlacementAccuracyMetric::<TestBackend>::new();
        let mut no_replica = PlacementAccuracyMetric::<TestBackend>::no_replica();
        let batches = [input(&["A", "A"], &[1, 1]), input(&["A", "B", "B"], &[0, 1, 0])];

        for batch in &batches {
            raw.record(batch).unwrap();
            no_replica.record(batch).unwrap();
        }

        assert_eq!(format!("{:.4}", numeric(&raw)), "0.6000");
        assert_eq!(format!("{:.4}", numeric(&no_replica)), "0.5833");
        assert_eq!(raw.accumulator().total(), 5);
    }

    #[test]
    fn mismatched_batch_leaves_state_untouched() {
        let mut metric = PlacementAccuracyMetric::<TestBackend>::new();
        metric.record(&input(&["A"], &[1])).unwrap();

        let result = metric.record(&input(&["A", "B"], &[0]));

        assert_eq!(result, Err(MetricError::LengthMismatch { ids: 2, labels: 1 }));
        assert_eq!(metric.accumulator().total(), 1);
        assert_eq!(numeric(&metric), 1.0);
    }

    #[test]
    fn clear_resets_the_metric() {
        let mut metric = PlacementAccuracyMetric::<TestBackend>::no_replica();
        metric.record(&input(&["A", "B"], &[1, 1])).unwrap();

        metric.clear();

        assert_eq!(metric.accumulator().total(), 0);
        assert_eq!(numeric(&metric), 0.0);
    }
}
