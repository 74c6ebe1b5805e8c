//! Two-level placement accuracy aggregation.
//!
//! Predictions arrive as an ordered stream of `(sample_id, label)` records.
//! The raw accuracy treats every record equally; the no-replica accuracy first
//! averages inside each identity group and then across groups, so each
//! identity carries the same weight regardless of how many placement
//! candidates it has.

use std::collections::HashMap;

use derive_new::new;

use crate::error::{MetricError, MetricResult};

/// Class index that denotes a positive (reasonable) placement.
pub const POSITIVE_LABEL: i64 = 1;

/// One evaluated (foreground, background) pair and its predicted class.
#[derive(new, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredictionRecord {
    /// Identity shared by all replica placements of a composite.
    pub sample_id: String,
    /// Predicted class index.
    pub label: i64,
}

impl PredictionRecord {
    /// Whether this record predicts a positive placement.
    pub const fn is_positive(&self) -> bool {
        self.label == POSITIVE_LABEL
    }
}

/// Positive count for a single identity group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAccuracy {
    pub sample_id: String,
    pub positives: usize,
    pub count: usize,
}

impl GroupAccuracy {
    /// Fraction of the group's records predicted as positive.
    ///
    /// Groups are only created when a record is seen, so `count` is never zero.
    pub fn accuracy(&self) -> f64 {
        self.positives as f64 / self.count as f64
    }
}

/// Final statistics of one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyReport {
    /// Fraction of all records predicted positive.
    pub pred_acc: f64,
    /// Mean over identity groups of each group's positive fraction.
    pub pred_acc_no_replica: f64,
    /// Number of records.
    pub total: usize,
    /// Number of distinct identities.
    pub group_count: usize,
}

/// Incremental accumulator for placement predictions.
///
/// Records can be pushed one at a time or a batch at a time; groups are kept
/// in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct PlacementAccumulator {
    positives: usize,
    total: usize,
    groups: Vec<GroupAccuracy>,
    index: HashMap<String, usize>,
}

impl PlacementAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single prediction.
    pub fn push(&mut self, sample_id: &str, label: i64) {
        let positive = usize::from(label == POSITIVE_LABEL);
        self.total += 1;
        self.positives += positive;

        let slot = match self.index.get(sample_id) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.index.insert(sample_id.to_owned(), slot);
                self.groups.push(GroupAccuracy {
                    sample_id: sample_id.to_owned(),
                    positives: 0,
                    count: 0,
                });
                slot
            }
        };
        let group = &mut self.groups[slot];
        group.count += 1;
        group.positives += positive;
    }

    /// Add one batch of predictions, pairing ids and labels by position.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::LengthMismatch`] if the two slices differ in
    /// length. Nothing is recorded in that case.
    pub fn update<S: AsRef<str>>(&mut self, sample_ids: &[S], labels: &[i64]) -> MetricResult<()> {
        if sample_ids.len() != labels.len() {
            return Err(MetricError::LengthMismatch {
                ids: sample_ids.len(),
                labels: labels.len(),
            });
        }
        for (sample_id, &label) in sample_ids.iter().zip(labels) {
            self.push(sample_id.as_ref(), label);
        }
        Ok(())
    }

    /// Number of records seen so far.
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct identities seen so far.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Per-identity counts in first-seen order.
    pub fn groups(&self) -> &[GroupAccuracy] {
        &self.groups
    }

    /// Raw accuracy over every record, `None` while empty.
    pub fn pred_acc(&self) -> Option<f64> {
        (self.total > 0).then(|| self.positives as f64 / self.total as f64)
    }

    /// Identity-averaged accuracy, `None` while empty.
    pub fn pred_acc_no_replica(&self) -> Option<f64> {
        if self.groups.is_empty() {
            return None;
        }
        let mut accuracies: Vec<f64> = self.groups.iter().map(GroupAccuracy::accuracy).collect();
        // Summed in sorted order so the result is bit-identical for any group order.
        accuracies.sort_by(f64::total_cmp);
        let sum: f64 = accuracies.iter().sum();
        Some(sum / accuracies.len() as f64)
    }

    /// Compute the final statistics.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::EmptyEvaluationSet`] if nothing was recorded.
    pub fn report(&self) -> MetricResult<AccuracyReport> {
        let (Some(pred_acc), Some(pred_acc_no_replica)) =
            (self.pred_acc(), self.pred_acc_no_replica())
        else {
            return Err(MetricError::EmptyEvaluationSet);
        };

        Ok(AccuracyReport {
            pred_acc,
            pred_acc_no_replica,
            total: self.total,
            group_count: self.groups.len(),
        })
    }

    /// Drop everything recorded so far.
    pub fn reset(&mut self) {
        self.positives = 0;
        self.total = 0;
        self.groups.clear();
        self.index.clear();
    }
}

impl<'a> Extend<&'a PredictionRecord> for PlacementAccumulator {
    fn extend<T: IntoIterator<Item = &'a PredictionRecord>>(&mut self, iter: T) {
        for record in iter {
            self.push(&record.sample_id, record.label);
        }
    }
}

/// Aggregate an ordered sequence of prediction records.
///
/// # Errors
///
/// Returns [`MetricError::EmptyEvaluationSet`] if `records` is empty.
pub fn aggregate(records: &[PredictionRecord]) -> MetricResult<AccuracyReport> {
    let mut accumulator = PlacementAccumulator::new();
    accumulator.extend(records);
    accumulator.report()
}
