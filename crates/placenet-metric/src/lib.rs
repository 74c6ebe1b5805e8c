//! # Placement Metrics
//!
//! Accuracy metrics for object-placement classification, implemented on top of
//! the Burn framework.
//!
//! A placement classifier scores (foreground, background) pairs. Several pairs
//! may share a sample identity (replica placements of the same composite), so
//! two statistics are reported:
//!
//! - `pred_acc`: fraction of all pairs predicted as a positive placement.
//! - `pred_acc_no_replica`: per-identity positive fraction, averaged across
//!   identities so that heavily replicated samples do not dominate.
//!
//! ## Usage
//!
//! ```rust
//! use placenet_metric::{PredictionRecord, aggregate};
//!
//! let records = vec![
//!     PredictionRecord::new("A".to_owned(), 1),
//!     PredictionRecord::new("A".to_owned(), 0),
//!     PredictionRecord::new("B".to_owned(), 1),
//! ];
//! let report = aggregate(&records).unwrap();
//! assert_eq!(report.total, 3);
//! assert_eq!(report.group_count, 2);
//! ```
//!
//! [`PlacementAccuracyMetric`] wraps the same accumulator behind Burn's
//! `Metric`/`Numeric` traits.

pub mod accuracy;
pub mod aggregator;
pub mod error;
pub mod input;

pub use accuracy::{AccuracyMode, PlacementAccuracyMetric, PlacementAccuracyMetricConfig};
pub use aggregator::{
    AccuracyReport, GroupAccuracy, POSITIVE_LABEL, PlacementAccumulator, PredictionRecord,
    aggregate,
};
pub use error::{MetricError, MetricResult};
pub use input::PlacementAccuracyInput;

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    pub type TestBackend = NdArray;
}
