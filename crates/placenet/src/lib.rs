//! `placenet`: evaluation of object-placement plausibility classifiers.
//!
//! One run loads an [`ObjectPlaceNet`](placenet_model::ObjectPlaceNet)
//! checkpoint, predicts every `(foreground, background)` pair of a precomputed
//! artifact set, and appends two accuracy figures to a report file next to the
//! artifacts:
//!
//! - `pred_acc`, the fraction of pairs predicted as plausible placements;
//! - `no_replica` accuracy, the same fraction computed per sample id and then
//!   averaged, so heavily replicated samples do not dominate.

pub mod backend;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod report;

#[doc(inline)]
pub use backend::burn_backend_types;
#[doc(inline)]
pub use config::EvalConfig;
#[doc(inline)]
pub use error::{PlacenetError, PlacenetResult};
#[doc(inline)]
pub use evaluation::{
    EvaluationPass, collect_predictions, evaluate, predict_dataset, run_evaluation,
};
#[doc(inline)]
pub use placenet_data as data;
#[doc(inline)]
pub use placenet_metric as metric;
#[doc(inline)]
pub use placenet_model as model;
