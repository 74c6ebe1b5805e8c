//! # ObjectPlaceNet
//!
//! Object-placement classifier built on the Burn framework. Given a foreground
//! (target) object placed into a background, the network scores whether the
//! placement is plausible by attending from the target to the reference objects
//! already present in the background.
//!
//! ## Modules
//!
//! - `batch`: Batched model inputs and the sample ids that travel with them.
//! - `config`: `ObjectPlaceNetConfig`, validation and checkpoint loading.
//! - `error`: The crate's error type.
//! - `models`: The network itself.
//! - `predictor`: The `Predictor` trait consumed by evaluation drivers.

mod batch;
mod config;
mod error;
mod models;
mod predictor;

#[doc(inline)]
pub use batch::{PlacementBatch, PlacementInputs};
#[doc(inline)]
pub use config::{BOX_DIM, ObjectPlaceNetConfig};
#[doc(inline)]
pub use error::{ModelError, ModelResult};
#[doc(inline)]
pub use models::object_place_net::{ObjectPlaceNet, ObjectPlaceNetRecord, PlacementOutput};
#[doc(inline)]
pub use predictor::Predictor;
