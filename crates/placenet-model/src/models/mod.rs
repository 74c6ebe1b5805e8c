//! # Model Architectures
//!
//! - `object_place_net`: target-to-reference attention classifier.

pub mod object_place_net;
