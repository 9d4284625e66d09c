//! # driftloop
//!
//! Model lifecycle control loop for a served regression model.
//!
//! The serving layer appends every prediction to an append-only log. This crate
//! periodically compares the recently served inputs against the reference
//! dataset, retrains when the distributions diverge, and atomically promotes the
//! new artifact as the one the serving layer loads next.
//!
//! ## Modules
//!
//! - [`data`]: reference dataset and feature snapshot tables
//! - [`storage`]: prediction log store and model registry
//! - [`eval`]: drift detection and the retrain trigger
//! - [`train`]: gradient-boosted regressor and the retraining pipeline
//! - [`tracking`]: experiment tracking of retrain runs
//! - [`pipeline`]: the detect → decide → train → promote loop
//! - [`config`]: YAML configuration and CLI arguments
//! - [`cli`]: command handlers for the `driftloop` binary

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod eval;
pub mod pipeline;
pub mod storage;
pub mod tracking;
pub mod train;

pub use error::{Error, Result};
