//! Durable state of the control loop
//!
//! - [`prediction_log`]: append-only log written by the serving layer
//! - [`registry`]: versioned model artifacts and the current-model pointer

pub mod prediction_log;
pub mod registry;

pub use prediction_log::{PredictionLog, PredictionRecord, WindowSpec};
pub use registry::{CurrentModelPointer, FsModelRegistry, ModelArtifact, ModelRegistry};
