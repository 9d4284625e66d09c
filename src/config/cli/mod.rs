//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! driftloop train
//! driftloop detect --last 500
//! driftloop run --config driftloop.yaml
//! driftloop retrain --seed 7
//! driftloop current --format json
//! driftloop versions
//! driftloop rollback 20250601_120000
//! ```

mod core;
mod types;

pub use core::{
    apply_overrides, parse_args, Cli, Command, DataArgs, DetectArgs, DriftArgs, RegistryArgs,
    RetrainArgs, RollbackArgs, RunArgs, TrainArgs, TrainerArgs,
};
pub use types::{DriftTestArg, OutputFormat};
