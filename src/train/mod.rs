//! Retraining
//!
//! This module turns a reference dataset and a drifted window into a new,
//! versioned [`ModelArtifact`](crate::storage::ModelArtifact):
//! - Synthetic targets for the unlabeled window rows (seeded resampling)
//! - Mean imputation over the combined set
//! - Seeded shuffled train/validation split
//! - Gradient-boosted regression trees behind the [`Regressor`] trait
//! - RMSE and R² on the validation split
//!
//! # Example
//!
//! ```ignore
//! use driftloop::train::{Trainer, TrainerConfig};
//!
//! let mut trainer = Trainer::new(TrainerConfig::default());
//! let artifact = trainer.train(&reference, &window)?;
//! println!("{} rmse={:.3}", artifact.version_id, artifact.metrics.rmse);
//! ```

mod config;
mod gbm;
mod metrics;
mod model;
mod prep;
mod trainer;
mod tree;


pub use config::{TrainerConfig, DEFAULT_MODEL_NAME};
pub use gbm::{BoostingParams, GradientBoostingRegressor, Regressor};
pub use metrics::{Metric, R2Score, MAE, RMSE};
pub use model::TrainedModel;
pub use prep::{synthetic_targets, train_test_split, MeanImputer};
pub use trainer::{TrainResult, Trainer};
pub use tree::{RegressionTree, TreeParams};
