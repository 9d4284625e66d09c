//! YAML schema of the control loop configuration
//!
//! Every section and field has a default, so an empty file (or no file at all)
//! describes the stock Boston-housing deployment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::eval::drift::DriftTest;
use crate::eval::retrain::RetrainConfig;
use crate::storage::registry::PromotionPolicy;
use crate::storage::WindowSpec;
use crate::train::TrainerConfig;

/// Default experiment name of retrain runs
pub const DEFAULT_EXPERIMENT: &str = "gradient_boosting_housing";

/// Complete control loop configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub paths: PathsConfig,
    pub drift: DriftConfig,
    pub retrain: RetrainSection,
    pub trainer: TrainerConfig,
    pub promotion: PromotionPolicy,
    pub tracking: TrackingConfig,
}

/// Locations of inputs and outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Labeled reference CSV
    pub reference: PathBuf,
    /// Target column of the reference CSV
    pub target_column: String,
    /// Prediction log CSV written by the serving layer
    pub prediction_log: PathBuf,
    /// Artifacts, pointer, promotion history, retrain state, and lock
    pub models_dir: PathBuf,
    /// Drift report artifacts
    pub reports_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            reference: PathBuf::from("data/housing.csv"),
            target_column: "medv".to_string(),
            prediction_log: PathBuf::from("data/prediction_logs.csv"),
            models_dir: PathBuf::from("models"),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

/// Drift detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub test: DriftTest,
    /// Part of the prediction log compared against the reference
    pub window: WindowSpec,
    /// Write JSON and HTML report artifacts on every detection
    pub write_reports: bool,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self { test: DriftTest::default(), window: WindowSpec::default(), write_reports: true }
    }
}

/// How a triggered retrain is carried out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StepConfig {
    /// Train and promote inside the running process
    #[default]
    InProcess,
    /// Run an external command; only its exit status counts
    Command { program: String, args: Vec<String> },
}

/// Retrain trigger settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrainSection {
    #[serde(flatten)]
    pub trigger: RetrainConfig,
    pub step: StepConfig,
}

/// Experiment tracking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub enabled: bool,
    pub experiment_name: String,
    /// Directory of JSON run files
    pub dir: PathBuf,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            experiment_name: DEFAULT_EXPERIMENT.to_string(),
            dir: PathBuf::from("mlruns"),
        }
    }
}
