//! Retraining from reference data plus a drifted window

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use super::config::TrainerConfig;
use super::gbm::{GradientBoostingRegressor, Regressor};
use super::metrics::{Metric, MAE, R2Score, RMSE};
use super::model::TrainedModel;
use super::prep::{synthetic_targets, train_test_split, MeanImputer};
use crate::data::{FeatureSnapshot, FeatureTable, ReferenceDataset};
use crate::storage::registry::{next_version_id, TrainedMetrics};
use crate::storage::ModelArtifact;
use crate::tracking::ExperimentTracker;
use crate::{Error, Result};

/// Outcome of a single fit, before it becomes an artifact
#[derive(Debug, Clone)]
pub struct TrainResult {
    pub model: TrainedModel,
    pub metrics: TrainedMetrics,
    pub reference_rows: usize,
    pub window_rows: usize,
    pub train_rows: usize,
    pub validation_rows: usize,
}

/// Fits new model versions
///
/// Remembers the last version id it issued so ids stay strictly increasing
/// within a process; seed it with the registry's newest version to extend
/// that across processes.
#[derive(Debug)]
pub struct Trainer {
    config: TrainerConfig,
    tracker: Option<ExperimentTracker>,
    last_version: Option<String>,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config, tracker: None, last_version: None }
    }

    /// Record every run in `tracker`
    pub fn with_tracker(mut self, tracker: ExperimentTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn tracker(&self) -> Option<&ExperimentTracker> {
        self.tracker.as_ref()
    }

    pub fn last_version(&self) -> Option<&str> {
        self.last_version.as_deref()
    }

    /// Never issue a version id at or before `version`
    pub fn observe_version(&mut self, version: Option<String>) {
        if version.as_deref() > self.last_version.as_deref() {
            self.last_version = version;
        }
    }

    /// Train on `reference ∪ window` and package the result as an artifact
    ///
    /// Window rows get synthetic targets; the window must carry exactly the
    /// reference feature set.
    pub fn train(
        &mut self,
        reference: &ReferenceDataset,
        window: &FeatureSnapshot,
    ) -> Result<ModelArtifact> {
        self.config.validate()?;
        if window.is_empty() {
            return Err(Error::TrainingFailure("drifted window is empty, nothing to retrain on".into()));
        }
        let window_features = window.aligned_to(reference)?;
        log_missing(&window_features);

        let result = self.fit(reference, &window_features)?;
        self.package(reference, result, "synthetic_resample")
    }

    /// Train the first model from the reference dataset alone
    ///
    /// Needs no prediction log, so a fresh deployment can get a model to
    /// serve before any predictions exist.
    pub fn train_initial(&mut self, reference: &ReferenceDataset) -> Result<ModelArtifact> {
        self.config.validate()?;
        let no_window = FeatureTable::empty(reference.feature_names().to_vec());
        let result = self.fit(reference, &no_window)?;
        self.package(reference, result, "reference")
    }

    fn package(
        &mut self,
        reference: &ReferenceDataset,
        result: TrainResult,
        target: &str,
    ) -> Result<ModelArtifact> {
        let version_id = next_version_id(Utc::now(), self.last_version.as_deref(), |_| false)
            .map_err(|e| Error::TrainingFailure(e.to_string()))?;

        let payload = result.model.to_payload()?;
        let mut artifact = ModelArtifact::new(
            &self.config.model_name,
            &version_id,
            result.metrics,
            reference.feature_names().to_vec(),
            payload,
        );
        for (key, value) in self.run_params(&result, target) {
            artifact = artifact.with_parameter(&key, value);
        }

        info!(
            version = %version_id,
            rmse = result.metrics.rmse,
            r2 = result.metrics.r2,
            mae = result.metrics.mae,
            rows = result.train_rows + result.validation_rows,
            "model trained"
        );
        self.last_version = Some(version_id);
        Ok(artifact)
    }

    /// Fit and evaluate without versioning
    pub fn fit(&self, reference: &ReferenceDataset, window: &FeatureTable) -> Result<TrainResult> {
        let targets = synthetic_targets(reference.target(), window.n_rows(), self.config.seed)?;
        let combined = reference.features().concat(window)?;
        let y: Vec<f64> = reference.target().iter().copied().chain(targets).collect();

        let imputer = MeanImputer::fit(&combined)?;
        let x = imputer.transform(combined.rows());
        let (train_idx, test_idx) =
            train_test_split(x.len(), self.config.test_fraction, self.config.seed)?;

        let pick_x = |idx: &[usize]| idx.iter().map(|&i| x[i].clone()).collect::<Vec<_>>();
        let pick_y = |idx: &[usize]| idx.iter().map(|&i| y[i]).collect::<Vec<_>>();
        let (x_train, y_train) = (pick_x(&train_idx), pick_y(&train_idx));
        let (x_test, y_test) = (pick_x(&test_idx), pick_y(&test_idx));

        let mut regressor = GradientBoostingRegressor::new(self.config.boosting);
        regressor.fit(&x_train, &y_train)?;

        let predictions = regressor.predict(&x_test);
        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(Error::TrainingFailure("model produced non-finite predictions".into()));
        }
        let metrics = TrainedMetrics {
            rmse: RMSE.compute(&predictions, &y_test),
            r2: R2Score.compute(&predictions, &y_test),
            mae: MAE.compute(&predictions, &y_test),
        };
        if !metrics.is_finite() {
            return Err(Error::TrainingFailure(format!(
                "non-finite validation metrics (rmse={}, r2={}, mae={})",
                metrics.rmse, metrics.r2, metrics.mae
            )));
        }

        Ok(TrainResult {
            model: TrainedModel::new(imputer, regressor),
            metrics,
            reference_rows: reference.len(),
            window_rows: window.n_rows(),
            train_rows: train_idx.len(),
            validation_rows: test_idx.len(),
        })
    }

    fn run_params(&self, result: &TrainResult, target: &str) -> BTreeMap<String, String> {
        let mut params = GradientBoostingRegressor::new(self.config.boosting).params();
        params.insert("seed".into(), self.config.seed.to_string());
        params.insert("test_fraction".into(), self.config.test_fraction.to_string());
        params.insert("reference_rows".into(), result.reference_rows.to_string());
        params.insert("window_rows".into(), result.window_rows.to_string());
        params.insert("target".into(), target.into());
        params
    }

    /// Log params, metrics, and artifact path of a trained artifact
    ///
    /// Returns the tracking run id. A tracker failure is logged as a warning
    /// and reported as [`Error::TrackingUnavailable`]; callers go on to promote.
    pub fn track(&mut self, artifact: &ModelArtifact, artifact_path: &Path) -> Result<Option<String>> {
        let Some(tracker) = self.tracker.as_mut() else {
            return Ok(None);
        };
        let metrics: BTreeMap<String, f64> = [
            ("rmse".to_string(), artifact.metrics.rmse),
            ("r2".to_string(), artifact.metrics.r2),
            ("mae".to_string(), artifact.metrics.mae),
        ]
        .into();
        let prefix = match artifact.parameters.get("target").map(String::as_str) {
            Some("reference") => "train",
            _ => "retrain",
        };
        let run_name = format!("{prefix}_{}", artifact.version_id);

        match tracker.log_run(
            &run_name,
            &artifact.parameters,
            &metrics,
            &[artifact_path.display().to_string()],
        ) {
            Ok(run_id) => {
                info!(run = %run_id, experiment = tracker.experiment_name(), "tracking run recorded");
                Ok(Some(run_id))
            }
            Err(e) => {
                warn!(error = %e, version = %artifact.version_id, "experiment tracking unavailable, continuing");
                Err(Error::TrackingUnavailable(e.to_string()))
            }
        }
    }
}

/// Per-column NaN diagnostics of the window
fn log_missing(window: &FeatureTable) {
    let missing: Vec<(String, usize)> =
        window.missing_counts().into_iter().filter(|(_, n)| *n > 0).collect();
    if missing.is_empty() {
        info!(rows = window.n_rows(), "drifted window has no missing values");
    } else {
        for (column, count) in &missing {
            warn!(column = %column, missing = count, rows = window.n_rows(), "missing values in drifted window");
        }
    }
}
