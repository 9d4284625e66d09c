//! Experiment Tracking Module
//!
//! Records the parameters, held-out metrics, and artifact path of every
//! retrain so runs can be compared after the fact. Backed by pluggable storage
//! via the [`TrackingBackend`](storage::TrackingBackend) trait.
//!
//! # Architecture
//!
//! - **`ExperimentTracker`**: Top-level handle that manages runs for a named experiment
//! - **`Run`**: A single retrain run with parameters, metrics, and artifacts
//! - **`TrackingBackend`**: Pluggable persistence (JSON files, in-memory)
//!
//! Tracking is advisory: callers treat a [`TrackingError`] as a reason to
//! warn, never as a reason to abort a retrain.
//!
//! # Example
//!
//! ```
//! use driftloop::tracking::{ExperimentTracker, RunStatus};
//! use driftloop::tracking::storage::InMemoryBackend;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let mut tracker = ExperimentTracker::new("gradient_boosting_housing", InMemoryBackend::new());
//! tracker.add_tag("team", "ml-infra");
//!
//! let run_id = tracker.start_run(Some("retrain_20250601_120000"))?;
//! tracker.log_param(&run_id, "n_estimators", "100")?;
//! tracker.log_metric(&run_id, "rmse", 3.1, 0)?;
//! tracker.log_artifact(&run_id, "models/gradient_boosting_model_20250601_120000.json")?;
//! tracker.end_run(&run_id, RunStatus::Completed)?;
//!
//! let run = tracker.get_run(&run_id)?;
//! assert_eq!(run.params["n_estimators"], "100");
//! # Ok(())
//! # }
//! ```

pub mod storage;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storage::{TrackingBackend, TrackingStorageError};

/// Status of a tracking run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run is actively recording
    Active,
    /// Run completed successfully
    Completed,
    /// Run failed
    Failed,
}

/// A single metric data point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub value: f64,
    pub step: u64,
}

/// A single experiment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Unique identifier for the run within its experiment
    pub run_id: String,
    /// Optional human-readable name
    pub run_name: Option<String>,
    /// Parent experiment name
    pub experiment_name: String,
    /// Current status
    pub status: RunStatus,
    /// Hyperparameters: key -> value (string-encoded)
    pub params: BTreeMap<String, String>,
    /// Metrics: key -> values in logging order
    pub metrics: BTreeMap<String, Vec<MetricEntry>>,
    /// Artifact paths
    pub artifacts: Vec<String>,
    /// Tags: key -> value
    pub tags: BTreeMap<String, String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Run {
    fn new(run_id: String, run_name: Option<String>, experiment_name: String) -> Self {
        Self {
            run_id,
            run_name,
            experiment_name,
            status: RunStatus::Active,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            artifacts: Vec::new(),
            tags: BTreeMap::new(),
            start_time: Utc::now(),
            end_time: None,
        }
    }

    /// Last logged value of a metric
    pub fn latest_metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).and_then(|v| v.last()).map(|e| e.value)
    }
}

/// Errors from experiment tracking operations
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Run is not active: {0}")]
    RunNotActive(String),

    #[error("Storage error: {0}")]
    Storage(#[from] TrackingStorageError),
}

/// Result alias for tracking operations
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Experiment tracker
///
/// Manages runs under a single experiment name. Active runs live in memory;
/// ending a run persists it through the backend.
pub struct ExperimentTracker {
    experiment_name: String,
    tags: BTreeMap<String, String>,
    backend: Box<dyn TrackingBackend + Send>,
    /// Active runs held in memory for fast mutation
    active_runs: HashMap<String, Run>,
    next_run_id: u64,
}

impl std::fmt::Debug for ExperimentTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExperimentTracker")
            .field("experiment_name", &self.experiment_name)
            .field("tags", &self.tags)
            .field("active_runs", &self.active_runs.len())
            .finish_non_exhaustive()
    }
}

impl ExperimentTracker {
    /// Create a new tracker for the given experiment name
    pub fn new(experiment_name: impl Into<String>, backend: impl TrackingBackend + Send + 'static) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            tags: BTreeMap::new(),
            backend: Box::new(backend),
            active_runs: HashMap::new(),
            next_run_id: 1,
        }
    }

    /// Add an experiment-level tag
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Start a new run, optionally with a human-readable name
    ///
    /// A named run uses its name as id unless that id is already taken, so
    /// runs stay addressable across processes. Returns the run id.
    pub fn start_run(&mut self, run_name: Option<&str>) -> Result<String> {
        let run_id = loop {
            let candidate = match run_name {
                Some(name) if self.next_run_id == 1 => name.to_string(),
                Some(name) => format!("{name}-{}", self.next_run_id),
                None => format!("run-{}", self.next_run_id),
            };
            self.next_run_id += 1;
            if !self.active_runs.contains_key(&candidate) && !self.backend.contains(&candidate)? {
                break candidate;
            }
        };

        let mut run = Run::new(run_id.clone(), run_name.map(String::from), self.experiment_name.clone());
        // Inherit experiment-level tags
        run.tags.extend(self.tags.iter().map(|(k, v)| (k.clone(), v.clone())));

        self.active_runs.insert(run_id.clone(), run);
        Ok(run_id)
    }

    /// End a run with the given status, persisting it to the backend
    pub fn end_run(&mut self, run_id: &str, status: RunStatus) -> Result<()> {
        let mut run = self
            .active_runs
            .remove(run_id)
            .ok_or_else(|| TrackingError::RunNotFound(run_id.to_string()))?;

        run.status = status;
        run.end_time = Some(Utc::now());

        self.backend.save_run(&run)?;
        Ok(())
    }

    fn active_run(&mut self, run_id: &str) -> Result<&mut Run> {
        self.active_runs
            .get_mut(run_id)
            .ok_or_else(|| TrackingError::RunNotActive(run_id.to_string()))
    }

    /// Log a single parameter (hyperparameter)
    pub fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()> {
        self.active_run(run_id)?.params.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Log multiple parameters at once
    pub fn log_params(&mut self, run_id: &str, params: &BTreeMap<String, String>) -> Result<()> {
        let run = self.active_run(run_id)?;
        run.params.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    /// Log a metric value at a given step
    pub fn log_metric(&mut self, run_id: &str, key: &str, value: f64, step: u64) -> Result<()> {
        self.active_run(run_id)?
            .metrics
            .entry(key.to_string())
            .or_default()
            .push(MetricEntry { value, step });
        Ok(())
    }

    /// Log an artifact path
    pub fn log_artifact(&mut self, run_id: &str, path: &str) -> Result<()> {
        self.active_run(run_id)?.artifacts.push(path.to_string());
        Ok(())
    }

    /// Record a finished run in one call
    ///
    /// If persisting fails the run is dropped from memory and the error
    /// returned; nothing is left active.
    pub fn log_run(
        &mut self,
        run_name: &str,
        params: &BTreeMap<String, String>,
        metrics: &BTreeMap<String, f64>,
        artifacts: &[String],
    ) -> Result<String> {
        let run_id = self.start_run(Some(run_name))?;
        self.log_params(&run_id, params)?;
        for (key, value) in metrics {
            self.log_metric(&run_id, key, *value, 0)?;
        }
        for path in artifacts {
            self.log_artifact(&run_id, path)?;
        }
        self.end_run(&run_id, RunStatus::Completed)?;
        Ok(run_id)
    }

    /// Retrieve a run by ID
    ///
    /// Checks active (in-memory) runs first, then falls back to the backend.
    pub fn get_run(&self, run_id: &str) -> Result<Run> {
        if let Some(run) = self.active_runs.get(run_id) {
            return Ok(run.clone());
        }
        self.backend
            .load_run(run_id)
            .map_err(|e| TrackingError::RunNotFound(format!("{run_id}: {e}")))
    }

    /// List all runs (active + persisted), sorted by start time then id
    pub fn list_runs(&self) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self.active_runs.values().cloned().collect();
        for r in self.backend.list_runs()? {
            if !self.active_runs.contains_key(&r.run_id) {
                runs.push(r);
            }
        }
        runs.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.run_id.cmp(&b.run_id)));
        Ok(runs)
    }
}
