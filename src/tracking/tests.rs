//! Tests for the tracking module

use std::collections::BTreeMap;

use tempfile::TempDir;

use super::storage::{InMemoryBackend, JsonFileBackend, TrackingBackend, TrackingStorageError};
use super::{ExperimentTracker, Run, RunStatus, TrackingError};

/// Backend whose every write fails, standing in for an unreachable server
#[derive(Debug, Default)]
struct UnavailableBackend;

impl TrackingBackend for UnavailableBackend {
    fn save_run(&mut self, _run: &Run) -> super::storage::Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "tracking server down").into())
    }

    fn load_run(&self, run_id: &str) -> super::storage::Result<Run> {
        Err(TrackingStorageError::RunNotFound(run_id.to_string()))
    }

    fn list_runs(&self) -> super::storage::Result<Vec<Run>> {
        Ok(Vec::new())
    }
}

fn tracker() -> ExperimentTracker {
    ExperimentTracker::new("gradient_boosting_housing", InMemoryBackend::new())
}

#[test]
fn test_run_status_serde() {
    assert_eq!(serde_json::to_string(&RunStatus::Completed).unwrap(), "\"completed\"");
    let status: RunStatus = serde_json::from_str("\"failed\"").unwrap();
    assert_eq!(status, RunStatus::Failed);
}

#[test]
fn test_named_run_uses_name_as_id() {
    let mut t = tracker();
    let id = t.start_run(Some("retrain_20250601_120000")).unwrap();
    assert_eq!(id, "retrain_20250601_120000");
    let run = t.get_run(&id).unwrap();
    assert_eq!(run.status, RunStatus::Active);
    assert_eq!(run.experiment_name, "gradient_boosting_housing");
}

#[test]
fn test_unnamed_runs_are_sequential() {
    let mut t = tracker();
    assert_eq!(t.start_run(None).unwrap(), "run-1");
    assert_eq!(t.start_run(None).unwrap(), "run-2");
}

#[test]
fn test_duplicate_name_gets_new_id() {
    let mut t = tracker();
    let first = t.start_run(Some("retrain_x")).unwrap();
    let second = t.start_run(Some("retrain_x")).unwrap();
    assert_ne!(first, second);
    assert!(second.starts_with("retrain_x-"));
}

#[test]
fn test_runs_inherit_tags() {
    let mut t = tracker();
    t.add_tag("stage", "retrain");
    let id = t.start_run(None).unwrap();
    assert_eq!(t.get_run(&id).unwrap().tags["stage"], "retrain");
}

#[test]
fn test_log_params_metrics_artifacts() {
    let mut t = tracker();
    let id = t.start_run(None).unwrap();
    t.log_param(&id, "n_estimators", "100").unwrap();
    t.log_metric(&id, "rmse", 3.5, 0).unwrap();
    t.log_metric(&id, "rmse", 3.1, 1).unwrap();
    t.log_artifact(&id, "models/m.json").unwrap();
    t.end_run(&id, RunStatus::Completed).unwrap();

    let run = t.get_run(&id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.end_time.is_some());
    assert_eq!(run.params["n_estimators"], "100");
    assert_eq!(run.metrics["rmse"].len(), 2);
    assert_eq!(run.latest_metric("rmse"), Some(3.1));
    assert_eq!(run.artifacts, vec!["models/m.json"]);
}

#[test]
fn test_cannot_log_after_end() {
    let mut t = tracker();
    let id = t.start_run(None).unwrap();
    t.end_run(&id, RunStatus::Failed).unwrap();
    assert!(matches!(t.log_param(&id, "k", "v"), Err(TrackingError::RunNotActive(_))));
    assert!(matches!(t.end_run(&id, RunStatus::Completed), Err(TrackingError::RunNotFound(_))));
}

#[test]
fn test_get_run_not_found() {
    assert!(matches!(tracker().get_run("nope"), Err(TrackingError::RunNotFound(_))));
}

#[test]
fn test_log_run_records_everything() {
    let mut t = tracker();
    let params: BTreeMap<String, String> = [("max_depth".to_string(), "3".to_string())].into();
    let metrics: BTreeMap<String, f64> =
        [("rmse".to_string(), 2.5), ("r2".to_string(), 0.8)].into();

    let id = t.log_run("retrain_v1", &params, &metrics, &["a.json".to_string()]).unwrap();
    let run = t.get_run(&id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.latest_metric("r2"), Some(0.8));
    assert_eq!(t.list_runs().unwrap().len(), 1);
}

#[test]
fn test_log_run_with_unavailable_backend() {
    let mut t = ExperimentTracker::new("exp", UnavailableBackend);
    let err = t.log_run("retrain_v1", &BTreeMap::new(), &BTreeMap::new(), &[]).unwrap_err();
    assert!(matches!(err, TrackingError::Storage(TrackingStorageError::Io(_))));
    // nothing is left active
    assert!(t.list_runs().unwrap().is_empty());
}

#[test]
fn test_json_backend_persists_across_trackers() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("exp"));
    let mut t = ExperimentTracker::new("exp", backend.clone());
    let id = t.log_run("retrain_20250601_120000", &BTreeMap::new(), &BTreeMap::new(), &[]).unwrap();

    let reopened = ExperimentTracker::new("exp", backend);
    let run = reopened.get_run(&id).unwrap();
    assert_eq!(run.run_name.as_deref(), Some("retrain_20250601_120000"));
    assert_eq!(reopened.list_runs().unwrap().len(), 1);
}

#[test]
fn test_json_backend_name_collision_across_processes() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::new(dir.path());
    let mut first = ExperimentTracker::new("exp", backend.clone());
    first.log_run("retrain_a", &BTreeMap::new(), &BTreeMap::new(), &[]).unwrap();

    let mut second = ExperimentTracker::new("exp", backend);
    let id = second.log_run("retrain_a", &BTreeMap::new(), &BTreeMap::new(), &[]).unwrap();
    assert_ne!(id, "retrain_a");
    assert_eq!(second.list_runs().unwrap().len(), 2);
}

#[test]
fn test_json_backend_missing_dir_lists_nothing() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("absent"));
    assert!(backend.list_runs().unwrap().is_empty());
    assert!(!backend.contains("x").unwrap());
}

#[test]
fn test_json_backend_sanitizes_file_names() {
    let dir = TempDir::new().unwrap();
    let mut backend = JsonFileBackend::new(dir.path());
    let mut t = ExperimentTracker::new("exp", InMemoryBackend::new());
    let id = t.start_run(Some("../escape")).unwrap();
    let run = t.get_run(&id).unwrap();
    backend.save_run(&run).unwrap();

    assert!(dir.path().join(".._escape.json").exists());
    assert_eq!(backend.load_run("../escape").unwrap().run_id, "../escape");
}

#[test]
fn test_in_memory_backend_overwrite() {
    let mut backend = InMemoryBackend::new();
    let mut t = tracker();
    let id = t.start_run(None).unwrap();
    let mut run = t.get_run(&id).unwrap();
    backend.save_run(&run).unwrap();
    run.status = RunStatus::Completed;
    backend.save_run(&run).unwrap();
    assert_eq!(backend.list_runs().unwrap().len(), 1);
    assert_eq!(backend.load_run(&id).unwrap().status, RunStatus::Completed);
}
