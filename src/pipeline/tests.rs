//! Tests for the control loop

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::*;
use crate::config::LoopConfig;
use crate::eval::drift::DriftTest;
use crate::storage::PredictionRecord;
use crate::Error;

fn age(i: usize) -> f64 {
    (i * 37 % 100) as f64
}

fn rm(i: usize) -> f64 {
    4.0 + (i % 9) as f64 * 0.5
}

fn write_reference(path: &Path) {
    let mut csv = String::from("age,rm,medv\n");
    for i in 0..200 {
        let _ = writeln!(csv, "{},{},{}", age(i), rm(i), 5.0 * rm(i) - 0.1 * age(i));
    }
    fs::write(path, csv).unwrap();
}

fn write_log(path: &Path, shift: f64) {
    let log = PredictionLog::new(path);
    for i in (0..200).step_by(2) {
        let features: BTreeMap<String, f64> =
            [("age".to_string(), age(i) + shift), ("rm".to_string(), rm(i))].into();
        log.append(&PredictionRecord::new(features, 22.0)).unwrap();
    }
}

fn config(dir: &Path, shift: f64) -> LoopConfig {
    let mut config = LoopConfig::default();
    config.paths.reference = dir.join("housing.csv");
    config.paths.prediction_log = dir.join("prediction_logs.csv");
    config.paths.models_dir = dir.join("models");
    config.paths.reports_dir = dir.join("reports");
    config.tracking.dir = dir.join("mlruns");
    config.trainer.boosting.n_estimators = 10;
    write_reference(&config.paths.reference);
    write_log(&config.paths.prediction_log, shift);
    config
}

#[test]
fn test_detect_writes_report_artifacts() {
    let dir = TempDir::new().unwrap();
    let control = ControlLoop::new(config(dir.path(), 30.0)).unwrap();
    let detection = control.detect().unwrap();

    assert!(detection.report.overall_drift);
    let paths = detection.report_paths.unwrap();
    assert!(paths.json.exists());
    assert!(paths.html.exists());
}

#[test]
fn test_reports_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path(), 0.0);
    config.drift.write_reports = false;
    let detection = ControlLoop::new(config).unwrap().detect().unwrap();
    assert!(detection.report_paths.is_none());
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn test_configured_test_is_used() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path(), 30.0);
    config.drift.test = DriftTest::PSI { threshold: 0.2 };
    let detection = ControlLoop::new(config).unwrap().detect().unwrap();
    assert_eq!(detection.report.test, DriftTest::PSI { threshold: 0.2 });
    assert!(detection.report.overall_drift);
}

#[test]
fn test_dry_run_never_promotes() {
    let dir = TempDir::new().unwrap();
    let control = ControlLoop::new(config(dir.path(), 30.0)).unwrap();
    let outcome = control.dry_run().unwrap();

    assert!(outcome.decision.retrain);
    assert!(matches!(outcome.action, Action::WarningLogged { ref reason } if reason.starts_with("dry run")));
    assert!(outcome.current.is_none());
    assert!(control.registry().list_versions().unwrap().is_empty());
}

#[test]
fn test_explicit_retrain_promotes_without_drift() {
    let dir = TempDir::new().unwrap();
    let mut control = ControlLoop::new(config(dir.path(), 0.0)).unwrap();
    let outcome = control.retrain().unwrap();

    assert_eq!(outcome.current.version_id, outcome.version_id);
    assert!(outcome.artifact_path.exists());
    assert_eq!(outcome.tracking_run, Some(format!("retrain_{}", outcome.version_id)));
    assert!(dir.path().join("mlruns").exists());
}

#[test]
fn test_initial_training_leaves_trigger_free() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path(), 30.0);
    config.retrain.trigger.cooldown_secs = 3600;
    let mut control = ControlLoop::new(config).unwrap();

    let initial = control.train_initial().unwrap();
    assert_eq!(initial.tracking_run, Some(format!("train_{}", initial.version_id)));

    let outcome = control.run_once().unwrap();
    assert!(outcome.decision.retrain);
    assert!(matches!(outcome.action, Action::Retrained { .. }));
    assert_eq!(control.registry().list_versions().unwrap().len(), 2);
}

#[test]
fn test_tracking_disabled() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path(), 0.0);
    config.tracking.enabled = false;
    let mut control = ControlLoop::new(config).unwrap();
    assert!(control.trainer().tracker().is_none());
    assert_eq!(control.retrain().unwrap().tracking_run, None);
}

#[test]
fn test_missing_reference_is_insufficient_data() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path(), 0.0);
    config.paths.reference = dir.path().join("absent.csv");
    let err = ControlLoop::new(config).unwrap().detect().unwrap_err();
    assert!(matches!(err, Error::InsufficientData(_)));
}

#[cfg(unix)]
#[test]
fn test_failing_command_step_keeps_pointer() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path(), 30.0);
    config.retrain.step = StepConfig::Command { program: "false".into(), args: vec![] };
    let mut control = ControlLoop::new(config).unwrap();

    let err = control.run_once().unwrap_err();
    assert!(err.is_training_failure());
    assert!(control.registry().resolve_current().unwrap().is_none());
    assert!(!control.trigger().lock_path().exists());
}
