//! Tests for configuration validation

use super::*;
use crate::config::schema::{LoopConfig, StepConfig};
use crate::eval::drift::DriftTest;
use crate::eval::retrain::RetrainPolicy;
use crate::storage::registry::{Comparison, PromotionPolicy};
use crate::storage::WindowSpec;

#[test]
fn test_default_config_is_valid() {
    assert!(validate_config(&LoopConfig::default()).is_ok());
}

#[test]
fn test_empty_target_column() {
    let mut config = LoopConfig::default();
    config.paths.target_column = " ".into();
    assert!(matches!(validate_config(&config), Err(ValidationError::EmptyTargetColumn)));
}

#[test]
fn test_ks_threshold_must_be_a_probability() {
    let mut config = LoopConfig::default();
    config.drift.test = DriftTest::KS { threshold: 1.5 };
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidThreshold { test: "Kolmogorov-Smirnov", .. })
    ));
    config.drift.test = DriftTest::Auto;
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_distance_threshold_must_be_positive() {
    let mut config = LoopConfig::default();
    config.drift.test = DriftTest::PSI { threshold: 0.0 };
    assert!(validate_config(&config).is_err());
    config.drift.test = DriftTest::Wasserstein { threshold: 2.0 };
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_zero_window() {
    let mut config = LoopConfig::default();
    config.drift.window = WindowSpec::LastN { count: 0 };
    assert!(matches!(validate_config(&config), Err(ValidationError::InvalidWindow(_))));
}

#[test]
fn test_unsatisfiable_policies() {
    let mut config = LoopConfig::default();
    config.retrain.trigger.policy = RetrainPolicy::FeatureCount { count: 0 };
    assert!(matches!(validate_config(&config), Err(ValidationError::UnsatisfiablePolicy(_))));
    config.retrain.trigger.policy = RetrainPolicy::CriticalFeature { names: vec![] };
    assert!(validate_config(&config).is_err());
    config.retrain.trigger.policy = RetrainPolicy::DriftPercentage { threshold: 120.0 };
    assert!(matches!(validate_config(&config), Err(ValidationError::InvalidDriftPercentage(_))));
}

#[test]
fn test_empty_command_step() {
    let mut config = LoopConfig::default();
    config.retrain.step = StepConfig::Command { program: String::new(), args: vec![] };
    assert!(matches!(validate_config(&config), Err(ValidationError::EmptyCommand)));
}

#[test]
fn test_trainer_errors_are_wrapped() {
    let mut config = LoopConfig::default();
    config.trainer.boosting.n_estimators = 0;
    assert!(matches!(validate_config(&config), Err(ValidationError::InvalidTrainer(_))));
}

#[test]
fn test_promotion_policy_checks() {
    let mut config = LoopConfig::default();
    config.promotion = PromotionPolicy::default().require_metric("accuracy", Comparison::Gte, 0.9);
    assert!(matches!(validate_config(&config), Err(ValidationError::InvalidPromotion(_))));
    config.promotion = PromotionPolicy::default().no_regression(-0.1);
    assert!(validate_config(&config).is_err());
    config.promotion = PromotionPolicy::default()
        .require_metric("r2", Comparison::Gte, 0.5)
        .no_regression(0.05);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_tracking_needs_experiment_name() {
    let mut config = LoopConfig::default();
    config.tracking.experiment_name.clear();
    assert!(matches!(validate_config(&config), Err(ValidationError::EmptyExperimentName)));
    config.tracking.enabled = false;
    assert!(validate_config(&config).is_ok());
}
