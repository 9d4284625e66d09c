//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::{LoopConfig, StepConfig};
use crate::eval::drift::DriftTest;
use crate::eval::retrain::RetrainPolicy;
use crate::storage::WindowSpec;

/// Validate a loaded configuration
///
/// Paths are not checked for existence here; the commands that read them
/// report missing files with their own context.
pub fn validate_config(config: &LoopConfig) -> Result<(), ValidationError> {
    if config.paths.target_column.trim().is_empty() {
        return Err(ValidationError::EmptyTargetColumn);
    }

    validate_drift_test(&config.drift.test)?;
    if let WindowSpec::LastN { count: 0 } = config.drift.window {
        return Err(ValidationError::InvalidWindow("last_n count must be > 0".into()));
    }

    match &config.retrain.trigger.policy {
        RetrainPolicy::AnyDrift => {}
        RetrainPolicy::FeatureCount { count } => {
            if *count == 0 {
                return Err(ValidationError::UnsatisfiablePolicy("feature_count 0".into()));
            }
        }
        RetrainPolicy::CriticalFeature { names } => {
            if names.is_empty() {
                return Err(ValidationError::UnsatisfiablePolicy(
                    "critical_feature without names".into(),
                ));
            }
        }
        RetrainPolicy::DriftPercentage { threshold } => {
            if !(0.0..=100.0).contains(threshold) {
                return Err(ValidationError::InvalidDriftPercentage(*threshold));
            }
        }
    }

    if let StepConfig::Command { program, .. } = &config.retrain.step {
        if program.trim().is_empty() {
            return Err(ValidationError::EmptyCommand);
        }
    }

    config.trainer.validate().map_err(|e| ValidationError::InvalidTrainer(e.to_string()))?;

    if let Some(tolerance) = config.promotion.max_rmse_regression {
        if !(tolerance >= 0.0 && tolerance.is_finite()) {
            return Err(ValidationError::InvalidPromotion(format!(
                "max_rmse_regression must be >= 0, got {tolerance}"
            )));
        }
    }
    for req in &config.promotion.required_metrics {
        if !["rmse", "r2", "mae"].contains(&req.name.as_str()) {
            return Err(ValidationError::InvalidPromotion(format!(
                "unknown metric '{}' (expected rmse, r2 or mae)",
                req.name
            )));
        }
    }

    if config.tracking.enabled && config.tracking.experiment_name.trim().is_empty() {
        return Err(ValidationError::EmptyExperimentName);
    }

    Ok(())
}

fn validate_drift_test(test: &DriftTest) -> Result<(), ValidationError> {
    let Some(value) = test.threshold() else {
        return Ok(());
    };
    let valid = match test {
        DriftTest::KS { .. } => value > 0.0 && value < 1.0,
        _ => value > 0.0 && value.is_finite(),
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidThreshold { test: test.name(), value })
    }
}
