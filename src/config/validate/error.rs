//! Validation error types

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Target column must not be empty")]
    EmptyTargetColumn,

    #[error("Invalid drift threshold for {test}: {value}")]
    InvalidThreshold { test: &'static str, value: f64 },

    #[error("Invalid drift window: {0}")]
    InvalidWindow(String),

    #[error("Invalid drift percentage threshold: {0} (must be in [0, 100])")]
    InvalidDriftPercentage(f64),

    #[error("Retrain policy '{0}' can never trigger")]
    UnsatisfiablePolicy(String),

    #[error("Retrain command must not be empty")]
    EmptyCommand,

    #[error("Invalid trainer configuration: {0}")]
    InvalidTrainer(String),

    #[error("Invalid promotion policy: {0}")]
    InvalidPromotion(String),

    #[error("Experiment name must not be empty when tracking is enabled")]
    EmptyExperimentName,
}
