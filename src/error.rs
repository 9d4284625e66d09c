//! Crate-level error types

use thiserror::Error;

use crate::storage::registry::RegistryError;

/// Errors raised by the lifecycle control loop
#[derive(Debug, Error)]
pub enum Error {
    /// Feature columns of the window and the reference disagree
    #[error("Schema mismatch: missing columns {missing:?}, unexpected columns {unexpected:?}")]
    SchemaMismatch { missing: Vec<String>, unexpected: Vec<String> },

    /// Empty or missing input table
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Malformed value in an input table
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Fit step failed or produced an invalid artifact
    #[error("Training failed: {0}")]
    TrainingFailure(String),

    /// Artifact write or pointer swap failed
    #[error("Promotion failed: {0}")]
    Promotion(#[from] RegistryError),

    /// Experiment tracking collaborator unreachable
    #[error("Tracking unavailable: {0}")]
    TrackingUnavailable(String),

    /// Another retrain holds the lock
    #[error("Retrain already in progress (lock held at {0})")]
    RetrainInProgress(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether this error belongs to the retraining step
    pub fn is_training_failure(&self) -> bool {
        matches!(self, Error::TrainingFailure(_) | Error::InsufficientData(_))
    }

    /// Whether the error left the current model pointer untouched by construction
    pub fn is_promotion_failure(&self) -> bool {
        matches!(self, Error::Promotion(_))
    }
}

/// Result type for driftloop operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_message_lists_columns() {
        let err = Error::SchemaMismatch {
            missing: vec!["age".to_string()],
            unexpected: vec!["zip".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("age"));
        assert!(msg.contains("zip"));
    }

    #[test]
    fn test_training_failure_classification() {
        assert!(Error::TrainingFailure("nan".into()).is_training_failure());
        assert!(Error::InsufficientData("empty".into()).is_training_failure());
        assert!(!Error::Config("bad".into()).is_training_failure());
    }

    #[test]
    fn test_promotion_failure_classification() {
        let err: Error = RegistryError::NoCurrentModel.into();
        assert!(err.is_promotion_failure());
    }
}
