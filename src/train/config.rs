//! Trainer configuration

use serde::{Deserialize, Serialize};

use super::gbm::BoostingParams;
use crate::{Error, Result};

/// Model family name used for artifact file names
pub const DEFAULT_MODEL_NAME: &str = "gradient_boosting_model";

/// Configuration of a retraining run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Artifact family; files are named `<model_name>_<version_id>`
    pub model_name: String,
    /// Seed for synthetic target sampling and the train/validation split
    pub seed: u64,
    /// Share of the combined set held out for RMSE/R²
    pub test_fraction: f64,
    /// Ensemble hyperparameters
    pub boosting: BoostingParams,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            seed: 42,
            test_fraction: 0.2,
            boosting: BoostingParams::default(),
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.model_name.is_empty()
            || !self.model_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::Config(format!("invalid model name '{}'", self.model_name)));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(Error::Config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        self.boosting.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainerConfig::default();
        assert_eq!(config.model_name, "gradient_boosting_model");
        assert_eq!(config.seed, 42);
        assert_eq!(config.boosting.n_estimators, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: TrainerConfig =
            serde_yaml::from_str("seed: 7\nboosting:\n  n_estimators: 10\n").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.boosting.n_estimators, 10);
        assert_eq!(config.boosting.max_depth, 3);
        assert_eq!(config.test_fraction, 0.2);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = TrainerConfig { test_fraction: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        let config = TrainerConfig { model_name: "../x".into(), ..Default::default() };
        assert!(config.validate().is_err());
    }
}
