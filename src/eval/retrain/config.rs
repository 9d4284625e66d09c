//! Configuration for the retrain trigger.

use serde::{Deserialize, Serialize};

use super::policy::RetrainPolicy;

/// Configuration for the retrain trigger
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrainConfig {
    /// Policy for when to trigger retraining
    pub policy: RetrainPolicy,
    /// Minimum seconds between two completed retrains (0 = no cooldown)
    pub cooldown_secs: u64,
    /// Maximum number of retrains over the lifetime of the state file (0 = unlimited)
    pub max_retrains: u64,
    /// Whether to log warnings for drift that does not trigger a retrain
    pub log_warnings: bool,
}

impl Default for RetrainConfig {
    fn default() -> Self {
        Self { policy: RetrainPolicy::default(), cooldown_secs: 0, max_retrains: 0, log_warnings: true }
    }
}
