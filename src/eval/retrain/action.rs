//! Outcomes of the retrain trigger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a report should lead to a retrain, and why
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrainDecision {
    pub retrain: bool,
    pub reason: String,
    /// Last completed retrain in the persisted state when the decision was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_retrain_seen: Option<DateTime<Utc>>,
}

impl RetrainDecision {
    pub fn retrain(reason: impl Into<String>) -> Self {
        Self { retrain: true, reason: reason.into(), last_retrain_seen: None }
    }

    pub fn skip(reason: impl Into<String>) -> Self {
        Self { retrain: false, reason: reason.into(), last_retrain_seen: None }
    }

    /// Bind the decision to the state it was taken against
    pub fn seen(mut self, last_retrain_at: Option<DateTime<Utc>>) -> Self {
        self.last_retrain_seen = last_retrain_at;
        self
    }
}

/// Action taken by the trigger for one report
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// No action needed
    None,
    /// Drift or near-drift logged but no retrain triggered
    WarningLogged { reason: String },
    /// Retrain ran; `version_id` names the new current model when known
    Retrained { version_id: Option<String> },
}
