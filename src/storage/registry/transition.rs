//! Promotion history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why the pointer moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionReason {
    /// A freshly trained artifact was promoted
    Retrain,
    /// An operator re-pointed to an already stored version
    Rollback,
}

/// One pointer swap, appended to `promotions.jsonl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionRecord {
    /// Version the pointer moved to
    pub version_id: String,
    /// Version the pointer named before, if any
    pub previous: Option<String>,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Reason for the swap
    pub reason: PromotionReason,
}
