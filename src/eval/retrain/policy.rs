//! Retraining trigger policies.

use serde::{Deserialize, Serialize};

use crate::eval::drift::DriftReport;

/// Retraining trigger policy
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetrainPolicy {
    /// Retrain whenever the report shows overall drift
    #[default]
    AnyDrift,
    /// Retrain if >= N features show drift
    FeatureCount { count: usize },
    /// Retrain if any feature with these names drifts
    CriticalFeature { names: Vec<String> },
    /// Retrain if drift percentage reaches threshold (0-100)
    DriftPercentage { threshold: f64 },
}

impl RetrainPolicy {
    /// Evaluate the policy; the reason explains the verdict either way
    pub fn evaluate(&self, report: &DriftReport) -> (bool, String) {
        match self {
            RetrainPolicy::AnyDrift => {
                if report.overall_drift {
                    (
                        true,
                        format!(
                            "drift detected in {} of {} features: {}",
                            report.drifted_feature_count,
                            report.total_features(),
                            report.drifted_features().join(", ")
                        ),
                    )
                } else {
                    (false, "no drift detected".to_string())
                }
            }

            RetrainPolicy::FeatureCount { count } => (
                report.drifted_feature_count >= *count,
                format!("{} drifted features (policy requires {count})", report.drifted_feature_count),
            ),

            RetrainPolicy::CriticalFeature { names } => {
                let hit: Vec<&str> = report
                    .drifted_features()
                    .into_iter()
                    .filter(|f| names.iter().any(|n| n == f))
                    .collect();
                if hit.is_empty() {
                    (false, format!("no critical feature drifted (watching {})", names.join(", ")))
                } else {
                    (true, format!("critical features drifted: {}", hit.join(", ")))
                }
            }

            RetrainPolicy::DriftPercentage { threshold } => (
                report.drift_percentage() >= *threshold,
                format!(
                    "{:.1}% of features drifted (policy threshold {threshold:.1}%)",
                    report.drift_percentage()
                ),
            ),
        }
    }
}
