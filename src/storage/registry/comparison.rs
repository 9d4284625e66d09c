//! Version comparison and metric comparison types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::version::ModelArtifact;

/// Comparison between two model versions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionComparison {
    /// Baseline version
    pub baseline: String,
    /// Candidate version
    pub candidate: String,
    /// Metric differences, candidate minus baseline
    pub metric_diffs: BTreeMap<String, f64>,
    /// Whether the candidate has the lower held-out RMSE
    pub candidate_is_better: bool,
    /// Summary of changes
    pub summary: String,
}

impl VersionComparison {
    /// Compare held-out metrics of two artifacts
    pub fn between(baseline: &ModelArtifact, candidate: &ModelArtifact) -> Self {
        let rmse_diff = candidate.metrics.rmse - baseline.metrics.rmse;
        let r2_diff = candidate.metrics.r2 - baseline.metrics.r2;
        let metric_diffs = BTreeMap::from([("rmse".to_string(), rmse_diff), ("r2".to_string(), r2_diff)]);

        Self {
            baseline: baseline.version_id.clone(),
            candidate: candidate.version_id.clone(),
            metric_diffs,
            candidate_is_better: rmse_diff < 0.0,
            summary: format!(
                "{} vs {}: rmse {:+.4}, r2 {:+.4}",
                candidate.version_id, baseline.version_id, rmse_diff, r2_diff
            ),
        }
    }
}

/// Metric requirement for promotion policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRequirement {
    /// Metric name (`rmse` or `r2`)
    pub name: String,
    /// Comparison operator
    pub comparison: Comparison,
    /// Threshold value
    pub threshold: f64,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    /// Check if value satisfies comparison with threshold
    pub fn check(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Gt => value > threshold,
            Comparison::Gte => value >= threshold,
            Comparison::Lt => value < threshold,
            Comparison::Lte => value <= threshold,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::registry::TrainedMetrics;

    fn artifact(version: &str, rmse: f64, r2: f64) -> ModelArtifact {
        ModelArtifact::new("m", version, TrainedMetrics { rmse, r2, mae: rmse }, vec![], vec![])
    }

    #[test]
    fn test_comparison_gt() {
        assert!(Comparison::Gt.check(0.96, 0.95));
        assert!(!Comparison::Gt.check(0.95, 0.95));
    }

    #[test]
    fn test_comparison_gte() {
        assert!(Comparison::Gte.check(0.95, 0.95));
        assert!(Comparison::Gte.check(0.96, 0.95));
    }

    #[test]
    fn test_comparison_lt() {
        assert!(Comparison::Lt.check(0.5, 1.0));
        assert!(!Comparison::Lt.check(1.0, 1.0));
    }

    #[test]
    fn test_comparison_lte() {
        assert!(Comparison::Lte.check(1.0, 1.0));
        assert!(!Comparison::Lte.check(1.1, 1.0));
    }

    #[test]
    fn test_version_comparison_lower_rmse_is_better() {
        let old = artifact("20250101_000000", 4.0, 0.7);
        let new = artifact("20250102_000000", 3.0, 0.8);
        let cmp = VersionComparison::between(&old, &new);

        assert!(cmp.candidate_is_better);
        assert!((cmp.metric_diffs["rmse"] + 1.0).abs() < 1e-12);
        assert!(cmp.summary.contains("20250102_000000"));
    }

    #[test]
    fn test_comparison_deserializes_lowercase() {
        let c: Comparison = serde_yaml::from_str("gte").unwrap();
        assert_eq!(c, Comparison::Gte);
    }
}
