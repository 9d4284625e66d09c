//! Promotion gate (Poka-yoke)
//!
//! The default policy is empty and promotes every successfully trained
//! artifact. Metric thresholds and a no-regression bound against the
//! currently served model can be switched on per deployment.

use serde::{Deserialize, Serialize};

use super::comparison::{Comparison, MetricRequirement, VersionComparison};
use super::version::ModelArtifact;

/// Requirements a candidate must meet before the pointer moves to it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionPolicy {
    /// Required metrics with thresholds
    pub required_metrics: Vec<MetricRequirement>,
    /// Largest tolerated relative RMSE increase over the current model
    /// (0.05 = at most 5% worse); `None` disables the check
    pub max_rmse_regression: Option<f64>,
}

impl PromotionPolicy {
    /// Policy that promotes unconditionally
    pub fn unconditional() -> Self {
        Self::default()
    }

    /// Add a metric requirement
    pub fn require_metric(mut self, name: &str, comparison: Comparison, threshold: f64) -> Self {
        self.required_metrics.push(MetricRequirement {
            name: name.to_string(),
            comparison,
            threshold,
        });
        self
    }

    /// Reject candidates whose RMSE regresses beyond `tolerance`
    pub fn no_regression(mut self, tolerance: f64) -> Self {
        self.max_rmse_regression = Some(tolerance);
        self
    }

    /// Whether this policy can ever reject a candidate
    pub fn is_unconditional(&self) -> bool {
        self.required_metrics.is_empty() && self.max_rmse_regression.is_none()
    }

    /// Check a candidate against the policy and the currently served model
    pub fn check(&self, candidate: &ModelArtifact, current: Option<&ModelArtifact>) -> PolicyCheckResult {
        let mut failed_requirements = Vec::new();

        for req in &self.required_metrics {
            if let Some(value) = candidate.metrics.get(&req.name) {
                if !req.comparison.check(value, req.threshold) {
                    failed_requirements.push(format!(
                        "Metric '{}' = {} does not satisfy {} {}",
                        req.name,
                        value,
                        req.comparison.as_str(),
                        req.threshold
                    ));
                }
            } else {
                failed_requirements.push(format!("Unknown metric '{}'", req.name));
            }
        }

        let comparison = current.map(|cur| VersionComparison::between(cur, candidate));

        if let (Some(tolerance), Some(cur)) = (self.max_rmse_regression, current) {
            let limit = cur.metrics.rmse * (1.0 + tolerance);
            if candidate.metrics.rmse > limit {
                failed_requirements.push(format!(
                    "RMSE {:.4} regresses beyond {:.4} (current {} at {:.4}, tolerance {})",
                    candidate.metrics.rmse, limit, cur.version_id, cur.metrics.rmse, tolerance
                ));
            }
        }

        PolicyCheckResult { passed: failed_requirements.is_empty(), failed_requirements, comparison }
    }
}

/// Result of policy check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyCheckResult {
    /// Whether all requirements passed
    pub passed: bool,
    /// List of failed requirements
    pub failed_requirements: Vec<String>,
    /// Metric comparison against the current model, if one is served
    pub comparison: Option<VersionComparison>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::registry::TrainedMetrics;

    fn artifact(version: &str, rmse: f64, r2: f64) -> ModelArtifact {
        ModelArtifact::new("m", version, TrainedMetrics { rmse, r2, mae: rmse }, vec![], vec![])
    }

    #[test]
    fn test_default_policy_is_unconditional() {
        let policy = PromotionPolicy::default();
        assert!(policy.is_unconditional());

        let terrible = artifact("20250101_000000", 1e6, -50.0);
        let best = artifact("20241231_000000", 0.1, 0.99);
        assert!(policy.check(&terrible, Some(&best)).passed);
    }

    #[test]
    fn test_metric_requirement_pass() {
        let policy = PromotionPolicy::default().require_metric("r2", Comparison::Gte, 0.5);
        assert!(policy.check(&artifact("v", 3.0, 0.6), None).passed);
    }

    #[test]
    fn test_metric_requirement_fail() {
        let policy = PromotionPolicy::default().require_metric("r2", Comparison::Gte, 0.5);
        let result = policy.check(&artifact("v", 3.0, 0.4), None);
        assert!(!result.passed);
        assert_eq!(result.failed_requirements.len(), 1);
    }

    #[test]
    fn test_unknown_metric_fails() {
        let policy = PromotionPolicy::default().require_metric("mape", Comparison::Lt, 1.0);
        assert!(!policy.check(&artifact("v", 3.0, 0.4), None).passed);
    }

    #[test]
    fn test_no_regression_within_tolerance() {
        let policy = PromotionPolicy::default().no_regression(0.1);
        let current = artifact("20250101_000000", 3.0, 0.8);
        let candidate = artifact("20250102_000000", 3.2, 0.78);
        let result = policy.check(&candidate, Some(&current));
        assert!(result.passed);
        assert!(result.comparison.is_some());
    }

    #[test]
    fn test_no_regression_beyond_tolerance() {
        let policy = PromotionPolicy::default().no_regression(0.1);
        let current = artifact("20250101_000000", 3.0, 0.8);
        let candidate = artifact("20250102_000000", 3.5, 0.7);
        assert!(!policy.check(&candidate, Some(&current)).passed);
    }

    #[test]
    fn test_no_regression_without_current_model_passes() {
        let policy = PromotionPolicy::default().no_regression(0.0);
        assert!(policy.check(&artifact("v", 100.0, 0.0), None).passed);
    }
}
