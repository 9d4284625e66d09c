//! Type definitions for drift detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reference size up to which [`DriftTest::Auto`] picks the KS test
pub const AUTO_KS_MAX_ROWS: usize = 1000;

/// Statistical test for drift detection
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum DriftTest {
    /// Two-sample Kolmogorov-Smirnov; drift when p-value < threshold
    #[serde(rename = "ks")]
    KS { threshold: f64 },
    /// Population Stability Index; drift when PSI >= threshold
    #[serde(rename = "psi")]
    PSI { threshold: f64 },
    /// Wasserstein distance normalised by the reference standard deviation;
    /// drift when distance >= threshold
    Wasserstein { threshold: f64 },
    /// KS at 0.05 for references up to [`AUTO_KS_MAX_ROWS`] rows,
    /// normalised Wasserstein at 0.1 above that
    Auto,
}

impl Default for DriftTest {
    fn default() -> Self {
        DriftTest::KS { threshold: 0.05 }
    }
}

impl DriftTest {
    /// Get the name of this test
    pub fn name(&self) -> &'static str {
        match self {
            DriftTest::KS { .. } => "Kolmogorov-Smirnov",
            DriftTest::PSI { .. } => "PSI",
            DriftTest::Wasserstein { .. } => "Wasserstein (normed)",
            DriftTest::Auto => "Auto",
        }
    }

    /// Get the threshold for this test; `Auto` has none until resolved
    pub fn threshold(&self) -> Option<f64> {
        match self {
            DriftTest::KS { threshold }
            | DriftTest::PSI { threshold }
            | DriftTest::Wasserstein { threshold } => Some(*threshold),
            DriftTest::Auto => None,
        }
    }

    /// Concrete test for a reference of `reference_rows` rows
    pub fn resolve(&self, reference_rows: usize) -> DriftTest {
        match self {
            DriftTest::Auto if reference_rows <= AUTO_KS_MAX_ROWS => {
                DriftTest::KS { threshold: 0.05 }
            }
            DriftTest::Auto => DriftTest::Wasserstein { threshold: 0.1 },
            other => *other,
        }
    }

    /// Whether the test yields a p-value (smaller = more drift)
    pub fn is_p_value(&self) -> bool {
        matches!(self, DriftTest::KS { .. })
    }
}

/// Severity levels for drift
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// No drift detected
    None,
    /// Close to the threshold; reported, does not count as drift
    Warning,
    /// Threshold crossed
    Critical,
}

/// Per-feature drift result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureDrift {
    /// Feature name
    pub feature: String,
    /// Test used for detection
    pub test: DriftTest,
    /// Test statistic (KS D, PSI, or normalised distance)
    pub statistic: f64,
    /// P-value for KS; the statistic itself for distance tests
    pub p_value: f64,
    /// Whether the threshold was crossed
    pub drifted: bool,
    /// Severity of the drift
    pub severity: Severity,
}

/// Verdict of one detection run
///
/// Contains no wall-clock data, so identical inputs give equal reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Results keyed by feature name
    pub per_feature: BTreeMap<String, FeatureDrift>,
    /// Number of drifted features
    pub drifted_feature_count: usize,
    /// True iff at least one feature drifted
    pub overall_drift: bool,
    /// Concrete test that was applied
    pub test: DriftTest,
    /// Rows in the reference dataset
    pub reference_rows: usize,
    /// Rows in the detection window
    pub window_rows: usize,
    /// Served predictions against reference targets; informational only and
    /// never part of `overall_drift`
    pub prediction_drift: Option<FeatureDrift>,
}

impl DriftReport {
    /// Assemble a report from per-feature results
    pub fn from_results(
        results: Vec<FeatureDrift>,
        test: DriftTest,
        reference_rows: usize,
        window_rows: usize,
        prediction_drift: Option<FeatureDrift>,
    ) -> Self {
        let drifted_feature_count = results.iter().filter(|r| r.drifted).count();
        Self {
            per_feature: results.into_iter().map(|r| (r.feature.clone(), r)).collect(),
            drifted_feature_count,
            overall_drift: drifted_feature_count > 0,
            test,
            reference_rows,
            window_rows,
            prediction_drift,
        }
    }

    /// Total number of features checked
    pub fn total_features(&self) -> usize {
        self.per_feature.len()
    }

    /// Names of drifted features, sorted
    pub fn drifted_features(&self) -> Vec<&str> {
        self.per_feature
            .values()
            .filter(|r| r.drifted)
            .map(|r| r.feature.as_str())
            .collect()
    }

    /// Number of warning-level features
    pub fn warnings(&self) -> usize {
        self.per_feature.values().filter(|r| r.severity == Severity::Warning).count()
    }

    /// Percentage of features that drifted
    pub fn drift_percentage(&self) -> f64 {
        if self.per_feature.is_empty() {
            0.0
        } else {
            100.0 * self.drifted_feature_count as f64 / self.per_feature.len() as f64
        }
    }
}

/// Callback type for drift events (Andon Cord)
pub type DriftCallback = Box<dyn Fn(&DriftReport) + Send + Sync>;
