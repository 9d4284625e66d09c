//! Drift detector implementation.

use tracing::{debug, info};

use super::statistical::{ks_statistic, ks_two_sample_p_value, normed_wasserstein, psi, sorted_finite};
use super::types::{DriftCallback, DriftReport, DriftTest, FeatureDrift, Severity};
use crate::data::{FeatureSnapshot, ReferenceDataset};
use crate::{Error, Result};

/// Name under which the served-prediction comparison is reported
const PREDICTION_FEATURE: &str = "prediction";

/// Drift detector comparing a window of served features to a reference
pub struct DriftDetector {
    test: DriftTest,
    warning_multiplier: f64,
    callbacks: Vec<DriftCallback>,
}

impl std::fmt::Debug for DriftDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriftDetector")
            .field("test", &self.test)
            .field("warning_multiplier", &self.warning_multiplier)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl Default for DriftDetector {
    fn default() -> Self {
        Self::new(DriftTest::default())
    }
}

impl DriftDetector {
    /// Create a new drift detector with the given test
    pub fn new(test: DriftTest) -> Self {
        Self {
            test,
            warning_multiplier: 0.8, // Warning at 80% of threshold
            callbacks: Vec::new(),
        }
    }

    /// Configured test (may be [`DriftTest::Auto`])
    pub fn test(&self) -> DriftTest {
        self.test
    }

    /// Register callback for drift events (Andon Cord)
    ///
    /// Callbacks are invoked by [`detect`](Self::detect) when the report
    /// shows overall drift.
    pub fn on_drift<F>(&mut self, callback: F)
    where
        F: Fn(&DriftReport) + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Compare `window` against `reference`
    ///
    /// The window is stripped of log bookkeeping columns and must then expose
    /// exactly the reference feature set. NaN cells are ignored per feature.
    pub fn detect(
        &self,
        reference: &ReferenceDataset,
        window: &FeatureSnapshot,
    ) -> Result<DriftReport> {
        if reference.is_empty() {
            return Err(Error::InsufficientData("reference dataset has no rows".into()));
        }
        if window.is_empty() {
            return Err(Error::InsufficientData("detection window has no rows".into()));
        }

        let aligned = window.aligned_to(reference)?;
        let test = self.test.resolve(reference.len());
        debug!(test = test.name(), reference_rows = reference.len(), window_rows = aligned.n_rows(), "running drift detection");

        let mut results = Vec::with_capacity(reference.feature_names().len());
        for (idx, name) in reference.feature_names().iter().enumerate() {
            let baseline = sorted_finite(&column(reference.features().rows(), idx));
            let current = sorted_finite(&column(aligned.rows(), idx));
            if baseline.is_empty() || current.is_empty() {
                return Err(Error::InsufficientData(format!(
                    "feature '{name}' has no finite values in the {}",
                    if baseline.is_empty() { "reference" } else { "window" }
                )));
            }
            results.push(self.run_test(name, test, &baseline, &current));
        }

        let prediction_drift = self.prediction_drift(reference, window);
        let report =
            DriftReport::from_results(results, test, reference.len(), aligned.n_rows(), prediction_drift);

        info!(
            drifted = report.drifted_feature_count,
            total = report.total_features(),
            overall = report.overall_drift,
            "drift detection finished"
        );

        if report.overall_drift {
            for callback in &self.callbacks {
                callback(&report);
            }
        }
        Ok(report)
    }

    /// KS comparison of served predictions against reference targets
    fn prediction_drift(
        &self,
        reference: &ReferenceDataset,
        window: &FeatureSnapshot,
    ) -> Option<FeatureDrift> {
        let served = sorted_finite(window.predictions());
        if served.is_empty() {
            return None;
        }
        let targets = sorted_finite(reference.target());
        Some(self.run_test(
            PREDICTION_FEATURE,
            DriftTest::KS { threshold: 0.05 },
            &targets,
            &served,
        ))
    }

    /// Run a resolved test on sorted finite samples
    fn run_test(&self, feature: &str, test: DriftTest, baseline: &[f64], current: &[f64]) -> FeatureDrift {
        let (statistic, p_value) = match test {
            DriftTest::KS { .. } => {
                let d = ks_statistic(baseline, current);
                (d, ks_two_sample_p_value(d, baseline.len(), current.len()))
            }
            DriftTest::PSI { .. } => {
                let value = psi(baseline, current);
                (value, value) // PSI doesn't use p-value, store the PSI value
            }
            DriftTest::Wasserstein { .. } | DriftTest::Auto => {
                let value = normed_wasserstein(baseline, current);
                (value, value)
            }
        };
        let threshold = test.threshold().unwrap_or(0.1);
        let severity = if test.is_p_value() {
            self.classify_p_value(p_value, threshold)
        } else {
            self.classify_distance(statistic, threshold)
        };

        FeatureDrift {
            feature: feature.to_string(),
            test,
            statistic,
            p_value,
            drifted: severity == Severity::Critical,
            severity,
        }
    }

    /// Classify a p-value: small p means drift
    fn classify_p_value(&self, p_value: f64, threshold: f64) -> Severity {
        if p_value < threshold {
            Severity::Critical
        } else if p_value < threshold / self.warning_multiplier {
            Severity::Warning
        } else {
            Severity::None
        }
    }

    /// Classify a distance: large distance means drift
    fn classify_distance(&self, value: f64, threshold: f64) -> Severity {
        if value >= threshold {
            Severity::Critical
        } else if value >= threshold * self.warning_multiplier {
            Severity::Warning
        } else {
            Severity::None
        }
    }
}

fn column(rows: &[Vec<f64>], idx: usize) -> Vec<f64> {
    rows.iter().map(|row| row[idx]).collect()
}
