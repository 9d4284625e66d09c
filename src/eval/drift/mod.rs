//! Drift Detection Module
//!
//! Implements Jidoka (Automation with Human Touch) for detecting when the
//! served inputs have moved away from the reference distribution and signals
//! for help (Retraining).
//!
//! Provides per-feature two-sample tests:
//! - Kolmogorov-Smirnov test (p-value below threshold)
//! - Population Stability Index (PSI at or above threshold)
//! - Normalised Wasserstein distance (distance at or above threshold)

mod detector;
mod report;
mod statistical;
mod types;


pub use detector::DriftDetector;
pub use report::{render_html, render_text, write_report, DriftAudit, ReportPaths};
pub use types::{DriftCallback, DriftReport, DriftTest, FeatureDrift, Severity, AUTO_KS_MAX_ROWS};

// Re-export statistical functions for testing/advanced use
pub use statistical::{bin_counts, ks_p_value, ks_statistic, normed_wasserstein, psi};
