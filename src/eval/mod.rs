//! Drift detection and the retrain trigger
//!
//! - `drift`: per-feature two-sample tests (KS, PSI, normalised Wasserstein)
//!   over a reference dataset and a window of served features
//! - `retrain`: policy, cooldown, and lock-guarded retrain orchestration
//!
//! ## Example
//!
//! ```ignore
//! use driftloop::eval::{decide, DriftDetector, DriftTest, RetrainPolicy};
//!
//! let detector = DriftDetector::new(DriftTest::KS { threshold: 0.05 });
//! let report = detector.detect(&reference, &window)?;
//! let decision = decide(&report, &RetrainPolicy::AnyDrift);
//! println!("retrain={} ({})", decision.retrain, decision.reason);
//! ```

pub mod drift;
pub mod retrain;

pub use drift::{DriftCallback, DriftDetector, DriftReport, DriftTest, FeatureDrift, Severity};
pub use retrain::{
    decide, Action, CommandStep, InProcessStep, RetrainConfig, RetrainContext, RetrainDecision,
    RetrainPolicy, RetrainStep, RetrainTrigger,
};
