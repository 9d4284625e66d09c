//! The control loop
//!
//! One invocation reads the reference dataset and a bounded snapshot of the
//! prediction log, detects drift, writes the audit report, decides, and (when
//! the decision is positive) retrains and promotes under the retrain lock.
//! Every step blocks; a failed run never reaches promotion.

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{LoopConfig, StepConfig};
use crate::data::{FeatureSnapshot, ReferenceDataset};
use crate::eval::drift::{write_report, DriftDetector, DriftReport, ReportPaths};
use crate::eval::retrain::{
    Action, CommandStep, InProcessStep, RetrainContext, RetrainDecision, RetrainLock, RetrainStep,
    RetrainTrigger,
};
use crate::storage::registry::{
    CurrentModelPointer, FsModelRegistry, ModelRegistry, TrainedMetrics,
};
use crate::storage::{ModelArtifact, PredictionLog};
use crate::tracking::storage::JsonFileBackend;
use crate::tracking::ExperimentTracker;
use crate::train::Trainer;
use crate::Result;

/// Inputs and verdict of one detection
#[derive(Debug)]
pub struct Detection {
    pub reference: ReferenceDataset,
    pub window: FeatureSnapshot,
    pub report: DriftReport,
    /// Audit artifacts, when written
    pub report_paths: Option<ReportPaths>,
}

/// Result of one pass of the loop
#[derive(Debug, Clone, Serialize)]
pub struct LoopOutcome {
    pub report: DriftReport,
    pub report_paths: Option<ReportPaths>,
    pub decision: RetrainDecision,
    pub action: Action,
    /// Current pointer after the pass
    pub current: Option<CurrentModelPointer>,
}

/// Result of an explicit retrain or of the initial training
#[derive(Debug, Clone, Serialize)]
pub struct RetrainOutcome {
    pub version_id: String,
    pub metrics: TrainedMetrics,
    pub artifact_path: PathBuf,
    pub tracking_run: Option<String>,
    pub current: CurrentModelPointer,
}

/// Drift detection, retrain trigger, trainer, and registry wired from a config
#[derive(Debug)]
pub struct ControlLoop {
    config: LoopConfig,
    log: PredictionLog,
    detector: DriftDetector,
    trigger: RetrainTrigger,
    trainer: Trainer,
    registry: FsModelRegistry,
}

impl ControlLoop {
    pub fn new(config: LoopConfig) -> Result<Self> {
        let registry = FsModelRegistry::open(&config.paths.models_dir, &config.trainer.model_name)?
            .with_policy(config.promotion.clone());

        let mut trainer = Trainer::new(config.trainer.clone());
        if config.tracking.enabled {
            let mut tracker = ExperimentTracker::new(
                config.tracking.experiment_name.clone(),
                JsonFileBackend::new(config.tracking.dir.join(&config.tracking.experiment_name)),
            );
            tracker.add_tag("model_name", config.trainer.model_name.clone());
            trainer = trainer.with_tracker(tracker);
        }

        Ok(Self {
            log: PredictionLog::new(&config.paths.prediction_log),
            detector: DriftDetector::new(config.drift.test),
            trigger: RetrainTrigger::new(config.retrain.trigger.clone(), &config.paths.models_dir),
            trainer,
            registry,
            config,
        })
    }

    /// Replace the detector, e.g. to register drift callbacks
    pub fn with_detector(mut self, detector: DriftDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn registry(&self) -> &FsModelRegistry {
        &self.registry
    }

    pub fn trigger(&self) -> &RetrainTrigger {
        &self.trigger
    }

    pub fn trainer(&self) -> &Trainer {
        &self.trainer
    }

    /// Reference dataset and the configured log window
    pub fn load_inputs(&self) -> Result<(ReferenceDataset, FeatureSnapshot)> {
        let reference =
            ReferenceDataset::load_csv(&self.config.paths.reference, &self.config.paths.target_column)?;
        let window = self.log.snapshot(&self.config.drift.window)?;
        info!(reference_rows = reference.len(), window_rows = window.len(), "inputs loaded");
        Ok((reference, window))
    }

    /// Detect drift and write the audit report
    ///
    /// A report that cannot be written is logged; the verdict stands.
    pub fn detect(&self) -> Result<Detection> {
        let (reference, window) = self.load_inputs()?;
        let report = self.detector.detect(&reference, &window)?;

        let report_paths = if self.config.drift.write_reports {
            match write_report(&report, &self.config.paths.reports_dir) {
                Ok(paths) => Some(paths),
                Err(e) => {
                    warn!(error = %e, dir = %self.config.paths.reports_dir.display(), "drift report not written");
                    None
                }
            }
        } else {
            None
        };
        Ok(Detection { reference, window, report, report_paths })
    }

    /// Detect and decide without acting
    pub fn evaluate(&self) -> Result<(Detection, RetrainDecision)> {
        let detection = self.detect()?;
        let decision = self.trigger.decide(&detection.report)?;
        info!(retrain = decision.retrain, reason = %decision.reason, "retrain decision");
        Ok((detection, decision))
    }

    /// One full pass with the configured retrain step
    pub fn run_once(&mut self) -> Result<LoopOutcome> {
        match self.config.retrain.step.clone() {
            StepConfig::InProcess => {
                let (detection, decision) = self.evaluate()?;
                let mut step = InProcessStep::new(&mut self.trainer, &self.registry);
                let action = act(&self.trigger, &detection, decision.clone(), &mut step)?;
                self.outcome(detection, decision, action)
            }
            StepConfig::Command { program, args } => {
                let mut step =
                    CommandStep::new(program).args(args).holding_lock(self.trigger.lock_path());
                self.run_with_step(&mut step)
            }
        }
    }

    /// One full pass with a caller-supplied retrain step
    pub fn run_with_step(&self, step: &mut dyn RetrainStep) -> Result<LoopOutcome> {
        let (detection, decision) = self.evaluate()?;
        let action = act(&self.trigger, &detection, decision.clone(), step)?;
        self.outcome(detection, decision, action)
    }

    /// Detect and decide; report what would happen
    pub fn dry_run(&self) -> Result<LoopOutcome> {
        let (detection, decision) = self.evaluate()?;
        let action = if decision.retrain {
            Action::WarningLogged { reason: format!("dry run, retrain skipped: {}", decision.reason) }
        } else {
            Action::None
        };
        self.outcome(detection, decision, action)
    }

    /// Train on reference plus the log window and promote, regardless of drift
    ///
    /// Runs under the retrain lock and counts towards cooldown and retrain
    /// limit. When a parent loop already holds the lock for this process, as
    /// with a command step, the parent does both.
    pub fn retrain(&mut self) -> Result<RetrainOutcome> {
        let (reference, window) = self.load_inputs()?;
        self.locked(true, |trainer| trainer.train(&reference, &window))
    }

    /// Train the first model from the reference dataset alone and promote it
    ///
    /// Does not read the prediction log and does not start a cooldown.
    pub fn train_initial(&mut self) -> Result<RetrainOutcome> {
        let reference =
            ReferenceDataset::load_csv(&self.config.paths.reference, &self.config.paths.target_column)?;
        info!(reference_rows = reference.len(), "training initial model");
        self.locked(false, |trainer| trainer.train_initial(&reference))
    }

    /// Train, track and promote under the retrain lock
    fn locked<F>(&mut self, counts: bool, train: F) -> Result<RetrainOutcome>
    where
        F: FnOnce(&mut Trainer) -> Result<ModelArtifact>,
    {
        let lock = if RetrainLock::held_by_parent(self.trigger.lock_path()) {
            debug!(path = %self.trigger.lock_path().display(), "retrain lock held by parent");
            None
        } else {
            Some(RetrainLock::acquire(self.trigger.lock_path())?)
        };
        let mut state = self.trigger.state()?;

        self.trainer.observe_version(self.registry.latest_version()?);
        let artifact = train(&mut self.trainer)?;

        let artifact_path = self.registry.artifact_path(&artifact.version_id);
        let tracking_run = self.trainer.track(&artifact, &artifact_path).ok().flatten();
        let current = self.registry.promote(&artifact)?;
        if counts && lock.is_some() {
            self.trigger.record(&mut state, Some(current.version_id.clone()));
        }

        Ok(RetrainOutcome {
            version_id: artifact.version_id,
            metrics: artifact.metrics,
            artifact_path,
            tracking_run,
            current,
        })
    }

    fn outcome(
        &self,
        detection: Detection,
        decision: RetrainDecision,
        action: Action,
    ) -> Result<LoopOutcome> {
        Ok(LoopOutcome {
            report: detection.report,
            report_paths: detection.report_paths,
            decision,
            action,
            current: self.registry.resolve_current()?,
        })
    }
}

fn act(
    trigger: &RetrainTrigger,
    detection: &Detection,
    decision: RetrainDecision,
    step: &mut dyn RetrainStep,
) -> Result<Action> {
    let ctx = RetrainContext {
        reference: &detection.reference,
        window: &detection.window,
        report: &detection.report,
    };
    trigger.apply(&ctx, decision, step)
}
