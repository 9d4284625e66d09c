//! Retrain trigger: decision plus orchestration of one retrain.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::action::{Action, RetrainDecision};
use super::config::RetrainConfig;
use super::policy::RetrainPolicy;
use super::state::{RetrainLock, RetrainState, LOCK_FILE, STATE_FILE};
use super::step::{RetrainContext, RetrainStep};
use crate::eval::drift::DriftReport;
use crate::Result;

/// Pure policy verdict for one report
pub fn decide(report: &DriftReport, policy: &RetrainPolicy) -> RetrainDecision {
    let (retrain, reason) = policy.evaluate(report);
    RetrainDecision { retrain, reason, last_retrain_seen: None }
}

/// Turns drift reports into at most one retrain at a time
///
/// Cooldown state and the lock live in the models directory so they hold
/// across periodic invocations and across processes.
#[derive(Clone, Debug)]
pub struct RetrainTrigger {
    config: RetrainConfig,
    state_path: PathBuf,
    lock_path: PathBuf,
}

impl RetrainTrigger {
    pub fn new(config: RetrainConfig, models_dir: impl AsRef<Path>) -> Self {
        let dir = models_dir.as_ref();
        Self { config, state_path: dir.join(STATE_FILE), lock_path: dir.join(LOCK_FILE) }
    }

    pub fn config(&self) -> &RetrainConfig {
        &self.config
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Persisted cooldown state
    pub fn state(&self) -> Result<RetrainState> {
        RetrainState::load(&self.state_path)
    }

    /// Policy verdict with cooldown and retrain limit applied
    pub fn decide(&self, report: &DriftReport) -> Result<RetrainDecision> {
        self.decide_at(report, Utc::now())
    }

    pub fn decide_at(&self, report: &DriftReport, now: DateTime<Utc>) -> Result<RetrainDecision> {
        let decision = decide(report, &self.config.policy);
        if !decision.retrain {
            return Ok(decision);
        }

        let state = self.state()?;
        Ok(self.gate(&state, now, decision.seen(state.last_retrain_at)))
    }

    /// Apply the retrain limit and cooldown of `state` to a positive decision
    fn gate(
        &self,
        state: &RetrainState,
        now: DateTime<Utc>,
        decision: RetrainDecision,
    ) -> RetrainDecision {
        if self.config.max_retrains > 0 && state.total_retrains >= self.config.max_retrains {
            return RetrainDecision::skip(format!(
                "retrain limit of {} reached ({})",
                self.config.max_retrains, decision.reason
            ))
            .seen(state.last_retrain_at);
        }
        if let Some(remaining) = state.cooldown_remaining(now, self.config.cooldown_secs) {
            return RetrainDecision::skip(format!(
                "cooldown active for another {}s ({})",
                remaining.num_seconds().max(1),
                decision.reason
            ))
            .seen(state.last_retrain_at);
        }
        decision
    }

    /// Re-check a positive decision against the state read under the lock
    ///
    /// A retrain that completed after the decision was taken makes the report
    /// stale; the decision is dropped instead of retraining twice.
    fn confirm(&self, state: &RetrainState, decision: RetrainDecision) -> RetrainDecision {
        if state.last_retrain_at > decision.last_retrain_seen {
            return RetrainDecision::skip(format!(
                "another retrain completed since this report was evaluated ({})",
                decision.reason
            ))
            .seen(state.last_retrain_at);
        }
        self.gate(state, Utc::now(), decision)
    }

    /// Decide on `ctx.report` and, if positive, run `step` under the lock
    ///
    /// A failing step is returned as is; cooldown state only moves on success.
    pub fn execute(&self, ctx: &RetrainContext<'_>, step: &mut dyn RetrainStep) -> Result<Action> {
        let decision = self.decide(ctx.report)?;
        self.apply(ctx, decision, step)
    }

    /// Act on a decision already taken for `ctx.report`
    ///
    /// The decision is confirmed against the persisted state once the lock is
    /// held, so triggers that decided concurrently retrain at most once.
    pub fn apply(
        &self,
        ctx: &RetrainContext<'_>,
        decision: RetrainDecision,
        step: &mut dyn RetrainStep,
    ) -> Result<Action> {
        if !decision.retrain {
            return Ok(self.no_retrain(ctx.report, decision));
        }

        let _lock = RetrainLock::acquire(&self.lock_path)?;
        let mut state = self.state()?;
        let decision = self.confirm(&state, decision);
        if !decision.retrain {
            return Ok(self.no_retrain(ctx.report, decision));
        }
        info!(step = step.name(), reason = %decision.reason, "retrain triggered");

        let version_id = step.run(ctx).inspect_err(|e| {
            warn!(step = step.name(), error = %e, "retrain failed, current model unchanged");
        })?;

        self.record(&mut state, version_id.clone());
        Ok(Action::Retrained { version_id })
    }

    /// Persist a successful retrain held under the lock
    pub fn record(&self, state: &mut RetrainState, version_id: Option<String>) {
        state.record(Utc::now(), version_id);
        if let Err(e) = state.save(&self.state_path) {
            warn!(error = %e, path = %self.state_path.display(), "failed to persist retrain state");
        }
    }

    fn no_retrain(&self, report: &DriftReport, decision: RetrainDecision) -> Action {
        if self.config.log_warnings && (report.overall_drift || report.warnings() > 0) {
            warn!(
                drifted = report.drifted_feature_count,
                warnings = report.warnings(),
                reason = %decision.reason,
                "drift observed, retrain not triggered"
            );
            Action::WarningLogged { reason: decision.reason }
        } else {
            info!(reason = %decision.reason, "no retrain needed");
            Action::None
        }
    }
}
