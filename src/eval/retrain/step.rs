//! Retrain steps run by the trigger while it holds the lock.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::state::LOCK_ENV;
use crate::data::{FeatureSnapshot, ReferenceDataset};
use crate::eval::drift::DriftReport;
use crate::storage::registry::ModelRegistry;
use crate::train::Trainer;
use crate::{Error, Result};

/// Inputs handed to a retrain step
#[derive(Clone, Copy, Debug)]
pub struct RetrainContext<'a> {
    pub reference: &'a ReferenceDataset,
    pub window: &'a FeatureSnapshot,
    pub report: &'a DriftReport,
}

/// A synchronous retrain-and-promote step
///
/// Returns the version the current pointer names afterwards, when the step
/// knows it. An error means the pointer was not advanced.
pub trait RetrainStep {
    fn name(&self) -> &str;

    fn run(&mut self, ctx: &RetrainContext<'_>) -> Result<Option<String>>;
}

/// Train in this process and promote through the registry
#[derive(Debug)]
pub struct InProcessStep<'a, R: ModelRegistry + ?Sized> {
    trainer: &'a mut Trainer,
    registry: &'a R,
}

impl<'a, R: ModelRegistry + ?Sized> InProcessStep<'a, R> {
    pub fn new(trainer: &'a mut Trainer, registry: &'a R) -> Self {
        Self { trainer, registry }
    }
}

impl<R: ModelRegistry + ?Sized> RetrainStep for InProcessStep<'_, R> {
    fn name(&self) -> &str {
        "in_process"
    }

    fn run(&mut self, ctx: &RetrainContext<'_>) -> Result<Option<String>> {
        self.trainer.observe_version(self.registry.latest_version()?);
        let artifact = self.trainer.train(ctx.reference, ctx.window)?;

        let path = self.registry.artifact_path(&artifact.version_id);
        if let Err(e) = self.trainer.track(&artifact, &path) {
            debug!(error = %e, "promoting without a tracking run");
        }

        let pointer = self.registry.promote(&artifact)?;
        info!(version = %pointer.version_id, path = %path.display(), "new model promoted");
        Ok(Some(pointer.version_id))
    }
}

/// Run an external retrain command; its exit status is the only signal
#[derive(Clone, Debug)]
pub struct CommandStep {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    held_lock: Option<PathBuf>,
}

impl CommandStep {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new(), current_dir: None, held_lock: None }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Tell the child that the retrain lock at `path` is held on its behalf
    pub fn holding_lock(mut self, path: &Path) -> Self {
        self.held_lock = Some(std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl RetrainStep for CommandStep {
    fn name(&self) -> &str {
        "command"
    }

    fn run(&mut self, ctx: &RetrainContext<'_>) -> Result<Option<String>> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        if let Some(lock) = &self.held_lock {
            command.env(LOCK_ENV, lock);
        }
        info!(
            program = %self.program,
            drifted = ctx.report.drifted_feature_count,
            "running retrain command"
        );

        let status = command.status().map_err(|e| {
            Error::TrainingFailure(format!("failed to start retrain command '{}': {e}", self.program))
        })?;
        if !status.success() {
            return Err(Error::TrainingFailure(format!(
                "retrain command '{}' exited with {status}",
                self.program
            )));
        }
        Ok(None)
    }
}
