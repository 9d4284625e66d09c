//! Retrain command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{cli::RetrainArgs, LoopConfig, OutputFormat};
use crate::pipeline::ControlLoop;

pub fn run_retrain(config: LoopConfig, args: &RetrainArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "Retraining {} (seed {}, {} estimators)",
            config.trainer.model_name, config.trainer.seed, config.trainer.boosting.n_estimators
        ),
    );

    let mut control = ControlLoop::new(config).map_err(|e| e.to_string())?;
    let outcome = control.retrain().map_err(|e| e.to_string())?;

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, &format!("Promoted {}", outcome.version_id));
            log(level, LogLevel::Normal, &format!(
                "  RMSE: {:.4}  R2: {:.4}  MAE: {:.4}",
                outcome.metrics.rmse, outcome.metrics.r2, outcome.metrics.mae
            ));
            log(level, LogLevel::Normal, &format!("  Artifact: {}", outcome.artifact_path.display()));
            if let Some(run) = &outcome.tracking_run {
                log(level, LogLevel::Verbose, &format!("  Tracking run: {run}"));
            }
            Ok(())
        }
        OutputFormat::Json => super::print_json(&outcome),
    }
}
