//! Train command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{cli::TrainArgs, LoopConfig, OutputFormat};
use crate::pipeline::ControlLoop;

pub fn run_train(config: LoopConfig, args: &TrainArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Verbose,
        &format!("Training {} from {}", config.trainer.model_name, config.paths.reference.display()),
    );

    let mut control = ControlLoop::new(config).map_err(|e| e.to_string())?;
    let outcome = control.train_initial().map_err(|e| e.to_string())?;

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, &format!("Promoted {}", outcome.version_id));
            log(level, LogLevel::Normal, &format!(
                "  MAE: {:.4}  R2: {:.4}  RMSE: {:.4}",
                outcome.metrics.mae, outcome.metrics.r2, outcome.metrics.rmse
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
