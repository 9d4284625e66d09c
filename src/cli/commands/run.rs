//! Run command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{cli::RunArgs, LoopConfig, OutputFormat};
use crate::eval::drift::render_text;
use crate::eval::retrain::Action;
use crate::pipeline::ControlLoop;

pub fn run_loop(config: LoopConfig, args: &RunArgs, level: LogLevel) -> Result<(), String> {
    let mut control = ControlLoop::new(config).map_err(|e| e.to_string())?;
    let result = if args.dry_run { control.dry_run() } else { control.run_once() };
    let outcome = result.map_err(|e| e.to_string())?;

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Verbose, render_text(&outcome.report).trim_end());
            log(level, LogLevel::Normal, &format!(
                "Drift: {} of {} features",
                outcome.report.drifted_feature_count,
                outcome.report.total_features()
            ));
            log(level, LogLevel::Normal, &format!("Decision: {}", outcome.decision.reason));
            let action = match &outcome.action {
                Action::None => "none".to_string(),
                Action::WarningLogged { reason } => format!("warning logged ({reason})"),
                Action::Retrained { version_id: Some(v) } => format!("retrained, promoted {v}"),
                Action::Retrained { version_id: None } => "retrained by external step".to_string(),
            };
            log(level, LogLevel::Normal, &format!("Action: {action}"));
            match &outcome.current {
                Some(pointer) => {
                    log(level, LogLevel::Normal, &format!("Current model: {}", pointer.version_id));
                }
                None => log(level, LogLevel::Normal, "Current model: none"),
            }
            Ok(())
        }
        OutputFormat::Json => super::print_json(&outcome),
    }
}
