//! Detect command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{cli::DetectArgs, LoopConfig, OutputFormat};
use crate::eval::drift::render_text;
use crate::pipeline::{ControlLoop, Detection};

pub fn run_detect(config: LoopConfig, args: &DetectArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "Comparing {} against {}",
            config.paths.prediction_log.display(),
            config.paths.reference.display()
        ),
    );

    let control = ControlLoop::new(config).map_err(|e| e.to_string())?;
    let detection = control.detect().map_err(|e| e.to_string())?;

    match args.format {
        OutputFormat::Text => {
            for (required, line) in text_lines(&detection) {
                log(level, required, &line);
            }
            Ok(())
        }
        OutputFormat::Json => super::print_json(&detection.report),
    }
}

/// Text output, one entry per printed line
pub(super) fn text_lines(detection: &Detection) -> Vec<(LogLevel, String)> {
    let mut lines: Vec<(LogLevel, String)> = render_text(&detection.report)
        .lines()
        .map(|line| (LogLevel::Normal, line.to_string()))
        .collect();
    if let Some(paths) = &detection.report_paths {
        lines.push((LogLevel::Normal, format!("Report: {}", paths.json.display())));
        lines.push((LogLevel::Verbose, format!("HTML: {}", paths.html.display())));
    }
    lines
}
