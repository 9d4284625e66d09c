//! CLI command implementations

mod detect;
mod registry;
mod retrain;
mod run;
mod train;


use serde::Serialize;

use crate::config::{apply_overrides, load_config, Cli, Command, LoopConfig};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = crate::cli::log_level(&cli);

    let config = resolve_config(&cli)?;
    match cli.command {
        Command::Detect(args) => detect::run_detect(config, &args, log_level),
        Command::Train(args) => train::run_train(config, &args, log_level),
        Command::Run(args) => run::run_loop(config, &args, log_level),
        Command::Retrain(args) => retrain::run_retrain(config, &args, log_level),
        Command::Current(args) => registry::run_current(&config, &args, log_level),
        Command::Versions(args) => registry::run_versions(&config, &args, log_level),
        Command::Rollback(args) => registry::run_rollback(&config, &args, log_level),
    }
}

/// Load the configuration file and apply the command's overrides
pub fn resolve_config(cli: &Cli) -> Result<LoopConfig, String> {
    let mut config = load_config(&cli.config).map_err(|e| e.to_string())?;
    apply_overrides(&mut config, &cli.command);
    crate::config::validate_config(&config).map_err(|e| format!("Invalid arguments: {e}"))?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization error: {e}"))?;
    println!("{json}");
    Ok(())
}
