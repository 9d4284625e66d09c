//! Registry commands: current, versions, rollback

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::cli::{RegistryArgs, RollbackArgs};
use crate::config::{LoopConfig, OutputFormat};
use crate::storage::registry::{FsModelRegistry, ModelRegistry};

fn open(config: &LoopConfig) -> Result<FsModelRegistry, String> {
    FsModelRegistry::open(&config.paths.models_dir, &config.trainer.model_name)
        .map_err(|e| e.to_string())
}

pub fn run_current(config: &LoopConfig, args: &RegistryArgs, level: LogLevel) -> Result<(), String> {
    let registry = open(config)?;
    let current = registry.resolve_current().map_err(|e| e.to_string())?;

    match args.format {
        OutputFormat::Text => {
            match &current {
                Some(pointer) => {
                    println!("{}", pointer.version_id);
                    log(level, LogLevel::Verbose, &format!(
                        "  artifact: {}  promoted: {}",
                        pointer.artifact,
                        pointer.promoted_at.to_rfc3339()
                    ));
                }
                None => log(level, LogLevel::Normal, "No model has been promoted yet"),
            }
            Ok(())
        }
        OutputFormat::Json => super::print_json(&current),
    }
}

pub fn run_versions(config: &LoopConfig, args: &RegistryArgs, level: LogLevel) -> Result<(), String> {
    let registry = open(config)?;
    let versions = registry.list_versions().map_err(|e| e.to_string())?;
    let current = registry.resolve_current().map_err(|e| e.to_string())?.map(|p| p.version_id);

    match args.format {
        OutputFormat::Text => {
            if versions.is_empty() {
                log(level, LogLevel::Normal, "No stored versions");
            }
            for version in &versions {
                let marker = if current.as_deref() == Some(version.as_str()) { "*" } else { " " };
                println!("{marker} {version}");
            }
            Ok(())
        }
        OutputFormat::Json => super::print_json(&serde_json::json!({
            "versions": versions,
            "current": current,
        })),
    }
}

pub fn run_rollback(config: &LoopConfig, args: &RollbackArgs, level: LogLevel) -> Result<(), String> {
    let registry = open(config)?;
    let previous = registry.resolve_current().map_err(|e| e.to_string())?.map(|p| p.version_id);
    let pointer = registry.promote_version(&args.version).map_err(|e| e.to_string())?;

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, &format!(
                "Current model: {} (was {})",
                pointer.version_id,
                previous.as_deref().unwrap_or("none")
            ));
            Ok(())
        }
        OutputFormat::Json => super::print_json(&serde_json::json!({
            "previous": previous,
            "current": pointer,
        })),
    }
}
