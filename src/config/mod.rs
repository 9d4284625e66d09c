//! Configuration
//!
//! `LoopConfig` is read from YAML, validated, then adjusted by command-line
//! overrides. A missing configuration file yields the defaults.

pub mod cli;
mod schema;
mod validate;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

pub use cli::{apply_overrides, parse_args, Cli, Command, DriftTestArg, OutputFormat};
pub use schema::{
    DriftConfig, LoopConfig, PathsConfig, RetrainSection, StepConfig, TrackingConfig,
    DEFAULT_EXPERIMENT,
};
pub use validate::{validate_config, ValidationError};

use crate::{Error, Result};

/// Load and validate a configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<LoopConfig> {
    let path = path.as_ref();
    let config = match fs::read_to_string(path) {
        Ok(content) => parse_config(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no configuration file, using defaults");
            LoopConfig::default()
        }
        Err(e) => return Err(e.into()),
    };
    validate_config(&config).map_err(|e| Error::Config(format!("Invalid config: {e}")))?;
    Ok(config)
}

/// Parse YAML configuration text without validating it
pub fn parse_config(yaml: &str) -> Result<LoopConfig> {
    if yaml.trim().is_empty() {
        return Ok(LoopConfig::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}
