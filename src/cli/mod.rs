//! CLI module for driftloop
//!
//! Command handlers behind the `driftloop` binary.

mod commands;
pub mod logging;

pub use commands::{resolve_config, run_command};
pub use logging::{init_tracing, LogLevel};

pub use crate::config::Cli;

/// Output level selected by the global flags; `--quiet` wins over `--verbose`
pub fn log_level(cli: &Cli) -> LogLevel {
    if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    }
}
