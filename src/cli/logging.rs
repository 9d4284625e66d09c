//! Logging utilities for CLI output
//!
//! Human-facing output goes through [`log`]; diagnostics go through `tracing`
//! with a subscriber installed by [`init_tracing`].

use tracing_subscriber::EnvFilter;

/// Log level for CLI output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Suppress all output
    Quiet,
    /// Normal output level
    Normal,
    /// Verbose output with additional details
    Verbose,
}

impl LogLevel {
    /// Default `tracing` directive for this level
    pub fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Quiet => "error",
            LogLevel::Normal => "warn",
            LogLevel::Verbose => "driftloop=debug,info",
        }
    }
}

/// Log a message if the current level permits it
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level != LogLevel::Quiet && (level == required || required == LogLevel::Normal) {
        println!("{msg}");
    }
}

/// Install the global `tracing` subscriber writing to stderr
///
/// `RUST_LOG` takes precedence over the verbosity flags.
pub fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives() {
        assert_eq!(LogLevel::Quiet.filter_directive(), "error");
        assert_eq!(LogLevel::Normal.filter_directive(), "warn");
        assert!(LogLevel::Verbose.filter_directive().contains("debug"));
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(LogLevel::Normal);
        init_tracing(LogLevel::Verbose);
    }
}
