//! driftloop CLI
//!
//! Periodic entry point of the model lifecycle control loop.
//!
//! # Usage
//!
//! ```bash
//! # Detect drift between the reference dataset and the prediction log
//! driftloop detect --last 500
//!
//! # Full loop: detect, decide, retrain, promote
//! driftloop run --config driftloop.yaml
//!
//! # Inspect and roll back promotions
//! driftloop versions
//! driftloop rollback 20250601_120000
//! ```

use clap::Parser;
use driftloop::cli::{init_tracing, log_level, run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(log_level(&cli));

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
