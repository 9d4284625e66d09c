//! Core CLI types - Cli, Command, and argument structs

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::types::{DriftTestArg, OutputFormat};
use crate::config::schema::LoopConfig;
use crate::storage::WindowSpec;

/// driftloop: drift detection, retraining, and model promotion
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "driftloop")]
#[command(version)]
#[command(about = "Model lifecycle control loop: detect drift, retrain, and promote atomically")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// YAML configuration file; missing file means defaults
    #[arg(short, long, global = true, default_value = "driftloop.yaml")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Compare recent predictions against the reference and report drift
    Detect(DetectArgs),

    /// Train the first model from the reference dataset and promote it
    Train(TrainArgs),

    /// Detect, decide, and retrain and promote when drift warrants it
    Run(RunArgs),

    /// Retrain from reference plus the log window and promote unconditionally of drift
    Retrain(RetrainArgs),

    /// Show the current model pointer
    Current(RegistryArgs),

    /// List stored model versions
    Versions(RegistryArgs),

    /// Re-point the current model to a stored version
    Rollback(RollbackArgs),
}

/// Input locations shared by data-reading commands
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct DataArgs {
    /// Override reference dataset CSV
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Override prediction log CSV
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Override target column of the reference dataset
    #[arg(long)]
    pub target_column: Option<String>,

    /// Override models directory
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// Only use the most recent N log records
    #[arg(long, value_name = "N")]
    pub last: Option<usize>,
}

/// Drift test selection
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct DriftArgs {
    /// Drift test (ks, psi, wasserstein, auto)
    #[arg(long)]
    pub test: Option<DriftTestArg>,

    /// Threshold of the selected test
    #[arg(long, requires = "test")]
    pub threshold: Option<f64>,

    /// Override reports directory
    #[arg(long)]
    pub reports_dir: Option<PathBuf>,

    /// Do not write JSON/HTML report artifacts
    #[arg(long)]
    pub no_report: bool,
}

/// Arguments for the detect command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct DetectArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub drift: DriftArgs,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the run command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RunArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub drift: DriftArgs,

    /// Detect and decide only; never retrain
    #[arg(long)]
    pub dry_run: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Override reference dataset CSV
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Override target column of the reference dataset
    #[arg(long)]
    pub target_column: Option<String>,

    /// Override models directory
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    #[command(flatten)]
    pub trainer: TrainerArgs,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Trainer overrides shared by training commands
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct TrainerArgs {
    /// Random seed for synthetic targets and the split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override number of boosting stages
    #[arg(long)]
    pub n_estimators: Option<usize>,

    /// Skip experiment tracking
    #[arg(long)]
    pub no_tracking: bool,
}

/// Arguments for the retrain command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RetrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub trainer: TrainerArgs,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for registry inspection commands
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RegistryArgs {
    /// Override models directory
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the rollback command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RollbackArgs {
    /// Stored version to make current
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// Override models directory
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Parse command-line arguments
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a loaded configuration
pub fn apply_overrides(config: &mut LoopConfig, command: &Command) {
    match command {
        Command::Detect(args) => {
            apply_data(config, &args.data);
            apply_drift(config, &args.drift);
        }
        Command::Run(args) => {
            apply_data(config, &args.data);
            apply_drift(config, &args.drift);
        }
        Command::Train(args) => {
            if let Some(path) = &args.reference {
                config.paths.reference = path.clone();
            }
            if let Some(column) = &args.target_column {
                config.paths.target_column = column.clone();
            }
            if let Some(dir) = &args.models_dir {
                config.paths.models_dir = dir.clone();
            }
            apply_trainer(config, &args.trainer);
        }
        Command::Retrain(args) => {
            apply_data(config, &args.data);
            apply_trainer(config, &args.trainer);
        }
        Command::Current(args) | Command::Versions(args) => {
            if let Some(dir) = &args.models_dir {
                config.paths.models_dir = dir.clone();
            }
        }
        Command::Rollback(args) => {
            if let Some(dir) = &args.models_dir {
                config.paths.models_dir = dir.clone();
            }
        }
    }
}

fn apply_data(config: &mut LoopConfig, args: &DataArgs) {
    if let Some(path) = &args.reference {
        config.paths.reference = path.clone();
    }
    if let Some(path) = &args.log {
        config.paths.prediction_log = path.clone();
    }
    if let Some(column) = &args.target_column {
        config.paths.target_column = column.clone();
    }
    if let Some(dir) = &args.models_dir {
        config.paths.models_dir = dir.clone();
    }
    if let Some(count) = args.last {
        config.drift.window = WindowSpec::LastN { count };
    }
}

fn apply_trainer(config: &mut LoopConfig, args: &TrainerArgs) {
    if let Some(seed) = args.seed {
        config.trainer.seed = seed;
    }
    if let Some(n) = args.n_estimators {
        config.trainer.boosting.n_estimators = n;
    }
    if args.no_tracking {
        config.tracking.enabled = false;
    }
}

fn apply_drift(config: &mut LoopConfig, args: &DriftArgs) {
    if let Some(test) = args.test {
        config.drift.test = test.to_test(args.threshold);
    }
    if let Some(dir) = &args.reports_dir {
        config.paths.reports_dir = dir.clone();
    }
    if args.no_report {
        config.drift.write_reports = false;
    }
}
