//! CLI value types

use crate::eval::drift::DriftTest;

/// Output format of command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {s}. Valid formats: text, json")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Drift test selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftTestArg {
    Ks,
    Psi,
    Wasserstein,
    Auto,
}

impl DriftTestArg {
    /// Concrete test, using `threshold` or the test's stock threshold
    pub fn to_test(self, threshold: Option<f64>) -> DriftTest {
        match self {
            DriftTestArg::Ks => DriftTest::KS { threshold: threshold.unwrap_or(0.05) },
            DriftTestArg::Psi => DriftTest::PSI { threshold: threshold.unwrap_or(0.2) },
            DriftTestArg::Wasserstein => {
                DriftTest::Wasserstein { threshold: threshold.unwrap_or(0.1) }
            }
            DriftTestArg::Auto => DriftTest::Auto,
        }
    }
}

impl std::str::FromStr for DriftTestArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ks" => Ok(DriftTestArg::Ks),
            "psi" => Ok(DriftTestArg::Psi),
            "wasserstein" => Ok(DriftTestArg::Wasserstein),
            "auto" => Ok(DriftTestArg::Auto),
            _ => Err(format!("Unknown drift test: {s}. Valid tests: ks, psi, wasserstein, auto")),
        }
    }
}
