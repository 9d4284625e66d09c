//! Tracking storage backends
//!
//! Provides the `TrackingBackend` trait, a JSON file-based implementation
//! for persisting runs to disk, and an in-memory one for tests.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::Run;
use crate::storage::registry::write_atomic;

/// Errors from tracking storage operations
#[derive(Debug, thiserror::Error)]
pub enum TrackingStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {0}")]
    RunNotFound(String),
}

/// Result alias for tracking storage operations
pub type Result<T> = std::result::Result<T, TrackingStorageError>;

/// Trait for tracking storage backends
///
/// Implementations persist and retrieve finished runs.
pub trait TrackingBackend {
    /// Save a run, replacing any run with the same id
    fn save_run(&mut self, run: &Run) -> Result<()>;

    /// Load a run by its ID
    fn load_run(&self, run_id: &str) -> Result<Run>;

    /// List all stored runs
    fn list_runs(&self) -> Result<Vec<Run>>;

    /// Whether a run with this id is stored
    fn contains(&self, run_id: &str) -> Result<bool> {
        match self.load_run(run_id) {
            Ok(_) => Ok(true),
            Err(TrackingStorageError::RunNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// JSON file-based tracking backend
///
/// Stores each run as a separate JSON file in a directory. File names are
/// `{run_id}.json` with anything outside `[A-Za-z0-9_.-]` replaced by `_`.
///
/// # Example
///
/// ```no_run
/// use driftloop::tracking::storage::JsonFileBackend;
///
/// let backend = JsonFileBackend::new("mlruns/gradient_boosting_housing");
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend; the directory is created on first save
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn run_path(&self, run_id: &str) -> PathBuf {
        let safe: String = run_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl TrackingBackend for JsonFileBackend {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        let json = serde_json::to_vec_pretty(run)?;
        write_atomic(&self.run_path(&run.run_id), &json)?;
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> Result<Run> {
        match fs::read(self.run_path(run_id)) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(TrackingStorageError::RunNotFound(run_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_runs(&self) -> Result<Vec<Run>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                runs.push(serde_json::from_slice(&fs::read(&path)?)?);
            }
        }
        runs.sort_by(|a: &Run, b: &Run| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }
}

/// In-memory tracking backend for testing
///
/// Stores runs in a `HashMap`. No persistence.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    runs: HashMap<String, Run>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackingBackend for InMemoryBackend {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        self.runs.insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> Result<Run> {
        self.runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| TrackingStorageError::RunNotFound(run_id.to_string()))
    }

    fn list_runs(&self) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self.runs.values().cloned().collect();
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }
}
