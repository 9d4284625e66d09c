//! Persisted cooldown state and the retrain lock file.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::registry::write_atomic;
use crate::{Error, Result};

/// File name of the cooldown state inside the models directory
pub const STATE_FILE: &str = "retrain_state.json";
/// File name of the retrain lock inside the models directory
pub const LOCK_FILE: &str = "retrain.lock";
/// Environment variable naming a lock already held by the parent process
pub const LOCK_ENV: &str = "DRIFTLOOP_RETRAIN_LOCK";

/// What the trigger remembers between periodic invocations
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrainState {
    /// Completion time of the last successful retrain
    pub last_retrain_at: Option<DateTime<Utc>>,
    /// Version promoted by the last successful retrain
    pub last_version: Option<String>,
    /// Successful retrains so far
    pub total_retrains: u64,
}

impl RetrainState {
    /// Load the state; a missing file is a fresh state
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Record a successful retrain finished at `at`
    pub fn record(&mut self, at: DateTime<Utc>, version: Option<String>) {
        self.last_retrain_at = Some(at);
        self.last_version = version;
        self.total_retrains += 1;
    }

    /// Time left before another retrain is allowed, if any
    pub fn cooldown_remaining(&self, now: DateTime<Utc>, cooldown_secs: u64) -> Option<Duration> {
        let last = self.last_retrain_at?;
        let secs = i64::try_from(cooldown_secs).unwrap_or(i64::MAX).min(i64::MAX / 1000);
        let cooldown = Duration::seconds(secs);
        let elapsed = now.signed_duration_since(last);
        (elapsed < cooldown).then(|| cooldown - elapsed)
    }
}

/// Exclusive marker that a retrain is running
///
/// Created with create-new semantics so that a second trigger, in this or any
/// other process, fails instead of waiting. Removed on drop. A lock left by a
/// process that no longer runs is reclaimed.
#[derive(Debug)]
pub struct RetrainLock {
    path: PathBuf,
}

impl RetrainLock {
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        match Self::create(path) {
            Err(Error::RetrainInProgress(held)) => {
                if Self::reclaim_stale(path)? {
                    Self::create(path)
                } else {
                    Err(Error::RetrainInProgress(held))
                }
            }
            other => other,
        }
    }

    /// Whether a parent process already holds the lock at `path` for us
    pub fn held_by_parent(path: &Path) -> bool {
        let Some(held) = std::env::var_os(LOCK_ENV) else {
            return false;
        };
        let ours = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        ours.as_path() == Path::new(&held) && path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn create(path: &Path) -> Result<Self> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::RetrainInProgress(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let lock = Self { path: path.to_path_buf() };
        // holder info is what stale detection reads back
        let _ = writeln!(file, "pid={} started={}", std::process::id(), Utc::now().to_rfc3339());
        Ok(lock)
    }

    /// Remove the lock at `path` if its holder is gone
    fn reclaim_stale(path: &Path) -> Result<bool> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(e.into()),
        };
        let Some(pid) = holder_pid(&contents) else {
            return Ok(false);
        };
        if pid == std::process::id() || process_alive(pid) {
            return Ok(false);
        }
        // only remove the lock that was judged stale
        if fs::read_to_string(path).ok().as_deref() != Some(contents.as_str()) {
            return Ok(false);
        }
        warn!(path = %path.display(), pid, "reclaiming retrain lock of a process that is gone");
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for RetrainLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to release retrain lock");
        }
    }
}

fn holder_pid(contents: &str) -> Option<u32> {
    contents
        .split_whitespace()
        .find_map(|field| field.strip_prefix("pid="))
        .and_then(|pid| pid.parse().ok())
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

// no portable liveness check; a foreign lock is never reclaimed
#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> bool {
    true
}
