//! Filesystem-backed model registry
//!
//! Layout of the models directory:
//!
//! ```text
//! <root>/<model_name>_<version_id>.bin    payload
//! <root>/<model_name>_<version_id>.json   metadata (written last; marks the version stored)
//! <root>/CURRENT                          current-model pointer
//! <root>/promotions.jsonl                 promotion history
//! ```

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{info, warn};

use super::error::{RegistryError, Result};
use super::pointer::{write_atomic, CurrentModelPointer};
use super::policy::PromotionPolicy;
use super::traits::ModelRegistry;
use super::transition::{PromotionReason, PromotionRecord};
use super::version::{validate_version_id, ModelArtifact};

const POINTER_FILE: &str = "CURRENT";
const HISTORY_FILE: &str = "promotions.jsonl";

/// Model registry rooted at a models directory
#[derive(Debug)]
pub struct FsModelRegistry {
    root: PathBuf,
    model_name: String,
    policy: PromotionPolicy,
    /// Serialises pointer swaps from this process
    swap_lock: Mutex<()>,
}

impl FsModelRegistry {
    /// Open (and create if needed) a registry for one model family
    pub fn open(root: impl AsRef<Path>, model_name: &str) -> Result<Self> {
        if model_name.is_empty()
            || !model_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(RegistryError::InvalidVersion(format!("invalid model name '{model_name}'")));
        }
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            model_name: model_name.to_string(),
            policy: PromotionPolicy::default(),
            swap_lock: Mutex::new(()),
        })
    }

    /// Gate promotions with `policy`
    pub fn with_policy(mut self, policy: PromotionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &PromotionPolicy {
        &self.policy
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Path of the pointer file the serving layer resolves
    pub fn pointer_path(&self) -> PathBuf {
        self.root.join(POINTER_FILE)
    }

    fn stem(&self, version_id: &str) -> String {
        format!("{}_{version_id}", self.model_name)
    }

    fn metadata_path(&self, version_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", self.stem(version_id)))
    }

    fn payload_path(&self, version_id: &str) -> PathBuf {
        self.root.join(format!("{}.bin", self.stem(version_id)))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.swap_lock
            .lock()
            .map_err(|_| RegistryError::Io(std::io::Error::other("registry lock poisoned")))
    }

    fn swap_pointer(&self, version_id: &str, reason: PromotionReason) -> Result<CurrentModelPointer> {
        let previous = self.resolve_current()?.map(|p| p.version_id);
        let pointer =
            CurrentModelPointer::new(version_id, &format!("{}.json", self.stem(version_id)));
        pointer.write(&self.pointer_path())?;

        info!(version = version_id, previous = ?previous, ?reason, "current model pointer swapped");

        let record = PromotionRecord {
            version_id: version_id.to_string(),
            previous,
            timestamp: Utc::now(),
            reason,
        };
        if let Err(e) = self.append_history(&record) {
            warn!(error = %e, "failed to append promotion history");
        }
        Ok(pointer)
    }

    fn append_history(&self, record: &PromotionRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut file =
            OpenOptions::new().create(true).append(true).open(self.root.join(HISTORY_FILE))?;
        file.write_all(&line)?;
        Ok(())
    }
}

impl ModelRegistry for FsModelRegistry {
    fn store(&self, artifact: &ModelArtifact) -> Result<()> {
        validate_version_id(&artifact.version_id)?;
        if artifact.model_name != self.model_name {
            return Err(RegistryError::InvalidVersion(format!(
                "artifact of model '{}' cannot be stored in registry '{}'",
                artifact.model_name, self.model_name
            )));
        }
        artifact.verify()?;

        let metadata_path = self.metadata_path(&artifact.version_id);
        if metadata_path.exists() {
            return Err(RegistryError::ArtifactExists(artifact.version_id.clone()));
        }

        write_atomic(&self.payload_path(&artifact.version_id), &artifact.payload)?;
        write_atomic(&metadata_path, &serde_json::to_vec_pretty(artifact)?)?;

        info!(version = %artifact.version_id, path = %metadata_path.display(), "artifact stored");
        Ok(())
    }

    fn promote(&self, artifact: &ModelArtifact) -> Result<CurrentModelPointer> {
        let _guard = self.lock()?;

        if self.metadata_path(&artifact.version_id).exists() {
            let stored = self.load(&artifact.version_id)?;
            if stored.checksum != artifact.checksum {
                return Err(RegistryError::ArtifactExists(artifact.version_id.clone()));
            }
        } else {
            self.store(artifact)?;
        }

        if !self.policy.is_unconditional() {
            let current = match self.resolve_current()? {
                Some(pointer) => Some(self.load(&pointer.version_id)?),
                None => None,
            };
            let check = self.policy.check(artifact, current.as_ref());
            if !check.passed {
                warn!(
                    version = %artifact.version_id,
                    failed = ?check.failed_requirements,
                    "promotion rejected by policy"
                );
                return Err(RegistryError::PolicyRejected(check.failed_requirements));
            }
        }

        self.swap_pointer(&artifact.version_id, PromotionReason::Retrain)
    }

    fn promote_version(&self, version_id: &str) -> Result<CurrentModelPointer> {
        let _guard = self.lock()?;
        self.load(version_id)?;
        self.swap_pointer(version_id, PromotionReason::Rollback)
    }

    fn resolve_current(&self) -> Result<Option<CurrentModelPointer>> {
        CurrentModelPointer::read(&self.pointer_path())
    }

    fn artifact_path(&self, version_id: &str) -> PathBuf {
        self.metadata_path(version_id)
    }

    fn load(&self, version_id: &str) -> Result<ModelArtifact> {
        validate_version_id(version_id)?;

        let metadata = match fs::read(self.metadata_path(version_id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RegistryError::VersionNotFound(version_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let mut artifact: ModelArtifact =
            serde_json::from_slice(&metadata).map_err(|e| RegistryError::Corrupt {
                version: version_id.to_string(),
                reason: e.to_string(),
            })?;

        artifact.payload = fs::read(self.payload_path(version_id)).map_err(|e| {
            RegistryError::Corrupt { version: version_id.to_string(), reason: e.to_string() }
        })?;
        artifact.verify()?;
        Ok(artifact)
    }

    fn load_current(&self) -> Result<ModelArtifact> {
        let pointer = self.resolve_current()?.ok_or(RegistryError::NoCurrentModel)?;
        self.load(&pointer.version_id)
    }

    fn list_versions(&self) -> Result<Vec<String>> {
        let prefix = format!("{}_", self.model_name);
        let mut versions = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            let version = name.strip_prefix(&prefix).and_then(|rest| rest.strip_suffix(".json"));
            if let Some(version) = version {
                if validate_version_id(version).is_ok() {
                    versions.push(version.to_string());
                }
            }
        }
        versions.sort();
        Ok(versions)
    }

    fn history(&self) -> Result<Vec<PromotionRecord>> {
        let content = match fs::read_to_string(self.root.join(HISTORY_FILE)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(RegistryError::from))
            .collect()
    }
}
