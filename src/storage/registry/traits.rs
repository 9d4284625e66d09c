//! Model registry trait definition

use std::path::PathBuf;

use super::error::Result;
use super::pointer::CurrentModelPointer;
use super::transition::PromotionRecord;
use super::version::ModelArtifact;

/// Versioned artifact store with a single current-model indirection
///
/// Artifacts are immutable and never deleted. Any failing call leaves the
/// current pointer exactly as it was.
pub trait ModelRegistry: Send + Sync {
    /// Durably write an artifact; an already stored version is an error
    fn store(&self, artifact: &ModelArtifact) -> Result<()>;

    /// Store (if needed) and atomically make `artifact` current
    fn promote(&self, artifact: &ModelArtifact) -> Result<CurrentModelPointer>;

    /// Atomically make an already stored version current
    fn promote_version(&self, version_id: &str) -> Result<CurrentModelPointer>;

    /// The pointer the serving layer should resolve at load time
    fn resolve_current(&self) -> Result<Option<CurrentModelPointer>>;

    /// Where the metadata of `version_id` is (or will be) stored
    fn artifact_path(&self, version_id: &str) -> PathBuf;

    /// Load a stored artifact, verifying its checksum
    fn load(&self, version_id: &str) -> Result<ModelArtifact>;

    /// Load the artifact named by the current pointer
    fn load_current(&self) -> Result<ModelArtifact>;

    /// Stored version ids in ascending order
    fn list_versions(&self) -> Result<Vec<String>>;

    /// Newest stored version id
    fn latest_version(&self) -> Result<Option<String>> {
        Ok(self.list_versions()?.pop())
    }

    /// Pointer swaps in the order they happened
    fn history(&self) -> Result<Vec<PromotionRecord>>;
}
