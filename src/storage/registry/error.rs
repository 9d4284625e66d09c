//! Registry error types

use thiserror::Error;

/// Registry errors
///
/// Every variant leaves the current-model pointer as it was before the call.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("Artifact already stored for version {0}")]
    ArtifactExists(String),

    #[error("No model has been promoted yet")]
    NoCurrentModel,

    #[error("Invalid version id: {0}")]
    InvalidVersion(String),

    #[error("Artifact {version} is corrupt: {reason}")]
    Corrupt { version: String, reason: String },

    #[error("Promotion rejected by policy: {}", .0.join("; "))]
    PolicyRejected(Vec<String>),

    #[error("Registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Registry serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
