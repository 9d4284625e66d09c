//! Model Registry and Promotion
//!
//! Versioned artifacts on durable storage plus one atomically swapped
//! indirection, the [`CurrentModelPointer`], that the serving layer resolves
//! when it (re)loads.
//!
//! # Guarantees
//!
//! - An artifact is fully written under a name unique to its version before the
//!   pointer can name it; artifacts are never overwritten or deleted.
//! - The pointer is replaced with a single rename, so a concurrent reader sees
//!   either the old or the new version and never a partial file.
//! - A failed store, rejected policy check, or failed swap leaves the pointer
//!   untouched.
//!
//! # Example
//!
//! ```ignore
//! use driftloop::storage::registry::{FsModelRegistry, ModelRegistry};
//!
//! let registry = FsModelRegistry::open("models", "gradient_boosting_model")?;
//! registry.promote(&artifact)?;
//! let current = registry.resolve_current()?;
//! ```

mod comparison;
mod error;
mod fs;
mod pointer;
mod policy;
mod traits;
mod transition;
mod version;

#[cfg(test)]
mod tests;

pub use comparison::{Comparison, MetricRequirement, VersionComparison};
pub use error::{RegistryError, Result};
pub use fs::FsModelRegistry;
pub use pointer::CurrentModelPointer;
pub(crate) use pointer::write_atomic;
pub use policy::{PolicyCheckResult, PromotionPolicy};
pub use traits::ModelRegistry;
pub use transition::{PromotionReason, PromotionRecord};
pub use version::{checksum, next_version_id, validate_version_id, ModelArtifact, TrainedMetrics, VERSION_FORMAT};
