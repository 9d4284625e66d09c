//! Versioned model artifacts

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::{RegistryError, Result};

/// Format of the timestamp part of a version id
pub const VERSION_FORMAT: &str = "%Y%m%d_%H%M%S";

const VERSION_BASE_LEN: usize = 15;
const MAX_COLLISION_SUFFIX: u32 = 99;

/// Held-out evaluation metrics of a trained model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainedMetrics {
    /// Root-mean-squared error on the validation split
    pub rmse: f64,
    /// Coefficient of determination on the validation split
    pub r2: f64,
    /// Mean absolute error on the validation split
    #[serde(default)]
    pub mae: f64,
}

impl TrainedMetrics {
    /// Look up a metric by name (`rmse`, `r2` or `mae`)
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "rmse" => Some(self.rmse),
            "r2" => Some(self.r2),
            "mae" => Some(self.mae),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.rmse.is_finite() && self.r2.is_finite() && self.mae.is_finite()
    }
}

/// Immutable, versioned model ready for the serving layer
///
/// Metadata is stored as `<model_name>_<version_id>.json` and the payload as
/// `<model_name>_<version_id>.bin` next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Artifact family, used as the file name prefix
    pub model_name: String,
    /// Monotonic, UTC-timestamp-derived version
    pub version_id: String,
    /// Fit completion time
    pub created_at: DateTime<Utc>,
    /// Hyperparameters and data provenance
    pub parameters: BTreeMap<String, String>,
    /// Held-out metrics, for audit
    pub metrics: TrainedMetrics,
    /// Feature columns in the order the payload expects them
    pub feature_names: Vec<String>,
    /// SHA-256 of the payload, lowercase hex
    pub checksum: String,
    /// Serialized model; stored in its own file
    #[serde(skip)]
    pub payload: Vec<u8>,
}

impl ModelArtifact {
    /// Create an artifact and compute the payload checksum
    pub fn new(
        model_name: &str,
        version_id: &str,
        metrics: TrainedMetrics,
        feature_names: Vec<String>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            model_name: model_name.to_string(),
            version_id: version_id.to_string(),
            created_at: Utc::now(),
            parameters: BTreeMap::new(),
            metrics,
            feature_names,
            checksum: checksum(&payload),
            payload,
        }
    }

    /// Add a parameter
    pub fn with_parameter(mut self, key: &str, value: impl ToString) -> Self {
        self.parameters.insert(key.to_string(), value.to_string());
        self
    }

    /// Base file name shared by metadata and payload
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.model_name, self.version_id)
    }

    /// Whether the payload still matches the recorded checksum
    pub fn verify(&self) -> Result<()> {
        let actual = checksum(&self.payload);
        if actual == self.checksum {
            Ok(())
        } else {
            Err(RegistryError::Corrupt {
                version: self.version_id.clone(),
                reason: format!("checksum {actual} does not match recorded {}", self.checksum),
            })
        }
    }
}

/// SHA-256 of a payload as lowercase hex
pub fn checksum(payload: &[u8]) -> String {
    format!("{:x}", Sha256::digest(payload))
}

/// Reject anything that is not `YYYYmmdd_HHMMSS` with an optional `_NN` suffix
///
/// Version ids become file names, so this also keeps them inside the models
/// directory.
pub fn validate_version_id(version_id: &str) -> Result<()> {
    let bytes = version_id.as_bytes();
    let shape_ok = match bytes.len() {
        VERSION_BASE_LEN => true,
        18 => bytes[VERSION_BASE_LEN] == b'_' && bytes[16..].iter().all(u8::is_ascii_digit),
        _ => false,
    };
    let base_ok = bytes.len() >= VERSION_BASE_LEN
        && bytes[8] == b'_'
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[9..VERSION_BASE_LEN].iter().all(u8::is_ascii_digit);

    if shape_ok && base_ok {
        Ok(())
    } else {
        Err(RegistryError::InvalidVersion(version_id.to_string()))
    }
}

/// Next version id for a fit completed at `now`
///
/// The id is `now` formatted with [`VERSION_FORMAT`]. If that id is not
/// strictly after `last` or is already `taken`, a two-digit `_NN` suffix is
/// appended; suffixed ids sort after the bare id of the same second and before
/// the next second. Ids never go backwards even if the wall clock does.
pub fn next_version_id(
    now: DateTime<Utc>,
    last: Option<&str>,
    taken: impl Fn(&str) -> bool,
) -> Result<String> {
    let mut base = now.format(VERSION_FORMAT).to_string();
    if let Some(last_base) = last.and_then(|l| l.get(..VERSION_BASE_LEN)) {
        if last_base > base.as_str() {
            base = last_base.to_string();
        }
    }

    for n in 0..=MAX_COLLISION_SUFFIX {
        let candidate = if n == 0 { base.clone() } else { format!("{base}_{n:02}") };
        let after_last = last.is_none_or(|l| candidate.as_str() > l);
        if after_last && !taken(&candidate) {
            return Ok(candidate);
        }
    }
    Err(RegistryError::InvalidVersion(format!(
        "more than {MAX_COLLISION_SUFFIX} versions issued within {base}"
    )))
}
