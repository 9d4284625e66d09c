//! Current-model pointer and atomic file replacement

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{RegistryError, Result};

/// The single indirection naming the artifact the serving layer loads next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentModelPointer {
    /// Version the serving layer must load
    pub version_id: String,
    /// Metadata file name of that version, relative to the models directory
    pub artifact: String,
    /// When the pointer was last swapped
    pub promoted_at: DateTime<Utc>,
}

impl CurrentModelPointer {
    pub fn new(version_id: &str, artifact: &str) -> Self {
        Self {
            version_id: version_id.to_string(),
            artifact: artifact.to_string(),
            promoted_at: Utc::now(),
        }
    }

    /// Read a pointer file; `None` if nothing has been promoted yet
    pub fn read(path: &Path) -> Result<Option<Self>> {
        match fs::read(path) {
            Ok(bytes) => {
                let pointer: Self = serde_json::from_slice(&bytes).map_err(|e| {
                    RegistryError::Corrupt {
                        version: "CURRENT".to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(Some(pointer))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Swap the pointer file in one rename
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &json)?;
        Ok(())
    }
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `path` with `bytes` so readers see either the old or the new file
///
/// Uses write-to-temp + fsync + rename within the same directory.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;

    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("file");
    let temp_path = dir.join(format!(
        ".{file_name}.tmp-{}-{}",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = (|| -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
        return result;
    }

    // Persist the rename itself; not every platform allows opening a directory.
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_pointer_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(CurrentModelPointer::read(&dir.path().join("CURRENT")).unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CURRENT");
        let pointer = CurrentModelPointer::new("20250601_120000", "m_20250601_120000.json");
        pointer.write(&path).unwrap();

        assert_eq!(CurrentModelPointer::read(&path).unwrap(), Some(pointer));
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CURRENT");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["CURRENT".to_string()]);
        assert_eq!(fs::read(&path).unwrap(), b"two");
    }

    #[test]
    fn test_garbage_pointer_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CURRENT");
        fs::write(&path, b"{not json").unwrap();
        assert!(matches!(CurrentModelPointer::read(&path), Err(RegistryError::Corrupt { .. })));
    }
}
