//! Tests for FsModelRegistry

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use super::*;

const MODEL: &str = "gradient_boosting_model";

fn artifact(version: &str, rmse: f64) -> ModelArtifact {
    ModelArtifact::new(
        MODEL,
        version,
        TrainedMetrics { rmse, r2: 0.7, mae: rmse * 0.8 },
        vec!["age".to_string(), "rm".to_string()],
        format!("payload-{version}").into_bytes(),
    )
    .with_parameter("n_estimators", 100)
}

fn registry(dir: &TempDir) -> FsModelRegistry {
    FsModelRegistry::open(dir.path(), MODEL).unwrap()
}

#[test]
fn test_empty_registry_has_no_current() {
    let dir = TempDir::new().unwrap();
    let reg = registry(&dir);
    assert_eq!(reg.resolve_current().unwrap(), None);
    assert!(matches!(reg.load_current(), Err(RegistryError::NoCurrentModel)));
    assert!(reg.list_versions().unwrap().is_empty());
}

#[test]
fn test_promote_sets_current_and_stores_files() {
    let dir = TempDir::new().unwrap();
    let reg = registry(&dir);
    let a = artifact("20250601_120000", 3.0);

    let pointer = reg.promote(&a).unwrap();
    assert_eq!(pointer.version_id, "20250601_120000");
    assert_eq!(reg.resolve_current().unwrap().unwrap().version_id, "20250601_120000");
    assert!(dir.path().join("gradient_boosting_model_20250601_120000.json").exists());
    assert!(dir.path().join("gradient_boosting_model_20250601_120000.bin").exists());

    let loaded = reg.load_current().unwrap();
    assert_eq!(loaded, a);
}

#[test]
fn test_promote_keeps_previous_artifacts() {
    let dir = TempDir::new().unwrap();
    let reg = registry(&dir);
    reg.promote(&artifact("20250601_120000", 3.0)).unwrap();
    reg.promote(&artifact("20250601_130000", 2.5)).unwrap();

    assert_eq!(reg.resolve_current().unwrap().unwrap().version_id, "20250601_130000");
    assert_eq!(reg.list_versions().unwrap(), vec!["20250601_120000", "20250601_130000"]);
    assert!(reg.load("20250601_120000").is_ok());
}

#[test]
fn test_store_never_overwrites() {
    let dir = TempDir::new().unwrap();
    let reg = registry(&dir);
    reg.store(&artifact("20250601_120000", 3.0)).unwrap();

    let mut other = artifact("20250601_120000", 1.0);
    other.payload = b"different".to_vec();
    other.checksum = checksum(&other.payload);
    assert!(matches!(reg.store(&other), Err(RegistryError::ArtifactExists(_))));
    assert!(matches!(reg.promote(&other), Err(RegistryError::ArtifactExists(_))));
    assert_eq!(reg.resolve_current().unwrap(), None);
}

#[test]
fn test_store_rejects_foreign_model_family() {
    let dir = TempDir::new().unwrap();
    let reg = registry(&dir);
    let foreign = ModelArtifact::new(
        "other_model",
        "20250601_120000",
        TrainedMetrics { rmse: 1.0, r2: 0.5, mae: 0.8 },
        vec![],
        vec![1, 2, 3],
    );
    assert!(reg.store(&foreign).is_err());
}

#[test]
fn test_policy_rejection_leaves_pointer_unchanged() {
    let dir = TempDir::new().unwrap();
    let reg = registry(&dir).with_policy(PromotionPolicy::default().no_regression(0.05));
    reg.promote(&artifact("20250601_120000", 3.0)).unwrap();

    let worse = artifact("20250601_130000", 4.0);
    let err = reg.promote(&worse).unwrap_err();
    assert!(matches!(err, RegistryError::PolicyRejected(_)));

    assert_eq!(reg.resolve_current().unwrap().unwrap().version_id, "20250601_120000");
    // the rejected artifact is still stored for audit
    assert!(reg.load("20250601_130000").is_ok());
}

#[test]
fn test_promote_version_rolls_back() {
    let dir = TempDir::new().unwrap();
    let reg = registry(&dir);
    reg.promote(&artifact("20250601_120000", 3.0)).unwrap();
    reg.promote(&artifact("20250601_130000", 2.5)).unwrap();

    reg.promote_version("20250601_120000").unwrap();
    assert_eq!(reg.resolve_current().unwrap().unwrap().version_id, "20250601_120000");

    let history = reg.history().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].reason, PromotionReason::Rollback);
    assert_eq!(history[2].previous.as_deref(), Some("20250601_130000"));
}

#[test]
fn test_promote_version_unknown() {
    let dir = TempDir::new().unwrap();
    let reg = registry(&dir);
    assert!(matches!(
        reg.promote_version("20250601_120000"),
        Err(RegistryError::VersionNotFound(_))
    ));
    assert!(matches!(reg.promote_version("../../x"), Err(RegistryError::InvalidVersion(_))));
}

#[test]
fn test_tampered_payload_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let reg = registry(&dir);
    reg.promote(&artifact("20250601_120000", 3.0)).unwrap();
    std::fs::write(dir.path().join("gradient_boosting_model_20250601_120000.bin"), b"evil").unwrap();

    assert!(matches!(reg.load_current(), Err(RegistryError::Corrupt { .. })));
}

#[test]
fn test_latest_version() {
    let dir = TempDir::new().unwrap();
    let reg = registry(&dir);
    assert_eq!(reg.latest_version().unwrap(), None);
    reg.store(&artifact("20250601_120000", 3.0)).unwrap();
    reg.store(&artifact("20250601_120000_01", 3.0)).unwrap();
    assert_eq!(reg.latest_version().unwrap().as_deref(), Some("20250601_120000_01"));
}

#[test]
fn test_concurrent_readers_see_old_or_new() {
    let dir = TempDir::new().unwrap();
    let reg = Arc::new(registry(&dir));
    let old = "20250601_120000";
    reg.promote(&artifact(old, 3.0)).unwrap();

    let versions: Vec<String> = (1..=20).map(|i| format!("20250601_12{i:02}00")).collect();
    for v in &versions {
        reg.store(&artifact(v, 3.0)).unwrap();
    }

    let done = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let reg = Arc::clone(&reg);
            let done = Arc::clone(&done);
            let mut allowed = versions.clone();
            allowed.push(old.to_string());
            thread::spawn(move || {
                let mut reads = 0usize;
                while !done.load(Ordering::SeqCst) || reads == 0 {
                    let pointer = reg.resolve_current().unwrap().unwrap();
                    assert!(allowed.contains(&pointer.version_id));
                    reads += 1;
                }
            })
        })
        .collect();

    for v in &versions {
        reg.promote_version(v).unwrap();
    }
    done.store(true, Ordering::SeqCst);
    for r in readers {
        r.join().unwrap();
    }

    assert_eq!(reg.resolve_current().unwrap().unwrap().version_id, "20250601_122000");
}
