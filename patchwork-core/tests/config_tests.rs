//! Config error-message, failed-save cleanup, and load-order binding tests.

use patchwork_core::{
    config, ListingEntry, LoadOrder, MemoryStore, PatchworkConfig, Provider, ProviderKey, Record,
    RecordId, RecordStore, StoreError,
};
use std::fs;

#[derive(Debug, Clone, PartialEq)]
struct Quest {
    id: RecordId,
    stage: u16,
}

impl Record for Quest {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

fn sample() -> PatchworkConfig {
    PatchworkConfig {
        output: ProviderKey::from("Patch.esp"),
        load_order: vec![
            ListingEntry { key: ProviderKey::from("Skyrim.esm"), enabled: true },
            ListingEntry { key: ProviderKey::from("Update.esm"), enabled: true },
            ListingEntry { key: ProviderKey::from("Experimental.esp"), enabled: false },
        ],
    }
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_config_returns_not_found() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join("patchwork.yaml");
    let err = config::load_at(&path).unwrap_err();
    assert!(matches!(err, StoreError::ConfigNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("config not found"));
    assert!(err.to_string().contains("patchwork.yaml"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join("patchwork.yaml");
    fs::write(&path, b": : corrupt : yaml : !!!\n  - broken: [unclosed").expect("write");

    let err = config::load_at(&path).unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("patchwork.yaml"), "must contain file path, got: {msg}");
}

#[test]
fn load_without_output_returns_parse_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join("patchwork.yaml");
    fs::write(&path, b"load_order:\n  - key: Skyrim.esm\n").expect("write");

    let err = config::load_at(&path).unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Save / load
// ---------------------------------------------------------------------------

#[test]
fn save_then_load_preserves_order_and_flags() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join("nested").join("patchwork.yaml");
    config::save_at(&path, &sample()).expect("save");

    let loaded = config::load_at(&path).expect("load");
    assert_eq!(loaded, sample());
}

#[test]
fn failed_rename_removes_tmp_and_reports_target_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    // A directory squatting on the config path makes the final rename fail.
    let path = dir.path().join("patchwork.yaml");
    fs::create_dir(&path).expect("mkdir");
    fs::write(path.join("keep"), b"occupied").expect("write");

    let err = config::save_at(&path, &sample()).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }), "got: {err}");
    assert!(err.to_string().contains("patchwork.yaml"), "got: {err}");
    assert!(!path.with_extension("yaml.tmp").exists());
    assert!(path.join("keep").exists());
    assert!(matches!(config::load_at(&path), Err(StoreError::Io { .. })));
}

// ---------------------------------------------------------------------------
// 3. Config → store
// ---------------------------------------------------------------------------

#[test]
fn configured_load_order_drives_resolution() {
    let config = sample();
    let load_order = LoadOrder::from_config(&config, |key| {
        let stage = match key.name() {
            "Skyrim.esm" => 10,
            "Update.esm" => 20,
            "Experimental.esp" => 99,
            _ => return None,
        };
        let mut provider = Provider::new(key.clone());
        provider.insert(Quest { id: RecordId::from("MQ101"), stage });
        Some(provider)
    });
    let store = MemoryStore::new(load_order, config.output.clone());

    let winning = store.resolve(&RecordId::from("MQ101")).expect("resolve");
    assert_eq!(winning.provider, ProviderKey::from("Update.esm"));
    assert_eq!(winning.record.stage, 20);
}
