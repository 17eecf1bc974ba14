//! Tests for the snapshot store

use crate::config::{EngineConfig, GameMode};
use crate::error::PriceError;
use crate::snapshot::{PriceDataset, SnapshotStore, MIN_FETCH_INTERVAL_SECS};
use tempfile::TempDir;

// ── PriceDataset ─────────────────────────────────────────────────────

#[test]
fn dataset_parses_id_to_price_map() {
    let body = br#"{"5449016a4bdc2d6f028b456f": 1, "59faff1d86f7746c51718c9c": 412000}"#;
    let dataset = PriceDataset::parse(body).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.get("59faff1d86f7746c51718c9c"), Some(412_000));
    assert_eq!(dataset.get("missing"), None);
}

#[test]
fn dataset_rejects_non_integer_prices() {
    assert!(PriceDataset::parse(br#"{"abc": "cheap"}"#).is_err());
    assert!(PriceDataset::parse(b"<html>rate limited</html>").is_err());
}

// ── price snapshots ──────────────────────────────────────────────────

#[test]
fn missing_snapshot_loads_as_none() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp_dir.path());

    assert!(!store.has_prices(GameMode::Regular));
    assert!(store.load_prices(GameMode::Regular).unwrap().is_none());
}

#[test]
fn saved_snapshot_is_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp_dir.path());
    let body = br#"{ "abc" : 150,
  "def": 20 }"#;

    store.save_prices(GameMode::Regular, body).unwrap();

    let on_disk = std::fs::read(temp_dir.path().join("prices-regular.json")).unwrap();
    assert_eq!(on_disk, body.to_vec());

    let dataset = store.load_prices(GameMode::Regular).unwrap().unwrap();
    assert_eq!(dataset.get("abc"), Some(150));
}

#[test]
fn modes_are_stored_separately() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp_dir.path());

    store.save_prices(GameMode::Regular, br#"{"abc": 1}"#).unwrap();
    store.save_prices(GameMode::Pve, br#"{"abc": 2}"#).unwrap();

    let regular = store.load_prices(GameMode::Regular).unwrap().unwrap();
    let pve = store.load_prices(GameMode::Pve).unwrap().unwrap();
    assert_eq!(regular.get("abc"), Some(1));
    assert_eq!(pve.get("abc"), Some(2));
}

#[test]
fn save_creates_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp_dir.path().join("nested").join("config"));

    store.save_prices(GameMode::Pve, b"{}").unwrap();
    assert!(store.has_prices(GameMode::Pve));
}

#[test]
fn unwritable_snapshot_is_a_persist_error() {
    let temp_dir = TempDir::new().unwrap();
    // A file where the directory should be
    let blocker = temp_dir.path().join("config");
    std::fs::write(&blocker, b"not a dir").unwrap();
    let store = SnapshotStore::new(&blocker);

    match store.save_prices(GameMode::Regular, b"{}") {
        Err(PriceError::Persist { .. }) => {}
        other => panic!("Expected PriceError::Persist, got: {other:?}"),
    }
}

// ── config.json ──────────────────────────────────────────────────────

#[test]
fn save_config_pushes_next_update_an_hour_out() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp_dir.path());
    let mut config = EngineConfig {
        max_increase_mult: 4,
        max_limiter: true,
        ..Default::default()
    };

    let before = chrono::Utc::now().timestamp();
    store.save_config(&mut config).unwrap();
    let after = chrono::Utc::now().timestamp();

    assert!(config.next_update >= before + MIN_FETCH_INTERVAL_SECS);
    assert!(config.next_update <= after + MIN_FETCH_INTERVAL_SECS);

    let reloaded = store.load_config().unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn missing_config_is_a_config_load_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp_dir.path());

    match store.load_config() {
        Err(PriceError::ConfigLoad { path, .. }) => assert!(path.ends_with("config.json")),
        other => panic!("Expected PriceError::ConfigLoad, got: {other:?}"),
    }
}

// ── blacklist.json ───────────────────────────────────────────────────

#[test]
fn blacklist_loads_from_array() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("blacklist.json"),
        r#"["5449016a4bdc2d6f028b456f", "59faff1d86f7746c51718c9c"]"#,
    )
    .unwrap();
    let store = SnapshotStore::new(temp_dir.path());

    let blacklist = store.load_blacklist().unwrap();
    assert_eq!(blacklist.len(), 2);
    assert!(blacklist.contains("5449016a4bdc2d6f028b456f"));
}

#[test]
fn malformed_blacklist_is_a_config_load_error() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("blacklist.json"), r#"{"not": "a list"}"#).unwrap();
    let store = SnapshotStore::new(temp_dir.path());

    assert!(matches!(
        store.load_blacklist(),
        Err(PriceError::ConfigLoad { .. })
    ));
}
