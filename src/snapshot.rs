//! On-disk price snapshots and engine config files
//!
//! Everything lives in one config directory:
//! - `config.json`: [`EngineConfig`], rewritten after every successful fetch
//! - `blacklist.json`: JSON array of item ids
//! - `prices-{mode}.json`: last fetched dataset body, byte for byte

use crate::config::{Blacklist, EngineConfig, GameMode};
use crate::error::{PriceError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const BLACKLIST_FILE: &str = "blacklist.json";

/// Minimum time between network fetches, carried across restarts via `nextUpdate`
pub const MIN_FETCH_INTERVAL_SECS: i64 = 3600;

/// Candidate prices keyed by item id
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct PriceDataset {
    prices: HashMap<String, i64>,
}

impl PriceDataset {
    /// Parse a dataset body (`{"<item id>": <price>, ...}`)
    pub fn parse(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn get(&self, item_id: &str) -> Option<i64> {
        self.prices.get(item_id).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Iterate over `(item id, proposed price)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.prices.iter().map(|(id, price)| (id.as_str(), *price))
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for PriceDataset {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().map(|(id, p)| (id.into(), p)).collect(),
        }
    }
}

/// File-backed store for the engine's config directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot for `mode`
    pub fn prices_path(&self, mode: GameMode) -> PathBuf {
        self.dir.join(mode.prices_file_name())
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn blacklist_path(&self) -> PathBuf {
        self.dir.join(BLACKLIST_FILE)
    }

    /// Check if a snapshot exists for `mode`
    pub fn has_prices(&self, mode: GameMode) -> bool {
        self.prices_path(mode).exists()
    }

    /// Load the snapshot for `mode`. `Ok(None)` when there is none on disk.
    pub fn load_prices(&self, mode: GameMode) -> Result<Option<PriceDataset>> {
        let path = self.prices_path(mode);
        let body = match std::fs::read(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let dataset = PriceDataset::parse(&body)?;
        log::debug!(
            "Loaded {} prices from {}",
            dataset.len(),
            path.display()
        );
        Ok(Some(dataset))
    }

    /// Write a fetched body as the snapshot for `mode`
    pub fn save_prices(&self, mode: GameMode, body: &[u8]) -> Result<()> {
        let path = self.prices_path(mode);
        self.write_file(&path, body)?;
        log::debug!("Saved {} snapshot ({} bytes)", mode, body.len());
        Ok(())
    }

    /// Read `config.json`
    pub fn load_config(&self) -> Result<EngineConfig> {
        read_json(&self.config_path())
    }

    /// Push `nextUpdate` one interval past now and write `config.json`
    pub fn save_config(&self, config: &mut EngineConfig) -> Result<()> {
        config.next_update = chrono::Utc::now().timestamp() + MIN_FETCH_INTERVAL_SECS;

        let path = self.config_path();
        let json = serde_json::to_string_pretty(config).map_err(|e| PriceError::Persist {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        self.write_file(&path, json.as_bytes())?;

        log::debug!("Next price fetch allowed at {}", config.next_update);
        Ok(())
    }

    /// Read `blacklist.json`
    pub fn load_blacklist(&self) -> Result<Blacklist> {
        let ids: Vec<String> = read_json(&self.blacklist_path())?;
        Ok(ids.into_iter().collect())
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(path, contents))
            .map_err(|e| PriceError::Persist {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| PriceError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| PriceError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
