//! Engine configuration, price mode and item blacklist

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Persisted engine configuration (`config.json`)
///
/// Field names on disk are kept stable so existing config files keep working.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Unix seconds before which startup will not hit the network
    #[serde(rename = "nextUpdate")]
    pub next_update: i64,
    #[serde(rename = "maxIncreaseMult")]
    pub max_increase_mult: i64,
    #[serde(rename = "maxLimiter")]
    pub max_limiter: bool,
    #[serde(rename = "pvePrices")]
    pub pve_prices: bool,
    #[serde(rename = "disablePriceFetching")]
    pub disable_price_fetching: bool,
    pub debug: bool,
}

impl EngineConfig {
    /// Which dataset variant this config selects
    pub fn game_mode(&self) -> GameMode {
        if self.pve_prices {
            GameMode::Pve
        } else {
            GameMode::Regular
        }
    }

    /// True when startup should go to the network rather than the snapshot
    pub fn fetch_due(&self, now: i64) -> bool {
        !self.disable_price_fetching && now > self.next_update
    }
}

/// Marketplace variant, each with its own dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    Regular,
    Pve,
}

impl GameMode {
    /// Tag used in dataset URLs and snapshot file names
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Regular => "regular",
            GameMode::Pve => "pve",
        }
    }

    /// `prices-{mode}.json`
    pub fn prices_file_name(&self) -> String {
        format!("prices-{}.json", self.as_str())
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Items the engine never writes to the live price table
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    items: HashSet<String>,
}

impl Blacklist {
    pub fn contains(&self, item_id: &str) -> bool {
        self.items.contains(item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Blacklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}
