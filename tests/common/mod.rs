//! Shared fixtures for engine and scheduler tests

#![allow(dead_code)]

use live_prices::market::{HostDatabase, MemoryMarket, MemoryOfferBoard};
use live_prices::{PriceEngine, PriceFetcher, SnapshotStore};
use std::path::Path;
use std::sync::Arc;

/// Host with three catalog items, a trader offer and a player offer
pub fn host() -> (Arc<MemoryMarket>, Arc<MemoryOfferBoard>) {
    let db: HostDatabase = serde_json::from_value(serde_json::json!({
        "items": ["ammo", "armor", "keycard"],
        "handbook": { "ammo": 90, "armor": 1800, "keycard": 40 },
        "prices": { "ammo": 100, "armor": 2000, "keycard": 50 },
        "traderBuyPrices": { "ammo": 20 },
        "useTraderPriceWhenHigher": true,
        "offers": [
            { "id": "trader-1", "itemId": "ammo", "owner": "trader" },
            { "id": "player-1", "itemId": "armor", "owner": "player" }
        ]
    }))
    .unwrap();
    MemoryMarket::from_database(db)
}

pub fn write_config(dir: &Path, config: serde_json::Value) {
    std::fs::write(dir.join("config.json"), config.to_string()).unwrap();
}

pub fn write_blacklist(dir: &Path, ids: &[&str]) {
    std::fs::write(
        dir.join("blacklist.json"),
        serde_json::to_string(ids).unwrap(),
    )
    .unwrap();
}

pub fn write_snapshot(dir: &Path, mode: &str, body: &str) {
    std::fs::write(dir.join(format!("prices-{}.json", mode)), body).unwrap();
}

/// Config that fetches on startup with a 3x limiter
pub fn due_config() -> serde_json::Value {
    serde_json::json!({
        "nextUpdate": 0,
        "maxIncreaseMult": 3,
        "maxLimiter": true,
        "pvePrices": false,
        "disablePriceFetching": false,
        "debug": true
    })
}

/// Same config with `nextUpdate` an hour in the future
pub fn not_due_config() -> serde_json::Value {
    let mut config = due_config();
    config["nextUpdate"] = serde_json::json!(chrono::Utc::now().timestamp() + 3600);
    config
}

pub fn engine(
    dir: &Path,
    base_url: &str,
    retries: u32,
    market: &Arc<MemoryMarket>,
    board: &Arc<MemoryOfferBoard>,
) -> PriceEngine {
    PriceEngine::load(
        SnapshotStore::new(dir),
        PriceFetcher::new(base_url, retries),
        market.clone(),
        board.clone(),
    )
    .unwrap()
}
