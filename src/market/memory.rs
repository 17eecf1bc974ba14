//! In-memory host used by the CLI and by tests
//!
//! Loaded from a single host database JSON file. Tables are guarded by
//! `RwLock`s so the periodic task and readers can share them.

use super::{Marketplace, Offer, OfferBoard, OfferOwner, PriceTable};
use crate::error::Result;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Host database file structure
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostDatabase {
    pub items: Vec<String>,
    pub handbook: HashMap<String, f64>,
    pub prices: PriceTable,
    pub trader_buy_prices: HashMap<String, f64>,
    pub use_trader_price_when_higher: bool,
    /// Trader and player offers already on the board
    pub offers: Vec<Offer>,
}

impl HostDatabase {
    /// Load a host database from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading host database from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let db: HostDatabase = serde_json::from_str(&content)?;
        log::info!(
            "Loaded {} items, {} prices, {} offers",
            db.items.len(),
            db.prices.len(),
            db.offers.len()
        );
        Ok(db)
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Catalog, handbook and price table held in memory
#[derive(Debug, Default)]
pub struct MemoryMarket {
    catalog: HashSet<String>,
    handbook: HashMap<String, f64>,
    trader_buy_prices: HashMap<String, f64>,
    prices: RwLock<PriceTable>,
    use_trader_price_when_higher: bool,
    handbook_price_generation: AtomicBool,
}

impl MemoryMarket {
    pub fn new(
        items: impl IntoIterator<Item = String>,
        handbook: HashMap<String, f64>,
        prices: PriceTable,
    ) -> Self {
        Self {
            catalog: items.into_iter().collect(),
            handbook,
            prices: RwLock::new(prices),
            handbook_price_generation: AtomicBool::new(true),
            ..Default::default()
        }
    }

    /// Builder-style trader buy prices
    pub fn with_trader_prices(
        mut self,
        trader_buy_prices: HashMap<String, f64>,
        use_trader_price_when_higher: bool,
    ) -> Self {
        self.trader_buy_prices = trader_buy_prices;
        self.use_trader_price_when_higher = use_trader_price_when_higher;
        self
    }

    /// Split a host database into a market and its offer board
    pub fn from_database(db: HostDatabase) -> (Arc<Self>, Arc<MemoryOfferBoard>) {
        let market = Arc::new(
            Self::new(db.items, db.handbook, db.prices)
                .with_trader_prices(db.trader_buy_prices, db.use_trader_price_when_higher),
        );
        let board = Arc::new(MemoryOfferBoard::new(Arc::clone(&market), db.offers));
        (market, board)
    }

    pub fn handbook_price_generation_enabled(&self) -> bool {
        self.handbook_price_generation.load(Ordering::SeqCst)
    }

    /// Write the price table as pretty JSON
    pub fn write_prices(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&*read(&self.prices))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Marketplace for MemoryMarket {
    fn is_catalog_item(&self, item_id: &str) -> bool {
        self.catalog.contains(item_id)
    }

    fn handbook_price(&self, item_id: &str) -> Option<f64> {
        self.handbook.get(item_id).copied()
    }

    fn highest_trader_buy_price(&self, item_id: &str) -> f64 {
        self.trader_buy_prices.get(item_id).copied().unwrap_or(0.0)
    }

    fn price_table(&self) -> PriceTable {
        read(&self.prices).clone()
    }

    fn price(&self, item_id: &str) -> Option<f64> {
        read(&self.prices).get(item_id).copied()
    }

    fn set_price(&self, item_id: &str, price: f64) {
        write(&self.prices).insert(item_id.to_string(), price);
    }

    fn use_trader_price_when_higher(&self) -> bool {
        self.use_trader_price_when_higher
    }

    fn disable_handbook_price_generation(&self) {
        self.handbook_price_generation.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
struct Listing {
    offer: Offer,
    price: f64,
    expired: bool,
}

/// Offer board over a [`MemoryMarket`]
#[derive(Debug)]
pub struct MemoryOfferBoard {
    market: Arc<MemoryMarket>,
    listings: RwLock<Vec<Listing>>,
    next_id: AtomicU64,
}

impl MemoryOfferBoard {
    pub fn new(market: Arc<MemoryMarket>, offers: Vec<Offer>) -> Self {
        let listings = offers
            .into_iter()
            .map(|offer| {
                let price = market.price(&offer.item_id).unwrap_or(0.0);
                Listing {
                    offer,
                    price,
                    expired: false,
                }
            })
            .collect();

        Self {
            market,
            listings: RwLock::new(listings),
            next_id: AtomicU64::new(1),
        }
    }

    /// Listed price of an offer
    pub fn offer_price(&self, offer_id: &str) -> Option<f64> {
        read(&self.listings)
            .iter()
            .find(|l| l.offer.id == offer_id)
            .map(|l| l.price)
    }

    /// Listed price of the dynamic offer for an item
    pub fn dynamic_price(&self, item_id: &str) -> Option<f64> {
        read(&self.listings)
            .iter()
            .find(|l| l.offer.owner == OfferOwner::Dynamic && l.offer.item_id == item_id)
            .map(|l| l.price)
    }

    pub fn len(&self) -> usize {
        read(&self.listings).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.listings).is_empty()
    }
}

impl OfferBoard for MemoryOfferBoard {
    fn stale_offer_ids(&self) -> HashSet<String> {
        read(&self.listings)
            .iter()
            .filter(|l| l.expired)
            .map(|l| l.offer.id.clone())
            .collect()
    }

    fn offers(&self) -> Vec<Offer> {
        read(&self.listings).iter().map(|l| l.offer.clone()).collect()
    }

    fn flag_offer_expired(&self, offer_id: &str) {
        if let Some(listing) = write(&self.listings)
            .iter_mut()
            .find(|l| l.offer.id == offer_id)
        {
            listing.expired = true;
        }
    }

    fn remove_expired_offers(&self) {
        let mut listings = write(&self.listings);
        let before = listings.len();
        listings.retain(|l| !l.expired);
        log::debug!("Removed {} expired offers", before - listings.len());
    }

    fn generate_dynamic_offers(&self) {
        let prices = self.market.price_table();
        let mut listings = write(&self.listings);
        let listed: HashSet<String> = listings
            .iter()
            .filter(|l| l.offer.owner == OfferOwner::Dynamic)
            .map(|l| l.offer.item_id.clone())
            .collect();

        let mut generated = 0;
        for (item_id, price) in prices {
            if listed.contains(&item_id) || !self.market.is_catalog_item(&item_id) {
                continue;
            }
            let id = format!("dyn-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            listings.push(Listing {
                offer: Offer {
                    id,
                    item_id,
                    owner: OfferOwner::Dynamic,
                },
                price,
                expired: false,
            });
            generated += 1;
        }
        log::debug!("Generated {} dynamic offers", generated);
    }
}
