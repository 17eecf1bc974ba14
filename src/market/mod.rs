//! Interfaces into the host marketplace
//!
//! The host owns the item catalog, the handbook, trader data, the canonical
//! price table and the offer board. The engine only reaches them through these
//! traits. Methods take `&self`: the host applies its own synchronization.

mod memory;

pub use memory::{HostDatabase, MemoryMarket, MemoryOfferBoard};

use serde::Deserialize;
use std::collections::HashSet;

/// Item id to price, the shape of the host's canonical price table
pub type PriceTable = std::collections::HashMap<String, f64>;

/// Catalog, handbook, trader and price table access
pub trait Marketplace: Send + Sync {
    /// True if `item_id` is in the host item catalog
    fn is_catalog_item(&self, item_id: &str) -> bool;

    /// Handbook price for `item_id`, if the handbook lists it
    fn handbook_price(&self, item_id: &str) -> Option<f64>;

    /// Highest price any trader pays for `item_id`
    fn highest_trader_buy_price(&self, item_id: &str) -> f64;

    /// Copy of the canonical price table
    fn price_table(&self) -> PriceTable;

    fn price(&self, item_id: &str) -> Option<f64>;

    fn set_price(&self, item_id: &str, price: f64);

    /// Host policy: offers use the trader price when it is higher
    fn use_trader_price_when_higher(&self) -> bool;

    /// Stop the host deriving base market prices from the handbook
    fn disable_handbook_price_generation(&self);
}

/// Who listed an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferOwner {
    Trader,
    Player,
    /// Generated by the host from the price table
    Dynamic,
}

/// Summary of a live market listing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub item_id: String,
    pub owner: OfferOwner,
}

impl Offer {
    pub fn is_trader_offer(&self) -> bool {
        self.owner == OfferOwner::Trader
    }

    pub fn is_player_offer(&self) -> bool {
        self.owner == OfferOwner::Player
    }
}

/// Offer listing maintenance
pub trait OfferBoard: Send + Sync {
    /// Ids of offers the host already considers stale
    fn stale_offer_ids(&self) -> HashSet<String>;

    fn offers(&self) -> Vec<Offer>;

    fn flag_offer_expired(&self, offer_id: &str);

    /// Remove every expired offer. Completes before returning.
    fn remove_expired_offers(&self);

    /// Regenerate dynamic offers from the current price table
    fn generate_dynamic_offers(&self);
}
