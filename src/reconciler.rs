//! Merges a candidate price dataset into the live price table
//!
//! Each candidate entry is handled on its own:
//! 1. skip ids missing from the host catalog
//! 2. skip blacklisted ids
//! 3. resolve the baseline price, back-filling from the handbook
//! 4. clamp to `baseline * maxIncreaseMult` when the limiter is on
//! 5. write the live price
//! 6. raise it above the best trader buy price when the host asks for that
//!
//! Entries are independent, so iteration order does not matter.

use crate::config::{Blacklist, EngineConfig};
use crate::market::{Marketplace, PriceTable};
use crate::snapshot::PriceDataset;
use std::collections::HashMap;

/// Markup over the best trader buy price when the trader price wins
pub const TRADER_FLOOR_MARKUP: f64 = 1.1;

/// Trusted reference prices, captured before the engine writes anything
#[derive(Debug, Clone, Default)]
pub struct BaselinePrices {
    prices: HashMap<String, f64>,
}

impl BaselinePrices {
    /// Copy the host's price table as it is right now
    pub fn capture(market: &dyn Marketplace) -> Self {
        Self::from_table(market.price_table())
    }

    pub fn from_table(prices: PriceTable) -> Self {
        Self { prices }
    }

    pub fn get(&self, item_id: &str) -> Option<f64> {
        self.prices.get(item_id).copied()
    }

    /// Baseline for `item_id`. Missing entries are filled from the handbook
    /// (0 when the handbook has none) and remembered.
    pub fn resolve(&mut self, item_id: &str, market: &dyn Marketplace) -> f64 {
        *self
            .prices
            .entry(item_id.to_string())
            .or_insert_with(|| market.handbook_price(item_id).unwrap_or(0.0))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Counts from one reconcile call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Live prices written
    pub updated: usize,
    /// Of those, clamped to the inflation cap
    pub capped: usize,
    /// Of those, raised to the trader floor
    pub trader_adjusted: usize,
    /// Ids not in the host catalog
    pub unknown: usize,
    pub blacklisted: usize,
}

/// Price accepted for a proposal against a baseline.
///
/// A zero cap means there is no reference price, so the proposal stands.
pub fn capped_price(proposed: f64, base_price: f64, config: &EngineConfig) -> f64 {
    let cap = base_price * config.max_increase_mult as f64;
    if cap == 0.0 || !config.max_limiter || proposed <= cap {
        proposed
    } else {
        cap
    }
}

/// Apply `candidate` to the host's live price table
pub fn reconcile(
    candidate: &PriceDataset,
    baseline: &mut BaselinePrices,
    blacklist: &Blacklist,
    config: &EngineConfig,
    market: &dyn Marketplace,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();
    let trader_floor = market.use_trader_price_when_higher();

    for (item_id, proposed) in candidate.iter() {
        if !market.is_catalog_item(item_id) {
            summary.unknown += 1;
            continue;
        }

        if blacklist.contains(item_id) {
            if config.debug {
                log::debug!("Item {} was skipped due to it being blacklisted", item_id);
            }
            summary.blacklisted += 1;
            continue;
        }

        let base_price = baseline.resolve(item_id, market);
        let proposed = proposed as f64;
        let mut price = capped_price(proposed, base_price, config);
        if price < proposed {
            if config.debug {
                log::debug!(
                    "Setting {} to {} instead of {} due to over inflation",
                    item_id,
                    price,
                    proposed
                );
            }
            summary.capped += 1;
        }

        if trader_floor {
            let trader_price = market.highest_trader_buy_price(item_id);
            if trader_price > price {
                let floored = (trader_price * TRADER_FLOOR_MARKUP).floor();
                if config.debug {
                    log::debug!(
                        "Setting {} to {} instead of {} due to trader price",
                        item_id,
                        floored,
                        price
                    );
                }
                price = floored;
                summary.trader_adjusted += 1;
            }
        }

        market.set_price(item_id, price);
        summary.updated += 1;
    }

    summary
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
