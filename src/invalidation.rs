//! Purging dynamic offers after a price refresh

use crate::market::OfferBoard;

/// What an invalidation run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvalidationReport {
    /// Offers that were already stale before this run
    pub already_stale: usize,
    /// Offers this run flagged as expired
    pub expired: usize,
}

/// Expire every generated offer, purge expired offers, then regenerate.
///
/// Trader and player offers are left alone. Removal finishes before
/// regeneration starts so new offers are never swept up by the purge.
pub fn invalidate_offers(board: &dyn OfferBoard) -> InvalidationReport {
    let stale = board.stale_offer_ids();
    let mut expired = 0;

    for offer in board.offers() {
        if offer.is_trader_offer() || offer.is_player_offer() || stale.contains(&offer.id) {
            continue;
        }
        board.flag_offer_expired(&offer.id);
        expired += 1;
    }

    board.remove_expired_offers();
    board.generate_dynamic_offers();

    log::info!(
        "Expired {} market offers ({} already stale) and regenerated dynamic offers",
        expired,
        stale.len()
    );

    InvalidationReport {
        already_stale: stale.len(),
        expired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{Offer, OfferOwner};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every call in order
    #[derive(Default)]
    struct RecordingBoard {
        offers: Vec<Offer>,
        stale: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingBoard {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl OfferBoard for RecordingBoard {
        fn stale_offer_ids(&self) -> HashSet<String> {
            self.stale.clone()
        }

        fn offers(&self) -> Vec<Offer> {
            self.offers.clone()
        }

        fn flag_offer_expired(&self, offer_id: &str) {
            self.calls.lock().unwrap().push(format!("expire {}", offer_id));
        }

        fn remove_expired_offers(&self) {
            self.calls.lock().unwrap().push("remove".to_string());
        }

        fn generate_dynamic_offers(&self) {
            self.calls.lock().unwrap().push("generate".to_string());
        }
    }

    fn offer(id: &str, owner: OfferOwner) -> Offer {
        Offer {
            id: id.to_string(),
            item_id: "ammo".to_string(),
            owner,
        }
    }

    #[test]
    fn only_fresh_dynamic_offers_are_expired() {
        let board = RecordingBoard {
            offers: vec![
                offer("trader-1", OfferOwner::Trader),
                offer("player-1", OfferOwner::Player),
                offer("dyn-1", OfferOwner::Dynamic),
                offer("dyn-2", OfferOwner::Dynamic),
            ],
            stale: HashSet::from(["dyn-2".to_string()]),
            ..Default::default()
        };

        let report = invalidate_offers(&board);

        assert_eq!(
            report,
            InvalidationReport {
                already_stale: 1,
                expired: 1,
            }
        );
        assert_eq!(board.calls(), vec!["expire dyn-1", "remove", "generate"]);
    }

    #[test]
    fn removal_precedes_regeneration_on_empty_board() {
        let board = RecordingBoard::default();
        let report = invalidate_offers(&board);

        assert_eq!(report.expired, 0);
        assert_eq!(board.calls(), vec!["remove", "generate"]);
    }
}
