//! Price engine: owns config, blacklist and baseline, runs reconciliation passes
//!
//! A pass is: get a candidate dataset (network, falling back to the on-disk
//! snapshot), reconcile it into the host price table, and optionally purge
//! and regenerate market offers. Only one pass runs at a time.

use crate::config::{Blacklist, EngineConfig, GameMode};
use crate::error::{PriceError, Result};
use crate::fetcher::PriceFetcher;
use crate::invalidation::{invalidate_offers, InvalidationReport};
use crate::market::{Marketplace, OfferBoard};
use crate::reconciler::{reconcile, BaselinePrices, ReconcileSummary};
use crate::snapshot::{PriceDataset, SnapshotStore};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Long-lived engine state, threaded through every pass
#[derive(Debug, Clone)]
pub struct EngineState {
    pub config: EngineConfig,
    pub blacklist: Blacklist,
    pub baseline: BaselinePrices,
}

/// Where a pass got its candidate prices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Network,
    Snapshot,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Network => f.write_str("network"),
            DataSource::Snapshot => f.write_str("snapshot"),
        }
    }
}

/// When a pass goes to the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Only if fetching is enabled and `nextUpdate` has passed
    IfDue,
    Always,
}

/// Result of one reconciliation pass
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub mode: GameMode,
    pub source: DataSource,
    pub summary: ReconcileSummary,
    /// Set only on passes that refreshed market offers
    pub invalidation: Option<InvalidationReport>,
}

pub struct PriceEngine {
    state: Mutex<EngineState>,
    store: SnapshotStore,
    fetcher: PriceFetcher,
    market: Arc<dyn Marketplace>,
    offers: Arc<dyn OfferBoard>,
}

impl PriceEngine {
    /// Load `config.json` and `blacklist.json`, take over pricing from the host
    /// and capture the baseline.
    ///
    /// A `ConfigLoad` error here means the engine must stay off.
    pub fn load(
        store: SnapshotStore,
        fetcher: PriceFetcher,
        market: Arc<dyn Marketplace>,
        offers: Arc<dyn OfferBoard>,
    ) -> Result<Self> {
        let config = store.load_config()?;
        let blacklist = store.load_blacklist()?;
        log::info!(
            "Loaded config from {} ({} blacklisted items)",
            store.dir().display(),
            blacklist.len()
        );

        market.disable_handbook_price_generation();
        let baseline = BaselinePrices::capture(market.as_ref());
        log::debug!("Captured {} baseline prices", baseline.len());

        let state = EngineState {
            config,
            blacklist,
            baseline,
        };
        Ok(Self::from_state(state, store, fetcher, market, offers))
    }

    pub fn from_state(
        state: EngineState,
        store: SnapshotStore,
        fetcher: PriceFetcher,
        market: Arc<dyn Marketplace>,
        offers: Arc<dyn OfferBoard>,
    ) -> Self {
        Self {
            state: Mutex::new(state),
            store,
            fetcher,
            market,
            offers,
        }
    }

    /// Current config. Waits for a running pass to finish.
    pub async fn config(&self) -> EngineConfig {
        self.state.lock().await.config.clone()
    }

    /// Startup pass: hit the network only if fetching is on and `nextUpdate`
    /// has passed, otherwise use the snapshot. Offers are left alone.
    pub async fn startup(&self) -> Result<PassReport> {
        self.run_pass(FetchPolicy::IfDue, false).await
    }

    /// Periodic pass: always fetch, then refresh market offers
    pub async fn refresh(&self) -> Result<PassReport> {
        self.run_pass(FetchPolicy::Always, true).await
    }

    /// One reconciliation pass. Fails fast with `PassInProgress` if another
    /// pass holds the engine. The guard is held from the fetch decision to
    /// the last write.
    pub async fn run_pass(&self, policy: FetchPolicy, invalidate: bool) -> Result<PassReport> {
        let mut guard = self
            .state
            .try_lock()
            .map_err(|_| PriceError::PassInProgress)?;
        let state = &mut *guard;
        let mode = state.config.game_mode();
        let fetch = match policy {
            FetchPolicy::Always => true,
            FetchPolicy::IfDue => state.config.fetch_due(chrono::Utc::now().timestamp()),
        };

        let (candidate, source) = self.candidate_prices(&mut state.config, mode, fetch).await?;

        let summary = reconcile(
            &candidate,
            &mut state.baseline,
            &state.blacklist,
            &state.config,
            self.market.as_ref(),
        );
        log::info!(
            "Updated {} {} prices from {} ({} capped, {} raised to trader price, {} unknown, {} blacklisted)",
            summary.updated,
            mode,
            source,
            summary.capped,
            summary.trader_adjusted,
            summary.unknown,
            summary.blacklisted
        );

        let invalidation = invalidate.then(|| invalidate_offers(self.offers.as_ref()));

        Ok(PassReport {
            mode,
            source,
            summary,
            invalidation,
        })
    }

    async fn candidate_prices(
        &self,
        config: &mut EngineConfig,
        mode: GameMode,
        fetch: bool,
    ) -> Result<(PriceDataset, DataSource)> {
        if !fetch && self.store.has_prices(mode) {
            let dataset = self
                .store
                .load_prices(mode)?
                .ok_or(PriceError::NoPriceData { mode })?;
            return Ok((dataset, DataSource::Snapshot));
        }

        match self.fetch_and_persist(config, mode).await {
            Ok(dataset) => Ok((dataset, DataSource::Network)),
            Err(e) => {
                log::error!("Error fetching or parsing {} prices: {}", mode, e);
                log::error!(
                    "This is unlikely to be a price source problem, and more likely a system configuration issue"
                );

                match self.store.load_prices(mode)? {
                    Some(dataset) => {
                        log::info!("Falling back to existing prices file");
                        Ok((dataset, DataSource::Snapshot))
                    }
                    None => {
                        log::error!(
                            "Unable to fetch prices and no local prices file, skipping price update"
                        );
                        Err(PriceError::NoPriceData { mode })
                    }
                }
            }
        }
    }

    /// Fetch and parse, then store the body and push `nextUpdate` forward.
    /// Write failures are logged and do not fail the fetch.
    async fn fetch_and_persist(
        &self,
        config: &mut EngineConfig,
        mode: GameMode,
    ) -> Result<PriceDataset> {
        let body = self.fetcher.fetch(mode).await?;
        let dataset = PriceDataset::parse(&body)?;
        log::info!("Fetched {} {} prices", dataset.len(), mode);

        if let Err(e) = self.store.save_prices(mode, &body) {
            log::error!("Failed to save price snapshot: {}", e);
        }
        if let Err(e) = self.store.save_config(config) {
            log::error!("Failed to save config: {}", e);
        }

        Ok(dataset)
    }
}
