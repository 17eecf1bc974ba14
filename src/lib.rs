//! Live Prices - remote price dataset reconciliation
//!
//! Keeps a host marketplace's price table in line with a remotely published
//! price dataset. Proposed prices are bounded by a baseline captured at
//! startup, blacklisted items are left alone, and the table is refreshed on a
//! schedule without restarting the host.

pub mod config;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod invalidation;
pub mod market;
pub mod reconciler;
pub mod scheduler;
pub mod snapshot;

pub use config::{Blacklist, EngineConfig, GameMode};
pub use engine::{DataSource, EngineState, FetchPolicy, PassReport, PriceEngine};
pub use error::{PriceError, Result};
pub use fetcher::PriceFetcher;
pub use market::{Marketplace, OfferBoard};
pub use reconciler::{reconcile, BaselinePrices, ReconcileSummary};
pub use scheduler::{Scheduler, SchedulerHandle, REFRESH_INTERVAL};
pub use snapshot::{PriceDataset, SnapshotStore};
