//! Live Prices - runs the price engine against a host database file
//!
//! Loads the host tables into memory, runs the startup price update, then
//! refreshes on a fixed interval until Ctrl-C. The final price table can be
//! written out for inspection.

use clap::Parser;
use live_prices::fetcher::{DEFAULT_DATASET_URL, DEFAULT_RETRIES};
use live_prices::market::{HostDatabase, MemoryMarket};
use live_prices::{OfferBoard, PriceEngine, PriceFetcher, Scheduler, SnapshotStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Live marketplace prices - fetches a price dataset and reconciles it into the host price table
#[derive(Parser, Debug)]
#[command(name = "live_prices")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding config.json, blacklist.json and price snapshots
    #[arg(short, long, default_value_t = default_config_dir())]
    config_dir: String,

    /// Host database JSON (items, handbook, prices, trader prices, offers)
    #[arg(short, long)]
    database: PathBuf,

    /// Write the live price table here on exit
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base URL the prices-{mode}.json datasets are served from
    #[arg(long, default_value = DEFAULT_DATASET_URL)]
    dataset_url: String,

    /// Retries after the first failed download
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    retries: u32,

    /// Refresh interval in minutes
    #[arg(long, default_value_t = 60)]
    refresh_minutes: u64,

    /// Run the startup update only and exit
    #[arg(long, default_value_t = false)]
    once: bool,
}

/// Returns the default config directory: ~/.config/live_prices
fn default_config_dir() -> String {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("live_prices")
        .to_string_lossy()
        .to_string()
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting live_prices...");
    log::info!("Config directory: {}", args.config_dir);

    let db = match HostDatabase::load(&args.database) {
        Ok(db) => db,
        Err(e) => {
            log::error!("Failed to load host database: {}", e);
            std::process::exit(1);
        }
    };
    let (market, board) = MemoryMarket::from_database(db);

    let engine = match PriceEngine::load(
        SnapshotStore::new(&args.config_dir),
        PriceFetcher::new(args.dataset_url, args.retries),
        market.clone(),
        board.clone(),
    ) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            log::error!("Error loading price engine config data, live prices disabled: {}", e);
            board.generate_dynamic_offers();
            finish(&market, args.output.as_deref());
            return;
        }
    };

    if args.once {
        if let Err(e) = engine.startup().await {
            log::error!("Startup price update failed: {}", e);
        }
        board.generate_dynamic_offers();
        finish(&market, args.output.as_deref());
        return;
    }

    let interval = refresh_interval(args.refresh_minutes);
    let handle = match Scheduler::new(engine, interval).start().await {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("Startup price update failed, live prices disabled: {}", e);
            None
        }
    };

    // Host generates its offers once prices are in place
    board.generate_dynamic_offers();
    log::info!("{} offers on the market", board.len());

    let Some(handle) = handle else {
        finish(&market, args.output.as_deref());
        return;
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
    }
    log::info!("Shutting down...");
    handle.shutdown().await;

    finish(&market, args.output.as_deref());
}

/// Refresh interval from minutes, at least one minute
fn refresh_interval(minutes: u64) -> Duration {
    Duration::from_secs(minutes.max(1).saturating_mul(60))
}

fn finish(market: &MemoryMarket, output: Option<&Path>) {
    let Some(path) = output else {
        return;
    };
    match market.write_prices(path) {
        Ok(()) => log::info!("Wrote price table to {}", path.display()),
        Err(e) => log::error!("Failed to write price table: {}", e),
    }
}
