//! Remote price dataset download with bounded retries

use crate::config::GameMode;
use crate::error::{PriceError, Result};
use std::time::Duration;

/// Public price database the datasets are published to
pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/DrakiaXYZ/SPT-LiveFleaPriceDB/main";

/// Retries after the first attempt
pub const DEFAULT_RETRIES: u32 = 5;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads `prices-{mode}.json` from a dataset host
#[derive(Debug, Clone)]
pub struct PriceFetcher {
    base_url: String,
    retries: u32,
}

impl PriceFetcher {
    pub fn new(base_url: impl Into<String>, retries: u32) -> Self {
        Self {
            base_url: base_url.into(),
            retries,
        }
    }

    /// Full dataset URL for a mode
    pub fn dataset_url(&self, mode: GameMode) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            mode.prices_file_name()
        )
    }

    /// Fetch the raw dataset body for `mode`
    pub async fn fetch(&self, mode: GameMode) -> Result<Vec<u8>> {
        log::info!("Fetching {} prices...", mode);
        get_with_retries(&self.dataset_url(mode), self.retries).await
    }
}

impl Default for PriceFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_DATASET_URL, DEFAULT_RETRIES)
    }
}

/// GET `url` up to `retries + 1` times, returning the first successful body.
///
/// Attempts run back to back with no delay. Each failure is logged; once the
/// budget is spent the result is `FetchExhausted`.
pub async fn get_with_retries(url: &str, retries: u32) -> Result<Vec<u8>> {
    let attempts = retries.saturating_add(1);

    for attempt in 1..=attempts {
        match get_once(url).await {
            Ok(body) => {
                log::debug!("Downloaded {} bytes from {}", body.len(), url);
                return Ok(body);
            }
            Err(e) => {
                log::error!(
                    "Error downloading price data, attempt {}/{}: {}",
                    attempt,
                    attempts,
                    e
                );
            }
        }
    }

    Err(PriceError::FetchExhausted { attempts })
}

/// One attempt on a fresh client, so each retry opens its own connection
async fn get_once(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    let response = client
        .get(url)
        .header("User-Agent", "live_prices/1.0")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(PriceError::HttpStatus(response.status()));
    }

    Ok(response.bytes().await?.to_vec())
}
