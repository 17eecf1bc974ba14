//! Error types for live_prices

use crate::config::GameMode;
use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for price engine operations
#[derive(Debug, Error)]
pub enum PriceError {
    /// Config or blacklist file missing or malformed. Disables the engine.
    #[error("Failed to load {}: {reason}", .path.display())]
    ConfigLoad { path: PathBuf, reason: String },
    /// Every fetch attempt failed
    #[error("Price fetch failed after {attempts} attempt(s)")]
    FetchExhausted { attempts: u32 },
    /// Fetch failed and there is no snapshot on disk to fall back to
    #[error("No price data available for {mode} prices")]
    NoPriceData { mode: GameMode },
    /// Snapshot or config write failed
    #[error("Failed to write {}: {reason}", .path.display())]
    Persist { path: PathBuf, reason: String },
    /// Another reconciliation pass holds the engine
    #[error("A price update pass is already in progress")]
    PassInProgress,
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Failed to parse JSON
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for price engine operations
pub type Result<T> = std::result::Result<T, PriceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_file() {
        let err = PriceError::ConfigLoad {
            path: PathBuf::from("/tmp/config/blacklist.json"),
            reason: "expected value at line 1 column 1".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("blacklist.json"));
        assert!(text.contains("expected value"));
    }

    #[test]
    fn display_no_price_data_names_mode() {
        let err = PriceError::NoPriceData {
            mode: GameMode::Pve,
        };
        assert_eq!(err.to_string(), "No price data available for pve prices");
    }

    #[test]
    fn parse_errors_convert() {
        let parse_err = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let err: PriceError = parse_err.into();
        assert!(matches!(err, PriceError::Parse(_)));
    }
}
