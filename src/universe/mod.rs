//! Instrument universe resolution
//!
//! Queries the TradingView screener for the live list of tradeable
//! instruments and filters it down to a clean, de-duplicated ticker set.

mod scanner;

pub use scanner::ScannerClient;

use serde::Serialize;
use thiserror::Error;

/// One tradeable instrument, valid for the duration of a single scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instrument {
    /// Canonical bare ticker (exchange prefix stripped)
    pub ticker: String,
    /// Exchange code the ticker trades on
    pub exchange: String,
    /// Listing description from the screener
    pub description: String,
}

/// Universe query failures
///
/// Reported by the pipeline but never fatal to a scan: the run continues
/// with an empty universe.
#[derive(Debug, Error)]
pub enum UniverseError {
    /// Request could not be completed
    #[error("Scanner request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Scanner answered with a non-success status
    #[error("Scanner returned status {0}")]
    Status(reqwest::StatusCode),
    /// Response body did not decode as a screener payload
    #[error("Malformed scanner payload: {0}")]
    Malformed(String),
}

/// Split an `"EXCH:TICKER"` qualifier into its parts
///
/// Unqualified names are attributed to `default_exchange`.
pub fn canonical_ticker(name: &str, default_exchange: &str) -> (String, String) {
    match name.split_once(':') {
        Some((exchange, ticker)) => (ticker.to_string(), exchange.to_string()),
        None => (name.to_string(), default_exchange.to_string()),
    }
}

/// True when the description marks a rights issue / subscription listing
pub fn is_excluded(description: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| description.contains(m.as_str()))
}
