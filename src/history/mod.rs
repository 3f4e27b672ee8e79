//! Candle history retrieval
//!
//! Bounded hourly OHLCV series per instrument from the TradingView UDF
//! endpoint, normalized to the exchange's local timezone.

mod types;
mod udf;

pub use types::{Bar, CandleSeries};
#[cfg(test)]
pub(crate) use types::test_support;
pub use udf::UdfClient;

use thiserror::Error;

/// Per-instrument history failures
///
/// All of these mean "skip this instrument"; none abort the scan.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Request could not be completed
    #[error("History request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Endpoint answered with a non-success HTTP status
    #[error("History endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    /// The UDF status field was not "ok"
    #[error("Provider status {0:?}")]
    ProviderStatus(String),
    /// Required arrays absent or length-mismatched
    #[error("Malformed history payload: {0}")]
    MalformedPayload(String),
    /// Fewer valid bars than the configured minimum
    #[error("Insufficient data: {got} bars, need {need}")]
    InsufficientData { got: usize, need: usize },
}
