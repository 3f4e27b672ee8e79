//! TradingView screener client
//!
//! One paginated POST against `<base>/<screener>/scan` returns every active
//! instrument of type "stock" with its listing description. Rows naming a
//! rights issue are dropped, tickers are stripped of their exchange prefix
//! and de-duplicated in insertion order.

use super::{canonical_ticker, is_excluded, Instrument, UniverseError};
use crate::config::UniverseConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;

/// Browser-like user agent; the screener blocks the default reqwest one
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Client for the TradingView screener API
pub struct ScannerClient {
    config: UniverseConfig,
    screener: String,
    exchange: String,
    client: Client,
}

impl ScannerClient {
    /// Create a new screener client
    pub fn new(config: UniverseConfig, screener: String, exchange: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            screener,
            exchange,
            client,
        }
    }

    /// Fetch the live instrument universe
    pub async fn resolve(&self) -> Result<Vec<Instrument>, UniverseError> {
        let url = format!("{}/{}/scan", self.config.base_url, self.screener);

        tracing::debug!(url = %url, max_rows = self.config.max_rows, "Querying screener");

        let response = self
            .client
            .post(&url)
            .json(&self.request_payload())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UniverseError::Status(response.status()));
        }

        let payload: ScannerResponse = response
            .json()
            .await
            .map_err(|e| UniverseError::Malformed(e.to_string()))?;

        let instruments = self.collect_instruments(payload);

        tracing::info!(
            instrument_count = instruments.len(),
            "Resolved instrument universe"
        );

        Ok(instruments)
    }

    /// The screener filter payload: active stocks, name/close/description
    /// columns, one `[0, max_rows)` page
    fn request_payload(&self) -> Value {
        json!({
            "filter": [
                {"left": "type", "operation": "in_range", "right": ["stock"]}
            ],
            "options": {"lang": self.config.locale},
            "symbols": {"query": {"types": []}},
            "columns": ["name", "close", "description"],
            "range": [0, self.config.max_rows]
        })
    }

    /// Turn screener rows into the clean instrument set
    ///
    /// Malformed rows are skipped, not treated as a malformed payload.
    fn collect_instruments(&self, payload: ScannerResponse) -> Vec<Instrument> {
        let mut seen = HashSet::new();
        let mut instruments = Vec::new();

        for row in payload.data {
            let Some((name, description)) = parse_row(&row.d) else {
                tracing::debug!(row = ?row.d, "Skipping malformed screener row");
                continue;
            };

            if is_excluded(&description, &self.config.exclude_markers) {
                tracing::debug!(name = %name, "Excluding rights-issue listing");
                continue;
            }

            let (ticker, exchange) = canonical_ticker(&name, &self.exchange);
            if seen.insert(ticker.clone()) {
                instruments.push(Instrument {
                    ticker,
                    exchange,
                    description,
                });
            }
        }

        instruments
    }
}

/// Screener response: `{data: [{d: [name, close, description, ...]}]}`
#[derive(Debug, Deserialize)]
struct ScannerResponse {
    #[serde(default)]
    data: Vec<ScannerRow>,
}

#[derive(Debug, Deserialize)]
struct ScannerRow {
    d: Vec<Value>,
}

/// Extract `(name, description)` from one row's column array
fn parse_row(d: &[Value]) -> Option<(String, String)> {
    let name = d.first()?.as_str()?;
    let description = d.get(2)?.as_str()?;
    Some((name.to_string(), description.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UniverseConfig;

    fn client() -> ScannerClient {
        let config: UniverseConfig = toml::from_str("").unwrap();
        ScannerClient::new(config, "egypt".to_string(), "EGX".to_string())
    }

    fn response(body: &str) -> ScannerResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_collect_instruments() {
        let payload = response(
            r#"{"data": [
                {"d": ["EGX:COMI", 82.5, "Commercial International Bank"]},
                {"d": ["EGX:SWDY", 55.1, "Elsweedy Electric"]}
            ]}"#,
        );

        let instruments = client().collect_instruments(payload);
        assert_eq!(instruments.len(), 2);
        assert_eq!(instruments[0].ticker, "COMI");
        assert_eq!(instruments[0].exchange, "EGX");
        assert_eq!(instruments[1].ticker, "SWDY");
    }

    #[test]
    fn test_rights_issue_rows_excluded() {
        let payload = response(
            r#"{"data": [
                {"d": ["EGX:COMI", 82.5, "Commercial International Bank"]},
                {"d": ["EGX:PHDC.R", 0.4, "Palm Hills rights issue"]},
                {"d": ["EGX:AMER.R", 0.1, "حق اكتتاب عامر جروب"]}
            ]}"#,
        );

        let instruments = client().collect_instruments(payload);
        assert_eq!(instruments.len(), 1);
        assert_eq!(instruments[0].ticker, "COMI");
    }

    #[test]
    fn test_duplicates_keep_first_seen_order() {
        let payload = response(
            r#"{"data": [
                {"d": ["EGX:COMI", 82.5, "Commercial International Bank"]},
                {"d": ["EGX:ETEL", 28.0, "Telecom Egypt"]},
                {"d": ["COMI", 82.5, "Commercial International Bank"]}
            ]}"#,
        );

        let instruments = client().collect_instruments(payload);
        let tickers: Vec<&str> = instruments.iter().map(|i| i.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["COMI", "ETEL"]);
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let payload = response(
            r#"{"data": [
                {"d": ["EGX:COMI"]},
                {"d": [42, 1.0, "numeric name"]},
                {"d": ["EGX:ETEL", 28.0, "Telecom Egypt"]}
            ]}"#,
        );

        let instruments = client().collect_instruments(payload);
        assert_eq!(instruments.len(), 1);
        assert_eq!(instruments[0].ticker, "ETEL");
    }

    #[test]
    fn test_empty_data_field() {
        let instruments = client().collect_instruments(response(r#"{}"#));
        assert!(instruments.is_empty());
    }

    #[test]
    fn test_request_payload_shape() {
        let payload = client().request_payload();
        assert_eq!(payload["columns"][0], "name");
        assert_eq!(payload["columns"][2], "description");
        assert_eq!(payload["range"][1], 600);
        assert_eq!(payload["filter"][0]["right"][0], "stock");
        assert_eq!(payload["options"]["lang"], "ar");
    }
}
