//! TradingView UDF history client
//!
//! `GET <base>/history?symbol=EGX:COMI&resolution=60&from=..&to=..` returns
//! parallel arrays `{s, t, o, h, l, c, v}`. Anything other than `s == "ok"`
//! with complete, equal-length arrays counts as a fetch failure for that
//! instrument.

use super::{Bar, CandleSeries, HistoryError};
use crate::config::HistoryConfig;
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Client for the UDF candle-history endpoint
///
/// Shared across the scan's worker pool; enforces a minimum spacing between
/// consecutive requests so the provider is never hammered even at full
/// concurrency.
pub struct UdfClient {
    config: HistoryConfig,
    timezone: Tz,
    min_gap: Duration,
    client: Client,
    last_request: Mutex<Option<Instant>>,
}

impl UdfClient {
    /// Create a new UDF client with the given inter-request spacing
    pub fn new(config: HistoryConfig, timezone: Tz, min_gap: Duration) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            timezone,
            min_gap,
            client,
            last_request: Mutex::new(None),
        }
    }

    /// Fetch the trailing hourly series for one instrument
    ///
    /// `min_bars` is the caller's floor for this scan mode; shorter series
    /// are rejected wholesale.
    pub async fn fetch(
        &self,
        ticker: &str,
        exchange: &str,
        min_bars: usize,
    ) -> Result<CandleSeries, HistoryError> {
        self.pace().await;

        let symbol = format!("{exchange}:{ticker}");
        let to = Utc::now().timestamp();
        let from = to - i64::from(self.config.lookback_days) * 86_400;
        let url = format!("{}/history", self.config.base_url);

        tracing::debug!(symbol = %symbol, from, to, "Fetching candle history");

        let resolution = self.config.resolution_minutes.to_string();
        let from_s = from.to_string();
        let to_s = to.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.as_str()),
                ("resolution", resolution.as_str()),
                ("from", from_s.as_str()),
                ("to", to_s.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(HistoryError::Status(response.status()));
        }

        let payload: UdfHistory = response
            .json()
            .await
            .map_err(|e| HistoryError::MalformedPayload(e.to_string()))?;

        parse_series(ticker, payload, self.timezone, min_bars)
    }

    /// Sleep until at least `min_gap` has elapsed since the previous request
    ///
    /// The lock is held across the sleep so concurrent workers queue up
    /// behind it and requests stay evenly spaced.
    async fn pace(&self) {
        if self.min_gap.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_gap {
                tokio::time::sleep(self.min_gap - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// UDF history response: status plus parallel arrays
#[derive(Debug, Deserialize)]
struct UdfHistory {
    s: String,
    t: Option<Vec<i64>>,
    o: Option<Vec<Decimal>>,
    h: Option<Vec<Decimal>>,
    l: Option<Vec<Decimal>>,
    c: Option<Vec<Decimal>>,
    v: Option<Vec<Decimal>>,
}

/// Validate a UDF payload and convert it into an exchange-local series
fn parse_series(
    ticker: &str,
    payload: UdfHistory,
    timezone: Tz,
    min_bars: usize,
) -> Result<CandleSeries, HistoryError> {
    if payload.s != "ok" {
        return Err(HistoryError::ProviderStatus(payload.s));
    }

    let t = required(payload.t, "t")?;
    let o = required(payload.o, "o")?;
    let h = required(payload.h, "h")?;
    let l = required(payload.l, "l")?;
    let c = required(payload.c, "c")?;
    let v = required(payload.v, "v")?;

    let len = t.len();
    if [o.len(), h.len(), l.len(), c.len(), v.len()]
        .iter()
        .any(|&n| n != len)
    {
        return Err(HistoryError::MalformedPayload(
            "array length mismatch".to_string(),
        ));
    }

    let bars: Vec<Bar> = (0..len)
        .filter_map(|i| {
            let time = Utc
                .timestamp_opt(t[i], 0)
                .single()?
                .with_timezone(&timezone);
            Some(Bar {
                time,
                open: o[i],
                high: h[i],
                low: l[i],
                close: c[i],
                volume: v[i].to_u64().unwrap_or(0),
            })
        })
        .collect();

    let series = CandleSeries::new(ticker, bars);
    if series.len() < min_bars {
        return Err(HistoryError::InsufficientData {
            got: series.len(),
            need: min_bars,
        });
    }

    Ok(series)
}

fn required<T>(field: Option<Vec<T>>, name: &str) -> Result<Vec<T>, HistoryError> {
    field.ok_or_else(|| HistoryError::MalformedPayload(format!("missing array {name:?}")))
}
