//! EMA and session-VWAP trend overlays
//!
//! Used only by the trend-filtered pipeline variant to gate confirmed
//! breakout/breakdown signals by trend direction.

use crate::history::{Bar, CandleSeries};
use rust_decimal::Decimal;

/// Trend overlay values for one bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendState {
    pub ema_fast: Decimal,
    pub ema_slow: Decimal,
    pub vwap: Decimal,
}

/// Exponential moving average over the closes
///
/// `alpha = 2 / (span + 1)`, seeded with the first value.
pub fn ema(values: &[Decimal], span: usize) -> Vec<Decimal> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let alpha = Decimal::from(2) / Decimal::from(span as u64 + 1);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = first;
    out.push(prev);
    for &value in &values[1..] {
        prev = alpha * value + (Decimal::ONE - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Intraday volume-weighted average price
///
/// Cumulative `typical_price * volume / volume`, restarted whenever the
/// bar's exchange-local calendar date changes. A zero cumulative volume
/// falls back to the bar's typical price.
pub fn session_vwap(bars: &[Bar]) -> Vec<Decimal> {
    let mut out = Vec::with_capacity(bars.len());
    let mut current_date = None;
    let mut cum_tp_vol = Decimal::ZERO;
    let mut cum_vol = Decimal::ZERO;

    for bar in bars {
        let date = bar.time.date_naive();
        if current_date != Some(date) {
            current_date = Some(date);
            cum_tp_vol = Decimal::ZERO;
            cum_vol = Decimal::ZERO;
        }

        let typical = typical_price(bar);
        let volume = Decimal::from(bar.volume);
        cum_tp_vol += typical * volume;
        cum_vol += volume;

        if cum_vol.is_zero() {
            out.push(typical);
        } else {
            out.push(cum_tp_vol / cum_vol);
        }
    }

    out
}

/// Annotate a series with both EMAs and the session VWAP
pub fn annotate_trend(series: &CandleSeries, fast: usize, slow: usize) -> Vec<TrendState> {
    let closes: Vec<Decimal> = series.bars().iter().map(|b| b.close).collect();
    let ema_fast = ema(&closes, fast);
    let ema_slow = ema(&closes, slow);
    let vwap = session_vwap(series.bars());

    ema_fast
        .into_iter()
        .zip(ema_slow)
        .zip(vwap)
        .map(|((ema_fast, ema_slow), vwap)| TrendState {
            ema_fast,
            ema_slow,
            vwap,
        })
        .collect()
}

fn typical_price(bar: &Bar) -> Decimal {
    (bar.high + bar.low + bar.close) / Decimal::from(3)
}
