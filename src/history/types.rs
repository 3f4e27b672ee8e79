//! Candle series types

use chrono::DateTime;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;

/// One OHLCV record at a fixed resolution, in exchange-local time
///
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub time: DateTime<Tz>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

/// Ordered bar sequence for one instrument
///
/// Strictly increasing by timestamp with no duplicates; rows violating
/// monotonicity are dropped at construction.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    ticker: String,
    bars: Vec<Bar>,
}

impl CandleSeries {
    /// Build a series, enforcing the timestamp ordering invariant
    pub fn new(ticker: impl Into<String>, bars: Vec<Bar>) -> Self {
        let ticker = ticker.into();
        let mut ordered: Vec<Bar> = Vec::with_capacity(bars.len());
        let mut dropped = 0usize;

        for bar in bars {
            match ordered.last() {
                Some(prev) if bar.time <= prev.time => dropped += 1,
                _ => ordered.push(bar),
            }
        }

        if dropped > 0 {
            tracing::warn!(
                ticker = %ticker,
                dropped,
                "Dropped out-of-order history rows"
            );
        }

        Self {
            ticker,
            bars: ordered,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::bar;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_series_preserves_ordered_bars() {
        let bars = vec![
            bar(0, dec!(10), dec!(11), dec!(9), dec!(10.5)),
            bar(1, dec!(10.5), dec!(12), dec!(10), dec!(11)),
            bar(2, dec!(11), dec!(13), dec!(11), dec!(12)),
        ];
        let series = CandleSeries::new("COMI", bars);
        assert_eq!(series.len(), 3);
        assert_eq!(series.last().unwrap().close, dec!(12));
    }

    #[test]
    fn test_series_drops_duplicate_and_backward_timestamps() {
        let bars = vec![
            bar(0, dec!(10), dec!(11), dec!(9), dec!(10.5)),
            bar(0, dec!(10), dec!(11), dec!(9), dec!(10.5)),
            bar(2, dec!(11), dec!(13), dec!(11), dec!(12)),
            bar(1, dec!(10.5), dec!(12), dec!(10), dec!(11)),
        ];
        let series = CandleSeries::new("COMI", bars);
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].time + chrono::Duration::hours(2), series.bars()[1].time);
    }
}
