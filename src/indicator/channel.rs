//! Trailing high/low price channel

use crate::history::CandleSeries;
use rust_decimal::Decimal;

/// Channel bounds for one bar
///
/// Both bounds are `None` until `period` prior bars exist. When both are
/// defined, `upper >= lower`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelState {
    pub upper: Option<Decimal>,
    pub lower: Option<Decimal>,
}

impl ChannelState {
    const UNDEFINED: Self = Self {
        upper: None,
        lower: None,
    };

    /// Bounds as a pair, when both are defined
    pub fn bounds(&self) -> Option<(Decimal, Decimal)> {
        Some((self.upper?, self.lower?))
    }
}

/// Annotate a series with its trailing channel
///
/// The bounds at bar `i` cover the window `[i - period, i - 1]`; bar `i`
/// itself never contributes to its own channel.
pub fn annotate(series: &CandleSeries, period: usize) -> Vec<ChannelState> {
    let bars = series.bars();
    if period == 0 {
        return vec![ChannelState::UNDEFINED; bars.len()];
    }

    bars.iter()
        .enumerate()
        .map(|(i, _)| {
            if i < period {
                return ChannelState::UNDEFINED;
            }
            let window = &bars[i - period..i];
            ChannelState {
                upper: window.iter().map(|b| b.high).max(),
                lower: window.iter().map(|b| b.low).min(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::test_support::bar;
    use crate::history::CandleSeries;
    use rust_decimal_macros::dec;

    fn flat_series(n: usize) -> CandleSeries {
        let bars = (0..n)
            .map(|i| bar(i as i64, dec!(10), dec!(11), dec!(9), dec!(10)))
            .collect();
        CandleSeries::new("TEST", bars)
    }

    #[test]
    fn test_bounds_undefined_before_period() {
        let series = flat_series(10);
        let states = annotate(&series, 5);
        assert_eq!(states.len(), 10);
        for state in &states[..5] {
            assert!(state.bounds().is_none());
        }
        for state in &states[5..] {
            assert_eq!(state.bounds(), Some((dec!(11), dec!(9))));
        }
    }

    #[test]
    fn test_window_excludes_current_bar() {
        // A spike on the last bar must not widen its own channel
        let mut bars: Vec<_> = (0..6)
            .map(|i| bar(i, dec!(10), dec!(11), dec!(9), dec!(10)))
            .collect();
        bars[5] = bar(5, dec!(10), dec!(50), dec!(1), dec!(40));
        let series = CandleSeries::new("TEST", bars);

        let states = annotate(&series, 5);
        assert_eq!(states[5].bounds(), Some((dec!(11), dec!(9))));
    }

    #[test]
    fn test_window_slides() {
        let mut bars: Vec<_> = (0..8)
            .map(|i| bar(i, dec!(10), dec!(11), dec!(9), dec!(10)))
            .collect();
        bars[2] = bar(2, dec!(10), dec!(20), dec!(9), dec!(10));
        let series = CandleSeries::new("TEST", bars);

        let states = annotate(&series, 3);
        // Bars 3..=5 see the spike high at index 2, bar 6 no longer does
        assert_eq!(states[3].upper, Some(dec!(20)));
        assert_eq!(states[5].upper, Some(dec!(20)));
        assert_eq!(states[6].upper, Some(dec!(11)));
    }

    #[test]
    fn test_upper_never_below_lower() {
        let bars = (0..30)
            .map(|i| {
                let base = Decimal::from(10 + (i % 7));
                bar(i, base, base + dec!(1.5), base - dec!(1.2), base)
            })
            .collect();
        let series = CandleSeries::new("TEST", bars);

        for state in annotate(&series, 7) {
            if let Some((upper, lower)) = state.bounds() {
                assert!(upper >= lower);
            }
        }
    }

    #[test]
    fn test_zero_period_stays_undefined() {
        let series = flat_series(4);
        let states = annotate(&series, 0);
        assert!(states.iter().all(|s| s.bounds().is_none()));
    }
}
