//! Ordered classification rule table and the scan loop over bars
//!
//! Priority is the table order: the first matching rule claims the bar.
//! Breakdown and Breakout are checked before the tentative touches so a
//! close beyond a bound always classifies as the confirmed kind.

use super::{ScanMode, Signal, SignalKind, Strategy};
use crate::history::CandleSeries;
use crate::indicator::{ChannelState, TrendState};
use rust_decimal::Decimal;

/// Bar values a rule is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct RuleInput {
    pub close: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub upper: Decimal,
    pub lower: Decimal,
}

/// One row of the classification table
pub struct Rule {
    pub kind: SignalKind,
    pub matches: fn(&RuleInput) -> bool,
}

fn breakdown(b: &RuleInput) -> bool {
    b.close < b.lower
}

fn breakout(b: &RuleInput) -> bool {
    b.close > b.upper
}

fn rebound(b: &RuleInput) -> bool {
    b.low <= b.lower && b.close >= b.lower
}

fn pullback(b: &RuleInput) -> bool {
    b.high >= b.upper && b.close <= b.upper
}

/// Full table, in priority order
static FOUR_STATE: [Rule; 4] = [
    Rule {
        kind: SignalKind::Breakdown,
        matches: breakdown,
    },
    Rule {
        kind: SignalKind::Breakout,
        matches: breakout,
    },
    Rule {
        kind: SignalKind::Rebound,
        matches: rebound,
    },
    Rule {
        kind: SignalKind::Pullback,
        matches: pullback,
    },
];

impl Strategy {
    /// The rule rows this strategy evaluates, in priority order
    pub fn rules(&self) -> &'static [Rule] {
        match self {
            Strategy::FourState => &FOUR_STATE,
            Strategy::BreakoutOnly => &FOUR_STATE[..2],
        }
    }
}

/// Classify one instrument's recent price action
///
/// `states` must be the channel annotation of `series` (same length).
/// Live mode evaluates only the most recent bar; retrospective mode walks
/// backward through up to `depth` bars and emits at the first match. Bars
/// with undefined bounds are skipped. When `trend` is supplied, confirmed
/// kinds must also agree with trend direction.
pub fn classify(
    series: &CandleSeries,
    states: &[ChannelState],
    trend: Option<&[TrendState]>,
    strategy: Strategy,
    mode: ScanMode,
    depth: usize,
) -> Option<Signal> {
    let bars = series.bars();
    debug_assert_eq!(bars.len(), states.len());
    if bars.is_empty() {
        return None;
    }

    let depth = match mode {
        ScanMode::Live => 1,
        ScanMode::Retrospective => depth.max(1),
    };

    let newest = bars.len() - 1;
    let oldest = newest.saturating_sub(depth - 1);

    for i in (oldest..=newest).rev() {
        let bar = &bars[i];
        let Some((upper, lower)) = states[i].bounds() else {
            continue;
        };
        let input = RuleInput {
            close: bar.close,
            high: bar.high,
            low: bar.low,
            upper,
            lower,
        };

        for rule in strategy.rules() {
            if !(rule.matches)(&input) {
                continue;
            }
            if let Some(trend) = trend {
                if !trend_allows(rule.kind, bar.close, &trend[i]) {
                    continue;
                }
            }
            return Some(Signal {
                ticker: series.ticker().to_string(),
                kind: rule.kind,
                price: bar.close,
                time: bar.time,
                upper,
                lower,
            });
        }
    }

    None
}

/// Trend gate for confirmed kinds
///
/// A breakout must close above both EMAs and the session VWAP; a breakdown
/// below all three. Tentative touches are counter-trend by definition and
/// pass unfiltered.
fn trend_allows(kind: SignalKind, close: Decimal, trend: &TrendState) -> bool {
    match kind {
        SignalKind::Breakout => {
            close > trend.ema_fast && close > trend.ema_slow && close > trend.vwap
        }
        SignalKind::Breakdown => {
            close < trend.ema_fast && close < trend.ema_slow && close < trend.vwap
        }
        SignalKind::Rebound | SignalKind::Pullback => true,
    }
}
