//! Classification types

use chrono::DateTime;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a bar relates to its trailing channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    /// Close above the upper bound (bullish, confirmed)
    Breakout,
    /// Close below the lower bound (bearish, confirmed)
    Breakdown,
    /// Intrabar touch of the lower bound, close back above it
    /// (bullish, tentative)
    Rebound,
    /// Intrabar touch of the upper bound, close back below it
    /// (bearish, tentative)
    Pullback,
}

impl SignalKind {
    /// True for the bullish kinds
    pub fn is_bullish(&self) -> bool {
        matches!(self, SignalKind::Breakout | SignalKind::Rebound)
    }

    /// True for closes beyond a bound; false for intrabar touches
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SignalKind::Breakout | SignalKind::Breakdown)
    }
}

/// Which bars a scan evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanMode {
    /// Most recent bar only
    Live,
    /// Walk backward through recent bars, newest first
    Retrospective,
}

/// Classification strategy, selectable in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Full breakout/breakdown/rebound/pullback table
    #[default]
    FourState,
    /// Confirmed closes only
    BreakoutOnly,
}

/// A classified opportunity for one instrument
///
/// At most one per instrument per scan.
#[derive(Debug, Clone, Serialize)]
pub struct Signal {
    pub ticker: String,
    pub kind: SignalKind,
    /// Closing price of the matching bar
    pub price: Decimal,
    /// Exchange-local timestamp of the matching bar
    pub time: DateTime<Tz>,
    pub upper: Decimal,
    pub lower: Decimal,
}
