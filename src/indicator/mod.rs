//! Channel and trend indicators
//!
//! Per-bar trailing high/low channel plus the EMA/VWAP overlays used by the
//! trend-filtered pipeline variant. All computation is windowed strictly
//! over prior bars; nothing here looks ahead.

mod channel;
mod trend;

pub use channel::{annotate, ChannelState};
pub use trend::{annotate_trend, ema, session_vwap, TrendState};
