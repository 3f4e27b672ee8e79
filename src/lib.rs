//! egx-scan: price-channel opportunity scanner for EGX equities
//!
//! This library provides the core components for:
//! - Trading-session gating in the exchange's local timezone
//! - Instrument universe resolution via the TradingView screener
//! - Hourly candle history retrieval via the UDF endpoint
//! - Trailing high/low channel computation with optional trend overlays
//! - Rule-table price-action classification (live and retrospective)
//! - Batched opportunity reports delivered over Telegram
//! - Structured run telemetry

pub mod classify;
pub mod cli;
pub mod config;
pub mod history;
pub mod indicator;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod telemetry;
pub mod universe;
