//! Price-action classification
//!
//! An ordered rule table evaluated per bar against the trailing channel
//! bounds, walked over one bar (live) or a backward window (retrospective).
//! Emits at most one signal per instrument per scan.

mod rules;
mod types;

pub use rules::{classify, Rule, RuleInput};
pub use types::{ScanMode, Signal, SignalKind, Strategy};
