//! Opportunity aggregation and report rendering
//!
//! Collects per-instrument signals in universe order, caps the reported
//! count, and renders the single Telegram-markdown text for a scan.

use crate::classify::{ScanMode, Signal, SignalKind};
use crate::session::SessionState;
use chrono::DateTime;
use chrono_tz::Tz;

/// One scan's aggregated result
///
/// `total_detected` is the true match count; `signals` may be a truncated
/// prefix of it.
#[derive(Debug, Clone)]
pub struct OpportunityReport {
    pub mode: ScanMode,
    pub generated_at: DateTime<Tz>,
    pub signals: Vec<Signal>,
    pub total_detected: usize,
    /// Set when a manual run proceeded against a closed market
    pub closed_reason: Option<SessionState>,
}

impl OpportunityReport {
    /// Aggregate discovered signals, preserving their order
    pub fn build(
        mut signals: Vec<Signal>,
        mode: ScanMode,
        generated_at: DateTime<Tz>,
        cap: usize,
        closed_reason: Option<SessionState>,
    ) -> Self {
        let total_detected = signals.len();
        signals.truncate(cap);
        Self {
            mode,
            generated_at,
            signals,
            total_detected,
            closed_reason,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_detected == 0
    }

    pub fn is_truncated(&self) -> bool {
        self.signals.len() < self.total_detected
    }

    /// Render the full Telegram-markdown report text
    pub fn render(&self, decimals: u32) -> String {
        let mut out = String::new();
        out.push_str("⚡ *EGX Channel Signals* ⚡\n");
        self.push_preamble(&mut out);

        if self.is_empty() {
            out.push_str("✅ Scan complete, no channel signals right now.\n");
            return out;
        }

        out.push_str("——————————————\n");
        for signal in &self.signals {
            self.push_signal(&mut out, signal, decimals);
        }

        out.push_str(&format!("📈 Total detected: {}", self.total_detected));
        if self.is_truncated() {
            out.push_str(&format!(" (showing first {})", self.signals.len()));
        }
        out.push('\n');
        out
    }

    fn push_preamble(&self, out: &mut String) {
        if let Some(reason) = self.closed_reason {
            out.push_str(&format!(
                "🚫 *Note:* market closed ({}).\n",
                closed_label(reason)
            ));
        }
        out.push_str(&format!(
            "🕒 {}\n",
            self.generated_at.format("%d %b %H:%M")
        ));
    }

    fn push_signal(&self, out: &mut String, signal: &Signal, decimals: u32) {
        let icon = if signal.kind.is_bullish() {
            "🟢"
        } else {
            "🔴"
        };
        out.push_str(&format!("{icon} *{}*\n", signal.ticker));
        out.push_str(&format!("Signal: {}\n", kind_label(signal.kind)));
        out.push_str(&format!("Price: {}\n", fmt_price(signal.price, decimals)));
        out.push_str(&format!(
            "Channel: {} – {}\n",
            fmt_price(signal.lower, decimals),
            fmt_price(signal.upper, decimals)
        ));
        if self.mode == ScanMode::Retrospective {
            out.push_str(&format!("🕒 {}\n", signal.time.format("%d %b %H:%M")));
        }
        out.push('\n');
    }
}

/// Fixed-decimal price rendering ("12.3" at 3 dp → "12.300")
fn fmt_price(value: rust_decimal::Decimal, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, value.round_dp(decimals))
}

fn kind_label(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::Breakout => "Breakout (buy)",
        SignalKind::Breakdown => "Breakdown (sell)",
        SignalKind::Rebound => "Rebound off support (watch)",
        SignalKind::Pullback => "Pullback off resistance (watch)",
    }
}

fn closed_label(reason: SessionState) -> &'static str {
    match reason {
        SessionState::WeeklyHoliday => "weekly holiday",
        SessionState::OutsideHours => "outside trading hours",
        SessionState::TradingSession => "trading session",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Africa::Cairo;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Tz> {
        Cairo.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap()
    }

    fn signal(ticker: &str, kind: SignalKind) -> Signal {
        Signal {
            ticker: ticker.to_string(),
            kind,
            price: dec!(12.3456),
            time: now(),
            upper: dec!(12.0),
            lower: dec!(8.0),
        }
    }

    #[test]
    fn test_cap_and_total_are_independent() {
        let signals: Vec<Signal> = (0..30)
            .map(|i| signal(&format!("T{i}"), SignalKind::Breakout))
            .collect();
        let report = OpportunityReport::build(signals, ScanMode::Live, now(), 20, None);
        assert_eq!(report.signals.len(), 20);
        assert_eq!(report.total_detected, 30);
        assert!(report.is_truncated());
    }

    #[test]
    fn test_zero_cap() {
        let report = OpportunityReport::build(
            vec![signal("COMI", SignalKind::Breakout)],
            ScanMode::Live,
            now(),
            0,
            None,
        );
        assert!(report.signals.is_empty());
        assert_eq!(report.total_detected, 1);
    }

    #[test]
    fn test_order_preserved() {
        let report = OpportunityReport::build(
            vec![
                signal("COMI", SignalKind::Breakout),
                signal("SWDY", SignalKind::Breakdown),
                signal("ETEL", SignalKind::Rebound),
            ],
            ScanMode::Live,
            now(),
            20,
            None,
        );
        let tickers: Vec<&str> = report.signals.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["COMI", "SWDY", "ETEL"]);
    }

    #[test]
    fn test_render_live_report() {
        let report = OpportunityReport::build(
            vec![
                signal("COMI", SignalKind::Breakout),
                signal("SWDY", SignalKind::Breakdown),
            ],
            ScanMode::Live,
            now(),
            20,
            None,
        );
        let text = report.render(3);
        assert!(text.contains("🟢 *COMI*"));
        assert!(text.contains("🔴 *SWDY*"));
        assert!(text.contains("Breakout (buy)"));
        assert!(text.contains("Price: 12.346"));
        assert!(text.contains("Channel: 8.000 – 12.000"));
        assert!(text.contains("Total detected: 2"));
        assert!(!text.contains("Note:"));
        // Live mode omits per-signal timestamps
        assert_eq!(text.matches("🕒").count(), 1);
    }

    #[test]
    fn test_render_retrospective_includes_bar_time() {
        let report = OpportunityReport::build(
            vec![signal("COMI", SignalKind::Rebound)],
            ScanMode::Retrospective,
            now(),
            20,
            None,
        );
        let text = report.render(3);
        // Header timestamp plus the signal's bar timestamp
        assert_eq!(text.matches("🕒").count(), 2);
    }

    #[test]
    fn test_render_closed_market_note() {
        let report = OpportunityReport::build(
            vec![],
            ScanMode::Retrospective,
            now(),
            20,
            Some(SessionState::WeeklyHoliday),
        );
        let text = report.render(3);
        assert!(text.contains("market closed (weekly holiday)"));
        assert!(text.contains("no channel signals"));
    }

    #[test]
    fn test_render_truncation_note() {
        let signals: Vec<Signal> = (0..25)
            .map(|i| signal(&format!("T{i}"), SignalKind::Breakout))
            .collect();
        let report = OpportunityReport::build(signals, ScanMode::Live, now(), 20, None);
        let text = report.render(3);
        assert!(text.contains("Total detected: 25 (showing first 20)"));
    }
}
