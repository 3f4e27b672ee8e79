//! Telemetry module
//!
//! Structured logging setup plus per-scan failure accounting. Instrument
//! failures are isolated by the pipeline but never silently discarded:
//! every skip is counted by kind and logged at the end of the run.

mod logging;

pub use logging::init_logging;

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level)
}

/// Why an instrument contributed no signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport or HTTP-level history failure
    Fetch,
    /// Provider status not ok / undecodable payload
    Malformed,
    /// Series shorter than the configured minimum
    InsufficientData,
    /// Scan deadline hit before this instrument started
    Cutoff,
}

/// Per-scan outcome counters
#[derive(Debug, Default, Clone)]
pub struct ScanTelemetry {
    pub universe_failed: bool,
    pub instruments: usize,
    pub signals: usize,
    pub no_signal: usize,
    pub fetch_failures: usize,
    pub malformed: usize,
    pub insufficient_data: usize,
    pub cutoff: usize,
}

impl ScanTelemetry {
    pub fn record_failure(&mut self, kind: FailureKind) {
        match kind {
            FailureKind::Fetch => self.fetch_failures += 1,
            FailureKind::Malformed => self.malformed += 1,
            FailureKind::InsufficientData => self.insufficient_data += 1,
            FailureKind::Cutoff => self.cutoff += 1,
        }
    }

    pub fn record_signal(&mut self) {
        self.signals += 1;
    }

    pub fn record_no_signal(&mut self) {
        self.no_signal += 1;
    }

    /// Instruments skipped for any reason
    pub fn skipped(&self) -> usize {
        self.fetch_failures + self.malformed + self.insufficient_data + self.cutoff
    }

    /// Emit the run summary as structured fields
    pub fn log_summary(&self) {
        tracing::info!(
            universe_failed = self.universe_failed,
            instruments = self.instruments,
            signals = self.signals,
            no_signal = self.no_signal,
            fetch_failures = self.fetch_failures,
            malformed = self.malformed,
            insufficient_data = self.insufficient_data,
            cutoff = self.cutoff,
            "Scan complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_counters() {
        let mut telemetry = ScanTelemetry::default();
        telemetry.record_failure(FailureKind::Fetch);
        telemetry.record_failure(FailureKind::Fetch);
        telemetry.record_failure(FailureKind::Malformed);
        telemetry.record_failure(FailureKind::InsufficientData);
        telemetry.record_failure(FailureKind::Cutoff);

        assert_eq!(telemetry.fetch_failures, 2);
        assert_eq!(telemetry.malformed, 1);
        assert_eq!(telemetry.insufficient_data, 1);
        assert_eq!(telemetry.cutoff, 1);
        assert_eq!(telemetry.skipped(), 5);
    }

    #[test]
    fn test_signal_counters() {
        let mut telemetry = ScanTelemetry::default();
        telemetry.record_signal();
        telemetry.record_no_signal();
        telemetry.record_no_signal();
        assert_eq!(telemetry.signals, 1);
        assert_eq!(telemetry.no_signal, 2);
    }
}
