//! Scan pipeline
//!
//! One `Scanner::run` is a full scan: session gate, universe resolution,
//! a bounded worker pool fetching and classifying every instrument in
//! isolation, deterministic re-ordering, aggregation, and dispatch. No
//! state survives between runs.

use crate::classify::{classify, ScanMode, Signal, Strategy};
use crate::config::Config;
use crate::history::{HistoryError, UdfClient};
use crate::indicator::{annotate, annotate_trend};
use crate::notify::Notifier;
use crate::report::OpportunityReport;
use crate::session::{SessionCalendar, SessionState};
use crate::telemetry::{FailureKind, ScanTelemetry};
use crate::universe::{Instrument, ScannerClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// What started this scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Cron-style schedule: live mode, skipped entirely off-session
    Scheduled,
    /// Operator request: retrospective mode, runs even off-session
    Manual,
}

impl Trigger {
    /// The classification mode this trigger selects
    pub fn mode(&self) -> ScanMode {
        match self {
            Trigger::Scheduled => ScanMode::Live,
            Trigger::Manual => ScanMode::Retrospective,
        }
    }
}

/// Result of one scan
#[derive(Debug)]
pub enum ScanOutcome {
    /// Scheduled run against a closed market; nothing was fetched
    Skipped { reason: SessionState },
    /// The scan ran to completion (possibly past its deadline, with the
    /// unstarted tail cut off and counted)
    Completed {
        report: OpportunityReport,
        telemetry: ScanTelemetry,
    },
}

/// What one instrument contributed
enum InstrumentOutcome {
    Signal(Signal),
    NoSignal,
    Failed(FailureKind),
}

impl From<&HistoryError> for FailureKind {
    fn from(err: &HistoryError) -> Self {
        match err {
            HistoryError::Transport(_) | HistoryError::Status(_) => FailureKind::Fetch,
            HistoryError::ProviderStatus(_) | HistoryError::MalformedPayload(_) => {
                FailureKind::Malformed
            }
            HistoryError::InsufficientData { .. } => FailureKind::InsufficientData,
        }
    }
}

/// Per-task slice of the scan configuration
struct TaskContext {
    history: UdfClient,
    period: usize,
    ema_fast: usize,
    ema_slow: usize,
    trend_filter: bool,
    strategy: Strategy,
    mode: ScanMode,
    depth: usize,
    min_bars: usize,
    deadline: Instant,
}

/// One full scan over the exchange
pub struct Scanner {
    config: Config,
    calendar: SessionCalendar,
    universe: ScannerClient,
    notifier: Option<Arc<dyn Notifier>>,
}

impl Scanner {
    /// Build a scanner from configuration
    ///
    /// `notifier` is `None` when dispatch is disabled (dry runs or missing
    /// transport configuration); the rendered report is logged instead.
    pub fn new(config: Config, notifier: Option<Arc<dyn Notifier>>) -> anyhow::Result<Self> {
        let calendar = SessionCalendar::new(&config.session, &config.exchange.timezone)?;
        let universe = ScannerClient::new(
            config.universe.clone(),
            config.exchange.screener.clone(),
            config.exchange.name.clone(),
        );
        Ok(Self {
            config,
            calendar,
            universe,
            notifier,
        })
    }

    /// Run one scan
    pub async fn run(&self, trigger: Trigger) -> anyhow::Result<ScanOutcome> {
        let now = chrono::Utc::now();
        let status = self.calendar.status(now);
        let mode = trigger.mode();

        let closed_reason = if status.open {
            None
        } else if trigger == Trigger::Scheduled {
            tracing::info!(reason = ?status.reason, "Market closed, skipping scheduled scan");
            return Ok(ScanOutcome::Skipped {
                reason: status.reason,
            });
        } else {
            tracing::warn!(reason = ?status.reason, "Market closed, running manual scan anyway");
            Some(status.reason)
        };

        let mut telemetry = ScanTelemetry::default();

        let instruments = match self.universe.resolve().await {
            Ok(instruments) => instruments,
            Err(e) => {
                tracing::error!(error = %e, "Universe query failed, scanning empty universe");
                telemetry.universe_failed = true;
                Vec::new()
            }
        };
        telemetry.instruments = instruments.len();

        let signals = self
            .scan_instruments(&instruments, mode, &mut telemetry)
            .await;

        let report = OpportunityReport::build(
            signals,
            mode,
            self.calendar.local_now(now),
            self.config.report.cap,
            closed_reason,
        );
        telemetry.log_summary();

        self.dispatch(&report, trigger).await;

        Ok(ScanOutcome::Completed { report, telemetry })
    }

    /// Fan the universe out over the worker pool and collect signals back
    /// in universe order
    async fn scan_instruments(
        &self,
        instruments: &[Instrument],
        mode: ScanMode,
        telemetry: &mut ScanTelemetry,
    ) -> Vec<Signal> {
        let scan = &self.config.scan;
        let depth = match mode {
            ScanMode::Live => 1,
            ScanMode::Retrospective => scan.depth.max(1),
        };
        let min_bars = self
            .config
            .history
            .min_bars
            .max(self.config.channel.period + depth);

        let context = Arc::new(TaskContext {
            history: UdfClient::new(
                self.config.history.clone(),
                self.calendar.timezone(),
                Duration::from_millis(scan.min_request_gap_ms),
            ),
            period: self.config.channel.period,
            ema_fast: self.config.channel.ema_fast,
            ema_slow: self.config.channel.ema_slow,
            trend_filter: self.config.channel.trend_filter,
            strategy: scan.strategy,
            mode,
            depth,
            min_bars,
            deadline: Instant::now() + Duration::from_secs(scan.deadline_secs),
        });
        let semaphore = Arc::new(Semaphore::new(scan.max_concurrency.max(1)));

        let mut tasks: JoinSet<(usize, InstrumentOutcome)> = JoinSet::new();
        for (index, instrument) in instruments.iter().enumerate() {
            let context = Arc::clone(&context);
            let semaphore = Arc::clone(&semaphore);
            let instrument = instrument.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                (index, process_instrument(&context, &instrument).await)
            });
        }

        let mut slots: Vec<Option<InstrumentOutcome>> = Vec::new();
        slots.resize_with(instruments.len(), || None);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => tracing::error!(error = %e, "Instrument task failed"),
            }
        }

        // Deterministic report order: universe order, not completion order
        let mut signals = Vec::new();
        for (slot, instrument) in slots.into_iter().zip(instruments) {
            match slot {
                Some(InstrumentOutcome::Signal(signal)) => {
                    tracing::info!(
                        ticker = %signal.ticker,
                        kind = ?signal.kind,
                        price = %signal.price,
                        "Signal detected"
                    );
                    telemetry.record_signal();
                    signals.push(signal);
                }
                Some(InstrumentOutcome::NoSignal) => telemetry.record_no_signal(),
                Some(InstrumentOutcome::Failed(kind)) => {
                    tracing::debug!(ticker = %instrument.ticker, kind = ?kind, "Instrument skipped");
                    telemetry.record_failure(kind);
                }
                None => telemetry.record_failure(FailureKind::Fetch),
            }
        }
        signals
    }

    /// Deliver or log the report
    ///
    /// Matches the source behavior: an empty report is only delivered for
    /// manual runs; scheduled runs stay quiet when nothing was found.
    async fn dispatch(&self, report: &OpportunityReport, trigger: Trigger) {
        let text = report.render(self.config.report.price_decimals);

        let Some(notifier) = &self.notifier else {
            tracing::info!(report = %text, "Dispatch disabled, logging report");
            return;
        };

        if report.is_empty() && trigger == Trigger::Scheduled {
            tracing::info!("No opportunities, skipping scheduled dispatch");
            return;
        }

        if let Err(e) = notifier.broadcast(&text).await {
            tracing::error!(error = %e, "Report dispatch failed");
        }
    }
}

/// Fetch, annotate, and classify one instrument in isolation
async fn process_instrument(context: &TaskContext, instrument: &Instrument) -> InstrumentOutcome {
    // Deadline is enforced between instruments: work already started is
    // allowed to finish, unstarted work is cut off and counted
    if Instant::now() >= context.deadline {
        return InstrumentOutcome::Failed(FailureKind::Cutoff);
    }

    let series = match context
        .history
        .fetch(&instrument.ticker, &instrument.exchange, context.min_bars)
        .await
    {
        Ok(series) => series,
        Err(e) => {
            tracing::debug!(ticker = %instrument.ticker, error = %e, "History fetch failed");
            return InstrumentOutcome::Failed(FailureKind::from(&e));
        }
    };

    let states = annotate(&series, context.period);
    let trend = context
        .trend_filter
        .then(|| annotate_trend(&series, context.ema_fast, context.ema_slow));

    match classify(
        &series,
        &states,
        trend.as_deref(),
        context.strategy,
        context.mode,
        context.depth,
    ) {
        Some(signal) => InstrumentOutcome::Signal(signal),
        None => InstrumentOutcome::NoSignal,
    }
}
