//! Scan command implementation

use crate::config::Config;
use crate::notify::{Notifier, TelegramNotifier};
use crate::pipeline::{ScanOutcome, Scanner, Trigger};
use clap::{Args, ValueEnum};
use std::sync::Arc;

/// CLI surface of the trigger source
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TriggerArg {
    /// Scheduled invocation: live mode, skips closed markets
    Schedule,
    /// Manual invocation: retrospective mode, runs regardless
    Manual,
}

impl From<TriggerArg> for Trigger {
    fn from(arg: TriggerArg) -> Self {
        match arg {
            TriggerArg::Schedule => Trigger::Scheduled,
            TriggerArg::Manual => Trigger::Manual,
        }
    }
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// What triggered this run
    #[arg(long, value_enum, default_value_t = TriggerArg::Manual)]
    pub trigger: TriggerArg,

    /// Render and log the report without dispatching it
    #[arg(long)]
    pub dry_run: bool,
}

impl ScanArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let notifier: Option<Arc<dyn Notifier>> = if self.dry_run {
            tracing::info!("Dry run, dispatch disabled");
            None
        } else {
            match TelegramNotifier::new(config.telegram.clone()) {
                Ok(notifier) => Some(Arc::new(notifier)),
                Err(e) => {
                    // Fatal only to dispatch: the scan still runs and logs
                    tracing::error!(error = %e, "Notifier unavailable, report will only be logged");
                    None
                }
            }
        };

        let scanner = Scanner::new(config, notifier)?;
        match scanner.run(self.trigger.into()).await? {
            ScanOutcome::Skipped { reason } => {
                tracing::info!(reason = ?reason, "Scan skipped");
            }
            ScanOutcome::Completed { report, telemetry } => {
                tracing::info!(
                    total_detected = report.total_detected,
                    reported = report.signals.len(),
                    skipped = telemetry.skipped(),
                    "Scan finished"
                );
            }
        }
        Ok(())
    }
}
