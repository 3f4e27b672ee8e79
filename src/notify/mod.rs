//! Report delivery
//!
//! One rendered report text goes out to every configured destination.
//! Destinations fail independently; a scan is never aborted by delivery.

mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use thiserror::Error;

/// Delivery failures
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Credentials or destinations missing; dispatch cannot run at all
    #[error("Notifier not configured: {0}")]
    NotConfigured(&'static str),
    /// Every destination failed; partial failures are only logged
    #[error("Delivery failed for all {0} destinations")]
    AllDestinationsFailed(usize),
}

/// Trait for notification transports
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the text to every destination
    ///
    /// Per-destination failures are logged and do not block the others;
    /// an error is returned only when nothing was delivered.
    async fn broadcast(&self, text: &str) -> Result<(), DispatchError>;
}
