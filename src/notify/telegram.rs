//! Telegram bot transport

use super::{DispatchError, Notifier};
use crate::config::TelegramConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Telegram `sendMessage` notifier
#[derive(Debug)]
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
}

/// `sendMessage` request body
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

impl TelegramNotifier {
    /// Create a notifier, validating the transport configuration
    pub fn new(config: TelegramConfig) -> Result<Self, DispatchError> {
        if config.bot_token.is_empty() {
            return Err(DispatchError::NotConfigured("bot token missing"));
        }
        if config.destinations.is_empty() {
            return Err(DispatchError::NotConfigured("no destinations"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self { config, client })
    }

    /// Send to a single chat destination
    async fn send_to(&self, destination: &str, text: &str) -> Result<(), String> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.base_url, self.config.bot_token
        );
        let body = SendMessage {
            chat_id: destination,
            text,
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(format!("status {status}: {detail}"));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn broadcast(&self, text: &str) -> Result<(), DispatchError> {
        let mut failed = 0usize;

        for destination in &self.config.destinations {
            match self.send_to(destination, text).await {
                Ok(()) => {
                    tracing::debug!(destination = %destination, "Report delivered");
                }
                Err(reason) => {
                    failed += 1;
                    tracing::warn!(
                        destination = %destination,
                        reason = %reason,
                        "Report delivery failed"
                    );
                }
            }
        }

        let total = self.config.destinations.len();
        if failed == total {
            return Err(DispatchError::AllDestinationsFailed(total));
        }

        tracing::info!(
            delivered = total - failed,
            failed,
            "Report dispatched"
        );
        Ok(())
    }
}
