//! Telegram Bot API notifier

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{instrument, warn};

use super::messages::SessionEvent;
use crate::common::errors::{BotError, Result};
use crate::common::traits::Notifier;
use crate::common::types::SessionId;
use crate::config::types::TelegramConfig;

/// The JSON payload for the Telegram `sendMessage` endpoint.
#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// A client for sending session messages to a Telegram chat.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Creates a new `TelegramNotifier`.
    ///
    /// Returns `None` if the token or chat_id is missing from the configuration,
    /// so callers can fall back to another channel.
    pub fn new(config: &TelegramConfig, timeout: Duration) -> Result<Option<Self>> {
        if config.token.is_empty() || config.chat_id.is_empty() {
            warn!("Telegram notifier is not configured (missing token or chat_id).");
            return Ok(None);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Internal(e.to_string()))?;

        Ok(Some(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
        }))
    }

    /// Sends a text message to the configured chat.
    #[instrument(skip(self, text))]
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.token);

        let payload = SendMessagePayload {
            chat_id: &self.chat_id,
            text,
        };

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(BotError::Notification(format!(
                "Telegram returned status {}: {}",
                status, error_text
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, session_id: SessionId, event: &SessionEvent) -> Result<()> {
        self.send_message(&format!("[{}] {}", session_id, event)).await
    }

    fn channel_name(&self) -> &'static str {
        "telegram"
    }
}
