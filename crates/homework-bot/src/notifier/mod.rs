//! Chat notifications
//!
//! Turns homework records into verdict messages and delivers them through
//! the Telegram Bot API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

use crate::config::BotConfig;
use crate::contracts::{Homework, HomeworkStatus};
use crate::error::{truncate_chars, BotError, Result};

/// Telegram rejects messages longer than this
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Build the notification text for a homework.
///
/// Fails with [`BotError::UnknownStatus`] if the status code has no verdict.
pub fn parse_status(homework: &Homework) -> Result<String> {
    let status: HomeworkStatus = homework.status.parse()?;
    Ok(format!(
        "Review status of \"{}\" changed. {}",
        homework.homework_name,
        status.verdict()
    ))
}

/// Trait for message delivery channels
pub trait Notifier: Send + Sync {
    /// Notifier identifier
    fn id(&self) -> &str;

    /// Deliver a text message to the configured chat
    fn send(&self, text: String) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Telegram Bot API notifier bound to a single chat
pub struct TelegramNotifier {
    base_url: String,
    token: String,
    chat_id: String,
    client: Client,
}

impl TelegramNotifier {
    /// Create new notifier
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            token: token.into(),
            chat_id: chat_id.into(),
            client,
        })
    }

    /// Create a notifier from bot configuration
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        Self::new(
            &config.telegram_api_url,
            &config.telegram_token,
            &config.chat_id,
            config.request_timeout,
        )
    }

    /// Send a message and log the outcome
    pub async fn send_message(&self, text: &str) -> Result<()> {
        match self.post_message(text).await {
            Ok(message_id) => {
                tracing::info!(chat_id = %self.chat_id, message_id, "Message delivered");
                Ok(())
            }
            Err(e) => {
                tracing::error!(chat_id = %self.chat_id, error = %e, "Failed to deliver message");
                Err(e)
            }
        }
    }

    async fn post_message(&self, text: &str) -> Result<i64> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let text = truncate_chars(text, MAX_MESSAGE_CHARS);
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text: &text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            // reqwest errors carry the URL, which contains the bot token
            .map_err(|e| BotError::telegram(e.without_url().to_string()))?;

        let status = response.status();
        let body: TelegramResponse = response
            .json()
            .await
            .map_err(|e| BotError::telegram(format!("unreadable response ({}): {}", status, e.without_url())))?;

        if !body.ok {
            return Err(BotError::telegram(format!(
                "{}: {}",
                body.error_code.unwrap_or(status.as_u16() as i64),
                body.description.unwrap_or_else(|| "no description".to_string())
            )));
        }

        Ok(body.result.and_then(|m| m.message_id).unwrap_or_default())
    }
}

impl Notifier for TelegramNotifier {
    fn id(&self) -> &str {
        "telegram"
    }

    fn send(&self, text: String) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move { self.send_message(&text).await })
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    #[serde(default)]
    message_id: Option<i64>,
}
