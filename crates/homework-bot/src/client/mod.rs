//! Client for the homework status API

use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::config::BotConfig;
use crate::error::{BotError, Result};

/// Homework status API client
pub struct StatusClient {
    endpoint: String,
    token: String,
    client: Client,
}

impl StatusClient {
    /// Create new client
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        })
    }

    /// Create a client from bot configuration
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        Self::new(&config.endpoint, &config.practicum_token, config.request_timeout)
    }

    /// Request homework statuses changed since `from_date`.
    ///
    /// A cursor of 0 is replaced with the current time. The body is returned
    /// undecoded into types so the caller can validate its shape.
    pub async fn get_api_answer(&self, from_date: i64) -> Result<serde_json::Value> {
        let from_date = if from_date == 0 {
            chrono::Utc::now().timestamp()
        } else {
            from_date
        };

        tracing::debug!(endpoint = %self.endpoint, from_date, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::api(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))
    }
}
