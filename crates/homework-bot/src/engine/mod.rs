//! Polling engine
//!
//! Fetches the status API on a fixed interval, validates the answer and
//! notifies the chat when the most recent homework changed.

mod validator;

pub use validator::check_response;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::client::StatusClient;
use crate::contracts::Homework;
use crate::error::{BotError, Result};
use crate::notifier::{parse_status, Notifier};
use crate::telemetry::BotMetrics;

/// Result of a single poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The API reported no homeworks since the cursor
    NoUpdates,
    /// The most recent homework is the one already reported
    Unchanged,
    /// A status change was delivered to the chat
    Notified { homework_name: String, status: String },
}

/// Mutable loop state
#[derive(Debug, Clone, Default)]
pub struct PollState {
    /// `from_date` sent with the next request
    pub cursor: i64,
    /// Most recent homework already reported
    pub last_seen: Option<Homework>,
    /// Text of the last failure sent to the chat
    pub last_error: Option<String>,
}

/// Status poller
pub struct Poller {
    client: StatusClient,
    notifier: Box<dyn Notifier>,
    metrics: Arc<BotMetrics>,
    retry_time: Duration,
    state: PollState,
}

impl Poller {
    /// Create a poller starting from the current time
    pub fn new(
        client: StatusClient,
        notifier: Box<dyn Notifier>,
        metrics: Arc<BotMetrics>,
        retry_time: Duration,
    ) -> Self {
        Self {
            client,
            notifier,
            metrics,
            retry_time,
            state: PollState {
                cursor: chrono::Utc::now().timestamp(),
                ..Default::default()
            },
        }
    }

    /// Start from an explicit cursor instead of the current time
    pub fn with_cursor(mut self, cursor: i64) -> Self {
        self.state.cursor = cursor;
        self
    }

    /// Current loop state
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Fetch, validate, compare and notify once.
    ///
    /// The cursor only advances when the iteration succeeded, so a change
    /// whose delivery failed is fetched and sent again on the next poll.
    pub async fn poll_once(&mut self) -> Result<PollOutcome> {
        let raw = self.client.get_api_answer(self.state.cursor).await?;
        let response = check_response(&raw)?;

        let outcome = match response.latest() {
            None => PollOutcome::NoUpdates,
            Some(latest) if self.state.last_seen.as_ref() == Some(latest) => PollOutcome::Unchanged,
            Some(latest) => {
                let message = parse_status(latest)?;
                self.metrics.record_status_change(&latest.status);

                let delivered = self.notifier.send(message).await;
                self.metrics.record_notification("status", delivered.is_ok());
                delivered?;

                tracing::info!(
                    homework = %latest.homework_name,
                    status = %latest.status,
                    "Status change reported"
                );
                self.state.last_seen = Some(latest.clone());
                PollOutcome::Notified {
                    homework_name: latest.homework_name.clone(),
                    status: latest.status.clone(),
                }
            }
        };

        let now = chrono::Utc::now().timestamp();
        self.state.cursor = response.current_date.unwrap_or(now);
        self.state.last_error = None;
        self.metrics.record_poll_success(now);

        Ok(outcome)
    }

    /// Report a failed iteration to the chat.
    ///
    /// Repeated identical failures are only logged.
    pub async fn report_failure(&mut self, error: &BotError) {
        self.metrics.record_poll_failure(error.kind());
        tracing::error!(error = %error, transient = error.is_transient(), "Poll failed");

        let message = format!("Program failure: {}", error);
        if self.state.last_error.as_deref() == Some(message.as_str()) {
            tracing::debug!("Failure already reported, not sending again");
            return;
        }

        let delivered = self.notifier.send(message.clone()).await;
        self.metrics.record_notification("failure", delivered.is_ok());
        if delivered.is_ok() {
            self.state.last_error = Some(message);
        }
    }

    /// Run until `shutdown` resolves, sleeping `retry_time` between polls
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(
            notifier = self.notifier.id(),
            retry_secs = self.retry_time.as_secs(),
            cursor = self.state.cursor,
            "Poller started"
        );

        loop {
            match self.poll_once().await {
                Ok(outcome) => tracing::debug!(?outcome, cursor = self.state.cursor, "Poll complete"),
                Err(e) => self.report_failure(&e).await,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.retry_time) => {}
                _ = &mut shutdown => {
                    tracing::info!("Poller stopped");
                    return;
                }
            }
        }
    }
}
