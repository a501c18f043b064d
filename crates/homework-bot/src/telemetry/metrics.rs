//! Prometheus metrics for the Homework Bot
//!
//! - `homework_bot_polls_total` (counter) - Polls by result
//! - `homework_bot_status_changes_total` (counter) - Detected changes by status
//! - `homework_bot_notifications_total` (counter) - Messages by kind and result
//! - `homework_bot_last_success_timestamp_seconds` (gauge) - Last successful poll

use prometheus::{CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::error::{BotError, Result};

const NAMESPACE: &str = "homework_bot";

/// Bot metrics registered with a Prometheus registry
pub struct BotMetrics {
    registry: Arc<Registry>,
    polls_total: CounterVec,
    status_changes_total: CounterVec,
    notifications_total: CounterVec,
    last_success: Gauge,
}

impl BotMetrics {
    /// Create metrics with a fresh registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create metrics and register them with the provided registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let polls_total = CounterVec::new(
            Opts::new("polls_total", "Total number of status API polls").namespace(NAMESPACE),
            &["result"],
        )?;

        let status_changes_total = CounterVec::new(
            Opts::new("status_changes_total", "Detected homework status changes")
                .namespace(NAMESPACE),
            &["status"],
        )?;

        let notifications_total = CounterVec::new(
            Opts::new("notifications_total", "Chat messages by kind and result")
                .namespace(NAMESPACE),
            &["kind", "result"],
        )?;

        let last_success = Gauge::with_opts(
            Opts::new(
                "last_success_timestamp_seconds",
                "Unix time of the last successful poll",
            )
            .namespace(NAMESPACE),
        )?;

        registry.register(Box::new(polls_total.clone()))?;
        registry.register(Box::new(status_changes_total.clone()))?;
        registry.register(Box::new(notifications_total.clone()))?;
        registry.register(Box::new(last_success.clone()))?;

        Ok(Self {
            registry,
            polls_total,
            status_changes_total,
            notifications_total,
            last_success,
        })
    }

    /// Record a successful poll
    pub fn record_poll_success(&self, at: i64) {
        self.polls_total.with_label_values(&["success"]).inc();
        self.last_success.set(at as f64);
    }

    /// Record a failed poll
    pub fn record_poll_failure(&self, error_kind: &str) {
        self.polls_total.with_label_values(&[error_kind]).inc();
    }

    /// Record a detected status change
    pub fn record_status_change(&self, status: &str) {
        self.status_changes_total.with_label_values(&[status]).inc();
    }

    /// Record a delivery attempt; `kind` is `status` or `failure`
    pub fn record_notification(&self, kind: &str, delivered: bool) {
        let result = if delivered { "delivered" } else { "failed" };
        self.notifications_total.with_label_values(&[kind, result]).inc();
    }

    /// Number of polls recorded with the given result label
    pub fn polls(&self, result: &str) -> u64 {
        self.polls_total.with_label_values(&[result]).get() as u64
    }

    /// Number of notifications recorded with the given labels
    pub fn notifications(&self, kind: &str, result: &str) -> u64 {
        self.notifications_total.with_label_values(&[kind, result]).get() as u64
    }

    /// Encode all metrics in the Prometheus text format
    pub fn encode_text(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| BotError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_polls() {
        let metrics = BotMetrics::new().unwrap();
        metrics.record_poll_success(1_700_000_000);
        metrics.record_poll_success(1_700_000_600);
        metrics.record_poll_failure("network");

        assert_eq!(metrics.polls("success"), 2);
        assert_eq!(metrics.polls("network"), 1);
    }

    #[test]
    fn test_encode_text() {
        let metrics = BotMetrics::new().unwrap();
        metrics.record_status_change("approved");
        metrics.record_notification("status", true);

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("homework_bot_status_changes_total{status=\"approved\"} 1"));
        assert!(text.contains("homework_bot_notifications_total"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = Arc::new(Registry::new());
        assert!(BotMetrics::with_registry(registry.clone()).is_ok());
        assert!(BotMetrics::with_registry(registry).is_err());
    }
}
