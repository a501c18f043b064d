//! Error types for the Homework Bot
//!
//! One error enum covers configuration, the status API, response validation
//! and Telegram delivery.

use thiserror::Error;

/// Main error type for bot operations
#[derive(Error, Debug)]
pub enum BotError {
    /// Required environment variable missing or empty
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Status API could not be reached
    #[error("Status API unreachable: {0}")]
    Network(String),

    /// Status API answered with a non-200 status
    #[error("Status API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Response decoded but does not have the expected shape
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Status code outside the known set
    #[error("Unknown homework status: {0}")]
    UnknownStatus(String),

    /// Telegram message could not be delivered
    #[error("Telegram delivery failed: {0}")]
    Telegram(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl BotError {
    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        BotError::InvalidResponse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        BotError::Config(msg.into())
    }

    /// Create a status API error, keeping at most [`MAX_BODY_CHARS`] of the body
    pub fn api(status: u16, body: &str) -> Self {
        BotError::Api {
            status,
            body: truncate_chars(body, MAX_BODY_CHARS),
        }
    }

    /// Create a Telegram delivery error
    pub fn telegram(msg: impl Into<String>) -> Self {
        BotError::Telegram(msg.into())
    }

    /// Whether the next poll may succeed without intervention
    pub fn is_transient(&self) -> bool {
        match self {
            BotError::Network(_) | BotError::Telegram(_) => true,
            BotError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            BotError::MissingVariable(_) => "missing_variable",
            BotError::Config(_) => "config",
            BotError::Network(_) => "network",
            BotError::Api { .. } => "api",
            BotError::Parse(_) => "parse",
            BotError::InvalidResponse(_) => "invalid_response",
            BotError::UnknownStatus(_) => "unknown_status",
            BotError::Telegram(_) => "telegram",
            BotError::Metrics(_) => "metrics",
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Parse(format!("JSON error: {}", err))
    }
}

/// Longest response body kept in [`BotError::Api`]
pub const MAX_BODY_CHARS: usize = 512;

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BotError::Api {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "Status API returned 503: maintenance");

        let err = BotError::UnknownStatus("graded".to_string());
        assert_eq!(err.to_string(), "Unknown homework status: graded");
    }

    #[test]
    fn test_is_transient() {
        assert!(BotError::Network("reset".to_string()).is_transient());
        assert!(BotError::Api { status: 502, body: String::new() }.is_transient());
        assert!(BotError::Api { status: 429, body: String::new() }.is_transient());
        assert!(!BotError::Api { status: 401, body: String::new() }.is_transient());
        assert!(!BotError::invalid_response("no homeworks").is_transient());
    }

    #[test]
    fn test_api_error_body_truncated() {
        let err = BotError::api(502, &"x".repeat(5000));
        match err {
            BotError::Api { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body.chars().count(), MAX_BODY_CHARS);
                assert!(body.ends_with('…'));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("привет мир", 4), "при…");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(BotError::invalid_response("x"), BotError::InvalidResponse(_)));
        assert!(matches!(BotError::config("x"), BotError::Config(_)));
        assert!(matches!(BotError::telegram("x"), BotError::Telegram(_)));
        assert_eq!(BotError::telegram("x").kind(), "telegram");
    }
}
