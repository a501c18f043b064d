//! Bot configuration
//!
//! Settings are read from CLI flags with environment fallbacks. A `.env`
//! file in the working directory is loaded first by [`load_dotenv`], so any
//! variable it defines behaves like a real environment variable.

use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BotError, Result};

/// Default status API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Default Telegram Bot API base URL
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

/// Default delay between polls in seconds
pub const DEFAULT_RETRY_SECS: u64 = 600;

/// Raw settings as parsed from flags and environment
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// OAuth token for the status API
    #[arg(long, env = "TOKEN_PR", hide_env_values = true)]
    pub practicum_token: Option<String>,

    /// Telegram bot token
    #[arg(long, env = "TOKEN_TG", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Chat that receives notifications
    #[arg(long, env = "CHAT_ID")]
    pub chat_id: Option<String>,

    /// Status API endpoint
    #[arg(long, env = "HOMEWORK_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Telegram Bot API base URL
    #[arg(long, env = "TELEGRAM_API_URL", default_value = DEFAULT_TELEGRAM_API)]
    pub telegram_api_url: String,

    /// Seconds between polls
    #[arg(long, env = "RETRY_TIME", default_value_t = DEFAULT_RETRY_SECS)]
    pub retry_time: u64,

    /// HTTP request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    pub request_timeout_ms: u64,

    /// Log file, appended to on every run
    #[arg(long, env = "LOG_FILE", default_value = "program.log")]
    pub log_file: PathBuf,
}

/// Validated bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub practicum_token: String,
    pub telegram_token: String,
    pub chat_id: String,
    pub endpoint: String,
    pub telegram_api_url: String,
    pub retry_time: Duration,
    pub request_timeout: Duration,
}

impl BotConfig {
    /// Build a config with default endpoints and intervals
    pub fn new(
        practicum_token: impl Into<String>,
        telegram_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            practicum_token: practicum_token.into(),
            telegram_token: telegram_token.into(),
            chat_id: chat_id.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            telegram_api_url: DEFAULT_TELEGRAM_API.to_string(),
            retry_time: Duration::from_secs(DEFAULT_RETRY_SECS),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Override the status API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the Telegram API base URL
    pub fn with_telegram_api_url(mut self, url: impl Into<String>) -> Self {
        self.telegram_api_url = url.into();
        self
    }

    /// Override the poll interval
    pub fn with_retry_time(mut self, retry_time: Duration) -> Self {
        self.retry_time = retry_time;
        self
    }
}

impl Settings {
    /// Check that every required token is present and non-empty.
    ///
    /// Missing variables are logged at error level before returning.
    pub fn check_tokens(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("TOKEN_PR", &self.practicum_token),
            ("TOKEN_TG", &self.telegram_token),
            ("CHAT_ID", &self.chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            return Ok(());
        }

        let names = missing.join(", ");
        tracing::error!(missing = %names, "Required environment variables are not set");
        Err(BotError::MissingVariable(names))
    }

    /// Validate settings into a [`BotConfig`]
    pub fn into_config(self) -> Result<BotConfig> {
        self.check_tokens()?;

        if self.retry_time == 0 {
            return Err(BotError::config("RETRY_TIME must be greater than zero"));
        }
        if !self.endpoint.starts_with("http") {
            return Err(BotError::config(format!(
                "HOMEWORK_ENDPOINT must be an http(s) URL, got {}",
                self.endpoint
            )));
        }

        Ok(BotConfig {
            practicum_token: self.practicum_token.unwrap_or_default(),
            telegram_token: self.telegram_token.unwrap_or_default(),
            chat_id: self.chat_id.unwrap_or_default(),
            endpoint: self.endpoint,
            telegram_api_url: self.telegram_api_url.trim_end_matches('/').to_string(),
            retry_time: Duration::from_secs(self.retry_time),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        })
    }
}

/// Load `.env` from the working directory if present.
///
/// Returns the loaded path, or `None` when there is no `.env` file. Runs
/// before logging is set up, so the caller logs the outcome.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(BotError::config(format!("Failed to load .env file: {}", e))),
    }
}

/// Load variables from an explicit env file
pub fn load_dotenv_file(path: &Path) -> Result<()> {
    dotenvy::from_path(path)
        .map_err(|e| BotError::config(format!("Failed to load {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            practicum_token: Some("pr-token".to_string()),
            telegram_token: Some("tg-token".to_string()),
            chat_id: Some("123456".to_string()),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            telegram_api_url: format!("{}/", DEFAULT_TELEGRAM_API),
            retry_time: DEFAULT_RETRY_SECS,
            request_timeout_ms: 10_000,
            log_file: PathBuf::from("program.log"),
        }
    }

    #[test]
    fn test_check_tokens_ok() {
        assert!(settings().check_tokens().is_ok());
    }

    #[test]
    fn test_check_tokens_reports_all_missing() {
        let mut s = settings();
        s.practicum_token = None;
        s.chat_id = Some("   ".to_string());

        match s.check_tokens() {
            Err(BotError::MissingVariable(names)) => assert_eq!(names, "TOKEN_PR, CHAT_ID"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_into_config() {
        let config = settings().into_config().unwrap();
        assert_eq!(config.retry_time, Duration::from_secs(600));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.telegram_api_url, DEFAULT_TELEGRAM_API);
        assert_eq!(config.chat_id, "123456");
    }

    #[test]
    fn test_config_builder() {
        let config = BotConfig::new("pr", "tg", "-100200");
        assert_eq!(config.telegram_api_url, DEFAULT_TELEGRAM_API);

        let config = config
            .with_endpoint("http://localhost:9000/statuses/")
            .with_telegram_api_url("http://localhost:9001")
            .with_retry_time(Duration::from_secs(30));

        assert_eq!(config.endpoint, "http://localhost:9000/statuses/");
        assert_eq!(config.telegram_api_url, "http://localhost:9001");
        assert_eq!(config.retry_time, Duration::from_secs(30));
    }

    #[test]
    fn test_load_dotenv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "HOMEWORK_BOT_DOTENV_CHECK=from-file\n").unwrap();

        load_dotenv_file(&path).unwrap();
        assert_eq!(std::env::var("HOMEWORK_BOT_DOTENV_CHECK").unwrap(), "from-file");
    }

    #[test]
    fn test_load_dotenv_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dotenv_file(&dir.path().join("absent.env")).unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
    }

    #[test]
    fn test_zero_retry_time_rejected() {
        let mut s = settings();
        s.retry_time = 0;
        assert!(matches!(s.into_config(), Err(BotError::Config(_))));
    }
}
