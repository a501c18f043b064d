//! Telemetry for the Homework Bot
//!
//! - `metrics` - Prometheus counters for polls and notifications
//! - [`init_logging`] - tracing subscriber writing to stdout and a log file

pub mod metrics;

pub use metrics::BotMetrics;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{BotError, Result};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info,homework_bot=debug";

/// Initialize logging to stdout and, when given, an append-only log file.
///
/// `json` switches the stdout layer to JSON lines; the file is always plain
/// text without colors.
pub fn init_logging(log_file: Option<&Path>, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    BotError::config(format!("Cannot open log file {}: {}", path.display(), e))
                })?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let (plain, structured) = if json {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .with(file_layer)
        .try_init()
        .map_err(|e| BotError::config(format!("Failed to initialize logging: {}", e)))
}
