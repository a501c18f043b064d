//! Homework Bot
//!
//! Polls the homework review status API and forwards status changes to a
//! Telegram chat.
//!
//! The loop is fetch, validate, compare with the last reported homework,
//! format the verdict, send, sleep. Failures are logged and reported to the
//! same chat; the next poll happens after the usual delay.

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod notifier;
pub mod telemetry;

#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use contracts::*;
pub use error::{BotError, Result};

/// Bot version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
