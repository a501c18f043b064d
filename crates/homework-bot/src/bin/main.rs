//! Homework Bot entry point
//!
//! Polls the homework status API and reports review status changes to Telegram.

use clap::{Parser, Subcommand};
use homework_bot::client::StatusClient;
use homework_bot::config::{load_dotenv, Settings};
use homework_bot::engine::{check_response, Poller};
use homework_bot::handler::{create_router, AppState};
use homework_bot::notifier::TelegramNotifier;
use homework_bot::telemetry::{init_logging, BotMetrics};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "homework-bot")]
#[command(about = "Homework Bot - forwards review status changes to Telegram")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Write JSON lines to stdout instead of plain text
    #[arg(long, global = true, env = "LOG_JSON")]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the status API and notify the chat on changes
    Run {
        /// Serve /health and /metrics on this address
        #[arg(long, env = "METRICS_ADDR")]
        metrics_addr: Option<SocketAddr>,

        /// Initial cursor (unix seconds), defaults to now
        #[arg(long)]
        from_date: Option<i64>,
    },

    /// Fetch and validate statuses once, print them, send nothing
    Check {
        /// Cursor (unix seconds), 0 means now
        #[arg(long, default_value_t = 0)]
        from_date: i64,
    },

    /// Send a single message to the configured chat
    Notify {
        /// Message text
        #[arg(short, long)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = load_dotenv();
    let cli = Cli::parse();

    init_logging(Some(&cli.settings.log_file), cli.json_logs)?;

    match dotenv {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Continuing without .env file"),
    }

    let config = match cli.settings.into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration, bot stopped");
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Run {
            metrics_addr,
            from_date,
        } => {
            let metrics = Arc::new(BotMetrics::new()?);

            if let Some(addr) = metrics_addr {
                let router = create_router(Arc::new(AppState::new(metrics.clone())));
                let listener = tokio::net::TcpListener::bind(addr).await?;
                tracing::info!("Serving health and metrics on {}", addr);
                tokio::spawn(async move {
                    if let Err(e) = axum::serve(listener, router).await {
                        tracing::error!(error = %e, "Metrics server failed");
                    }
                });
            }

            let client = StatusClient::from_config(&config)?;
            let notifier = TelegramNotifier::from_config(&config)?;
            let mut poller = Poller::new(client, Box::new(notifier), metrics, config.retry_time);
            if let Some(cursor) = from_date {
                poller = poller.with_cursor(cursor);
            }

            poller.run(shutdown_signal()).await;
        }

        Commands::Check { from_date } => {
            let client = StatusClient::from_config(&config)?;
            let result = client
                .get_api_answer(from_date)
                .await
                .and_then(|raw| check_response(&raw));

            match result {
                Ok(response) => println!("{}", serde_json::to_string_pretty(&response)?),
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Notify { text } => {
            let notifier = TelegramNotifier::from_config(&config)?;
            if notifier.send_message(&text).await.is_err() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
