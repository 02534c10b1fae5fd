mod config;
mod error;
mod responder;
mod server;

use std::sync::Arc;

use anyhow::Context;
use teloxide::Bot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use config::Config;
use responder::{Clock, Database, Responder, TelegramNotifier, TwilioClient};
use server::AppState;

/// `RUST_LOG` if set, otherwise `info`.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    // Setup logging
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log dir {:?}", config.log_dir))?;
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "autoreplier.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(env_filter()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(env_filter()),
        )
        .init();

    info!("🚀 Starting autoreplier...");
    info!("Operator chat: {}", config.operator_chat_id);

    let db = Database::open(&config.database_path)
        .with_context(|| format!("Failed to open database {:?}", config.database_path))?;

    let bot = Bot::new(&config.telegram_token);
    let operator = Arc::new(TelegramNotifier::new(bot, config.operator_chat_id));
    let customer = Arc::new(
        TwilioClient::new(config.twilio.clone()).context("Failed to build Twilio client")?,
    );

    if let Some(url) = config.telegram_webhook_url() {
        if let Err(e) = operator
            .register_webhook(&url, config.webhook_secret.as_deref())
            .await
        {
            warn!("{e}");
        }
    } else {
        info!("PUBLIC_URL not set, Telegram webhook must be registered manually");
    }

    let clock = match config.timezone {
        Some(tz) => {
            info!("Working hours evaluated in {tz}");
            Clock::Zone(tz)
        }
        None => Clock::Local,
    };

    let responder = Responder::new(db, operator, customer, config.operator_chat_id, clock);
    let state = AppState {
        responder: Arc::new(responder),
        webhook_secret: config.webhook_secret.clone(),
    };

    server::serve(config.port, state)
        .await
        .context("HTTP server failed")?;
    Ok(())
}
