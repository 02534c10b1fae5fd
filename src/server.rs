//! HTTP surface: provider webhooks and the liveness endpoint.
//!
//! Both webhooks always answer `200` with an empty body. Providers only
//! care that we received the callback; what we did with it is logged.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::responder::Responder;

pub const HEALTH_TEXT: &str = "WhatsApp Bot is running! 🤖";
const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<Responder>,
    /// Expected value of the Telegram secret-token header, if any.
    pub webhook_secret: Option<String>,
}

/// Twilio's inbound message callback (only the fields we use).
#[derive(Debug, Deserialize)]
pub struct WhatsAppForm {
    #[serde(rename = "From", default)]
    from: String,
    #[serde(rename = "Body", default)]
    body: String,
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: TelegramChat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/whatsapp", post(whatsapp_webhook))
        .route("/telegram", post(telegram_webhook))
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(port: u16, state: AppState) -> Result<(), std::io::Error> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Listening on {addr}");
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await
}

async fn health() -> &'static str {
    HEALTH_TEXT
}

async fn whatsapp_webhook(
    State(state): State<AppState>,
    form: Result<Form<WhatsAppForm>, FormRejection>,
) -> StatusCode {
    let Form(form) = match form {
        Ok(form) => form,
        Err(e) => {
            warn!("Ignoring malformed WhatsApp webhook: {e}");
            return StatusCode::OK;
        }
    };

    if form.from.is_empty() {
        warn!("Ignoring WhatsApp webhook without sender");
        return StatusCode::OK;
    }

    let body = form.body.trim();
    match state.responder.handle_inbound(&form.from, body).await {
        Ok(outcome) => info!("Handled message from {}: {:?}", form.from, outcome),
        Err(e) => error!("Failed to handle message from {}: {e}", form.from),
    }
    StatusCode::OK
}

async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(ref expected) = state.webhook_secret {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            warn!("Ignoring Telegram webhook with wrong secret token");
            return StatusCode::OK;
        }
    }

    let update: TelegramUpdate = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Ignoring undecodable Telegram update: {e}");
            return StatusCode::OK;
        }
    };

    let Some(message) = update.message else {
        return StatusCode::OK;
    };
    let text = message.text.unwrap_or_default();

    if let Err(e) = state.responder.handle_admin(message.chat.id, &text).await {
        error!("Failed to handle operator command: {e}");
    }
    StatusCode::OK
}
