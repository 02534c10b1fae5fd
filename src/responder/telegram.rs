//! Operator notifications through the Telegram Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::info;

use crate::error::DeliveryError;
use crate::responder::channels::OperatorChannel;

/// Sends HTML messages to the single operator chat. Texts are sent as
/// given; `format` keeps them within Telegram's length limit.
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat_id: i64) -> Self {
        Self { bot, chat_id: ChatId(chat_id) }
    }

    /// Point Telegram at our `/telegram` endpoint.
    pub async fn register_webhook(&self, url: &str, secret: Option<&str>) -> Result<(), String> {
        let url = reqwest::Url::parse(url).map_err(|e| format!("Invalid webhook URL: {e}"))?;
        let mut request = self.bot.set_webhook(url.clone());
        if let Some(secret) = secret {
            request = request.secret_token(secret.to_string());
        }
        request
            .await
            .map_err(|e| format!("Failed to register webhook: {e}"))?;
        info!("Telegram webhook registered at {url}");
        Ok(())
    }
}

#[async_trait]
impl OperatorChannel for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}
