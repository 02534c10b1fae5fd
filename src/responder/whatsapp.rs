//! Customer replies through the Twilio WhatsApp Messages API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::TwilioConfig;
use crate::error::DeliveryError;
use crate::responder::channels::CustomerChannel;

const TWILIO_API_URL: &str = "https://api.twilio.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct SendRequest<'a> {
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "Body")]
    body: &'a str,
}

pub struct TwilioClient {
    config: TwilioConfig,
    base_url: String,
    client: reqwest::Client,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Result<Self, DeliveryError> {
        Self::with_base_url(config, TWILIO_API_URL)
    }

    pub fn with_base_url(config: TwilioConfig, base_url: &str) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.config.account_sid
        )
    }
}

#[async_trait]
impl CustomerChannel for TwilioClient {
    async fn send(&self, to: &str, text: &str) -> Result<(), DeliveryError> {
        let request = SendRequest {
            from: &self.config.from_number,
            to,
            body: text,
        };

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&request)
            .send()
            .await?;

        let status = response.status();
        debug!("Twilio response status: {status}");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Api { status: status.as_u16(), body });
        }

        info!("💬 Reply sent to {to}");
        Ok(())
    }
}
