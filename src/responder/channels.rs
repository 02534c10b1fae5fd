//! Outbound delivery seams.

use async_trait::async_trait;

use crate::error::DeliveryError;

/// The operator's chat: notifications and command replies.
#[async_trait]
pub trait OperatorChannel: Send + Sync {
    async fn notify(&self, text: &str) -> Result<(), DeliveryError>;
}

/// Replies to the customer who wrote in.
#[async_trait]
pub trait CustomerChannel: Send + Sync {
    async fn send(&self, to: &str, text: &str) -> Result<(), DeliveryError>;
}
