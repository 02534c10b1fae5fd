//! Error types shared by the store and the outbound channels.

use thiserror::Error;

/// Errors raised by the SQLite store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Errors raised while delivering a message to the operator or a customer.
///
/// These are logged and dropped by the responder. Nothing is retried.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Transport-level failure talking to the provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The Telegram Bot API rejected or failed the request.
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}
