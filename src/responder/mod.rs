//! Responder module - WhatsApp auto-replies configured from Telegram.

pub mod channels;
pub mod commands;
pub mod database;
pub mod engine;
pub mod format;
pub mod schedule;
pub mod settings;
pub mod telegram;
pub mod whatsapp;


pub use channels::{CustomerChannel, OperatorChannel};
pub use database::Database;
pub use engine::{InboundOutcome, Responder};
pub use schedule::Clock;
pub use telegram::TelegramNotifier;
pub use whatsapp::TwilioClient;
