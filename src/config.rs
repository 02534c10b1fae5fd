use std::collections::HashMap;
use std::path::PathBuf;

use chrono_tz::Tz;
use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_PATH: &str = "bot_settings.db";
const DEFAULT_LOG_DIR: &str = "logs";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set or is empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    /// A variable is set but cannot be parsed.
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
    /// Validation error.
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Twilio credentials for the WhatsApp sender.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender identity, e.g. `whatsapp:+14155238886`.
    pub from_number: String,
}

pub struct Config {
    pub telegram_token: String,
    /// The only chat allowed to issue admin commands; also receives notifications.
    pub operator_chat_id: i64,
    pub twilio: TwilioConfig,
    pub port: u16,
    pub database_path: PathBuf,
    /// Zone used for working hours. `None` means server local time.
    pub timezone: Option<Tz>,
    /// Public base URL; when set the Telegram webhook is registered on startup.
    pub public_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub log_dir: PathBuf,
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let telegram_token = require("TELEGRAM_TOKEN")?;
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let valid_token = matches!(
            telegram_token.split_once(':'),
            Some((id, secret)) if id.parse::<u64>().is_ok() && !secret.is_empty()
        );
        if !valid_token {
            return Err(ConfigError::Validation(
                "TELEGRAM_TOKEN appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
            ));
        }

        let chat_id = require("TELEGRAM_CHAT_ID")?;
        let operator_chat_id = chat_id.parse::<i64>().map_err(|_| ConfigError::Invalid {
            name: "TELEGRAM_CHAT_ID",
            value: chat_id.clone(),
        })?;

        let twilio = TwilioConfig {
            account_sid: require("TWILIO_ACCOUNT_SID")?,
            auth_token: require("TWILIO_AUTH_TOKEN")?,
            from_number: require("TWILIO_WHATSAPP_NUMBER")?,
        };

        let port = match get("PORT") {
            Some(p) => p.parse::<u16>().map_err(|_| ConfigError::Invalid { name: "PORT", value: p })?,
            None => DEFAULT_PORT,
        };

        let timezone = match get("TIMEZONE") {
            Some(tz) => Some(tz.parse::<Tz>().map_err(|_| ConfigError::Invalid {
                name: "TIMEZONE",
                value: tz,
            })?),
            None => None,
        };

        let public_url = get("PUBLIC_URL").map(|u| u.trim_end_matches('/').to_string());
        if let Some(ref url) = public_url
            && reqwest::Url::parse(url).is_err()
        {
            return Err(ConfigError::Invalid { name: "PUBLIC_URL", value: url.clone() });
        }

        Ok(Self {
            telegram_token,
            operator_chat_id,
            twilio,
            port,
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            timezone,
            public_url,
            webhook_secret: get("TELEGRAM_WEBHOOK_SECRET"),
            log_dir: get("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
        })
    }

    /// URL the Telegram webhook should point at, if a public URL is configured.
    pub fn telegram_webhook_url(&self) -> Option<String> {
        self.public_url.as_ref().map(|base| format!("{base}/telegram"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        [
            ("TELEGRAM_TOKEN", "123456789:ABCdefGHIjklMNOpqrsTUVwxyz"),
            ("TELEGRAM_CHAT_ID", "424242"),
            ("TWILIO_ACCOUNT_SID", "AC0123"),
            ("TWILIO_AUTH_TOKEN", "secret"),
            ("TWILIO_WHATSAPP_NUMBER", "whatsapp:+14155238886"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_valid_config_with_defaults() {
        let config = Config::from_vars(&base_vars()).expect("should load valid config");
        assert_eq!(config.operator_chat_id, 424242);
        assert_eq!(config.port, 5000);
        assert_eq!(config.database_path, PathBuf::from("bot_settings.db"));
        assert!(config.timezone.is_none());
        assert!(config.telegram_webhook_url().is_none());
    }

    #[test]
    fn test_optional_values() {
        let mut vars = base_vars();
        vars.insert("PORT".into(), "8080".into());
        vars.insert("TIMEZONE".into(), "Europe/Moscow".into());
        vars.insert("PUBLIC_URL".into(), "https://bot.example.com/".into());
        vars.insert("DATABASE_PATH".into(), "/tmp/x.db".into());

        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.timezone, Some(chrono_tz::Europe::Moscow));
        assert_eq!(
            config.telegram_webhook_url().as_deref(),
            Some("https://bot.example.com/telegram")
        );
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn test_missing_token() {
        let mut vars = base_vars();
        vars.remove("TELEGRAM_TOKEN");
        let err = assert_err(Config::from_vars(&vars));
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_TOKEN")));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut vars = base_vars();
        vars.insert("TWILIO_AUTH_TOKEN".into(), "   ".into());
        let err = assert_err(Config::from_vars(&vars));
        assert!(matches!(err, ConfigError::Missing("TWILIO_AUTH_TOKEN")));
    }

    #[test]
    fn test_invalid_token_format() {
        for token in ["no_colon", "notanumber:ABC", "123456789:"] {
            let mut vars = base_vars();
            vars.insert("TELEGRAM_TOKEN".into(), token.into());
            let err = assert_err(Config::from_vars(&vars));
            assert!(matches!(err, ConfigError::Validation(_)), "token {token}");
        }
    }

    #[test]
    fn test_invalid_chat_id() {
        let mut vars = base_vars();
        vars.insert("TELEGRAM_CHAT_ID".into(), "@brother".into());
        let err = assert_err(Config::from_vars(&vars));
        assert!(err.to_string().contains("TELEGRAM_CHAT_ID"));
    }

    #[test]
    fn test_invalid_port_and_timezone() {
        let mut vars = base_vars();
        vars.insert("PORT".into(), "99999".into());
        assert!(matches!(
            assert_err(Config::from_vars(&vars)),
            ConfigError::Invalid { name: "PORT", .. }
        ));

        let mut vars = base_vars();
        vars.insert("TIMEZONE".into(), "Mars/Olympus".into());
        assert!(matches!(
            assert_err(Config::from_vars(&vars)),
            ConfigError::Invalid { name: "TIMEZONE", .. }
        ));
    }
}
