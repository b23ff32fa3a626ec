//! Error types for the bot

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("price provider returned status {status} for {url}")]
    Provider { status: u16, url: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("subscriber not found: {0}")]
    SubscriberNotFound(String),
}
