//! Outbound alert delivery
//!
//! Telegram Bot API sink plus the opportunity message formatter. Delivery
//! is addressed per subscriber chat; the scan engine never knows which
//! transport is behind the trait.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::{BotError, Result};
use crate::types::ArbitrageOpportunity;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()>;
}

/// Delivers alerts through the Telegram Bot API.
pub struct TelegramNotifier {
    http: Client,
    bot_token: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    pub fn new(bot_token: String) -> Self {
        Self {
            http: Client::new(),
            bot_token,
        }
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );
        let req = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let resp = self.http.post(&url).json(&req).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::Telegram(format!(
                "sendMessage returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

/// Sink used when no bot token is configured.
pub struct DisabledNotifier;

#[async_trait]
impl NotificationSink for DisabledNotifier {
    async fn send(&self, chat_id: &str, _text: &str) -> Result<()> {
        debug!("notifications disabled, dropping alert for {}", chat_id);
        Ok(())
    }
}

/// Render one opportunity as a Telegram HTML message.
pub fn format_opportunity(opp: &ArbitrageOpportunity) -> String {
    let buy = venue_link(&opp.low_venue, opp.low_venue_url.as_deref());
    let sell = venue_link(&opp.high_venue, opp.high_venue_url.as_deref());
    let trust = if opp.trust_indicator.is_empty() {
        String::new()
    } else {
        format!("{} ", opp.trust_indicator)
    };

    format!(
        "📊 <b>{}</b>\n\n\
         {}Buy: {} @ {}\n\
         Sell: {} @ {}\n\
         Spread: <b>{}%</b>\n\
         24h volume: {}",
        opp.pair,
        trust,
        buy,
        opp.low_price,
        sell,
        opp.high_price,
        opp.profit_percent,
        opp.formatted_volume
    )
}

fn venue_link(name: &str, url: Option<&str>) -> String {
    match url {
        Some(url) => format!("<a href=\"{}\">{}</a>", url, name),
        None => name.to_string(),
    }
}
