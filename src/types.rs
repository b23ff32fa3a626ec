//! Core domain types shared across modules

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Venue trust classification as reported by the price provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueTrust {
    Trusted,
    Neutral,
    Untrusted,
}

impl VenueTrust {
    /// Parse a provider trust label. Unrecognized labels map to `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "green" => Some(Self::Trusted),
            "yellow" => Some(Self::Neutral),
            "red" => Some(Self::Untrusted),
            _ => None,
        }
    }

    /// Marker shown in alert messages.
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Trusted => "🟢",
            Self::Neutral => "🟡",
            Self::Untrusted => "🔴",
        }
    }
}

/// A single venue's quoted price/volume for one asset pair.
///
/// Provider entries missing the numeric fields never make it into this type;
/// they are dropped during DTO conversion in the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerQuote {
    /// Base asset symbol (e.g. "BTC")
    pub base: String,
    /// Quote currency (e.g. "USDT")
    pub target: String,
    /// Last traded price in the quote currency
    pub last_price: Decimal,
    /// 24h traded volume in the quote currency
    pub volume_24h: Decimal,
    /// Venue (exchange) name
    pub venue: String,
    /// Provider trust label ("green"/"yellow"/"red"); absent when unrated
    pub trust_score: Option<String>,
    /// Direct trade link on the venue
    pub trade_url: Option<String>,
}

/// Entry in the shared top-assets cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopAsset {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_cap: Option<Decimal>,
    pub last_updated: DateTime<Utc>,
}

/// Per-subscriber filter preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberProfile {
    /// Opaque subscriber key (Telegram chat id)
    pub chat_id: String,
    /// Assets scanned when the top-asset universe is off
    #[serde(default)]
    pub asset_whitelist: HashSet<String>,
    /// Lower-cased; always wins over whitelist membership
    #[serde(default)]
    pub asset_blacklist: HashSet<String>,
    /// Venues allowed when venue filtering is active
    #[serde(default)]
    pub venue_whitelist: HashSet<String>,
    /// true = scan all venues, false = restrict to `venue_whitelist`
    #[serde(default = "default_true")]
    pub venue_filtering_paused: bool,
    /// true suppresses all scanning and all external fetches
    #[serde(default)]
    pub scan_paused: bool,
    /// Minimum profit as a fraction (0.02 = 2%)
    #[serde(default)]
    pub min_profit_fraction: Decimal,
    /// Minimum 24h quote-currency volume per ticker
    #[serde(default)]
    pub min_volume: Decimal,
    /// true routes the subscriber to the shared top-N cache
    #[serde(default)]
    pub use_top_asset_universe: bool,
    /// Quote currency a ticker must match to be considered
    #[serde(default = "default_settlement")]
    pub settlement_currency: String,
}

fn default_true() -> bool {
    true
}

fn default_settlement() -> String {
    "USDT".to_string()
}

impl SubscriberProfile {
    /// A fresh profile with default filters for a new chat.
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            asset_whitelist: HashSet::new(),
            asset_blacklist: HashSet::new(),
            venue_whitelist: HashSet::new(),
            venue_filtering_paused: true,
            scan_paused: false,
            min_profit_fraction: Decimal::ZERO,
            min_volume: Decimal::ZERO,
            use_top_asset_universe: false,
            settlement_currency: default_settlement(),
        }
        .normalized()
    }

    /// Enforce profile invariants: non-negative thresholds, lower-cased
    /// blacklist. Stores run loaded rows through this before handing the
    /// profile to the scan engine.
    pub fn normalized(mut self) -> Self {
        if self.min_profit_fraction < Decimal::ZERO {
            self.min_profit_fraction = Decimal::ZERO;
        }
        if self.min_volume < Decimal::ZERO {
            self.min_volume = Decimal::ZERO;
        }
        self.asset_blacklist = self
            .asset_blacklist
            .into_iter()
            .map(|a| a.to_lowercase())
            .collect();
        self
    }

    /// Blacklist lookup; matching is case-insensitive.
    pub fn is_blacklisted(&self, asset: &str) -> bool {
        self.asset_blacklist.contains(&asset.to_lowercase())
    }

    /// Whether tickers from this venue should be considered at all.
    pub fn allows_venue(&self, venue: &str) -> bool {
        self.venue_filtering_paused || self.venue_whitelist.contains(venue)
    }
}

/// A detected profitable spread between two venues for one asset pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    /// Pair label, e.g. "BTC/USDT"
    pub pair: String,
    /// Buy-side price and venue
    pub low_price: Decimal,
    pub low_venue: String,
    pub low_venue_url: Option<String>,
    /// Sell-side price and venue
    pub high_price: Decimal,
    pub high_venue: String,
    pub high_venue_url: Option<String>,
    /// Buy-side 24h volume, thousands-separated for display
    pub formatted_volume: String,
    /// Spread percentage, rounded to 2 decimals
    pub profit_percent: Decimal,
    /// Trust marker of the buy-side venue; empty when unrecognized
    pub trust_indicator: String,
}

/// Render a volume figure with thousands separators ("1,234,567").
pub fn format_volume(volume: Decimal) -> String {
    let rounded = volume
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_string();
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("{sign}{out}")
}
