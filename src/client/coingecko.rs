//! CoinGecko API client
//!
//! Fetches per-venue ticker quotes and top assets by market cap.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::PriceProvider;
use crate::config::ProviderConfig;
use crate::error::{BotError, Result};
use crate::types::{TickerQuote, TopAsset};

#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TickersResponse {
    tickers: Vec<RawTicker>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawTicker {
    base: String,
    target: String,
    market: RawMarket,
    last: Option<f64>,
    volume: Option<f64>,
    trust_score: Option<String>,
    trade_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMarket {
    name: String,
}

/// Row shape of the `/coins/markets` listing.
#[derive(Debug, Deserialize)]
struct RawMarketAsset {
    id: String,
    symbol: String,
    name: String,
    market_cap: Option<f64>,
}

impl CoinGeckoClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Convert a raw provider entry, dropping it when the numeric fields
    /// are missing or unrepresentable.
    fn convert_ticker(raw: RawTicker) -> Option<TickerQuote> {
        let last_price = raw.last.and_then(|p| Decimal::try_from(p).ok())?;
        let volume_24h = raw.volume.and_then(|v| Decimal::try_from(v).ok())?;

        Some(TickerQuote {
            base: raw.base,
            target: raw.target,
            last_price,
            volume_24h,
            venue: raw.market.name,
            trust_score: raw.trust_score,
            trade_url: raw.trade_url,
        })
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoClient {
    async fn fetch_tickers(&self, asset_id: &str) -> Result<Vec<TickerQuote>> {
        let url = format!("{}/coins/{}/tickers", self.base_url, asset_id);
        let resp = self.http.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(BotError::Provider {
                status: resp.status().as_u16(),
                url,
            });
        }

        let body: TickersResponse = resp.json().await?;
        let total = body.tickers.len();
        let tickers: Vec<TickerQuote> = body
            .tickers
            .into_iter()
            .filter_map(Self::convert_ticker)
            .collect();

        if tickers.len() < total {
            debug!(
                "{}: dropped {} malformed ticker entries",
                asset_id,
                total - tickers.len()
            );
        }

        Ok(tickers)
    }

    async fn top_assets(&self, limit: usize) -> Result<Vec<TopAsset>> {
        let url = format!("{}/coins/markets", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", &limit.to_string()),
                ("page", "1"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(BotError::Provider {
                status: resp.status().as_u16(),
                url,
            });
        }

        let rows: Vec<RawMarketAsset> = resp.json().await?;
        let now = Utc::now();

        Ok(rows
            .into_iter()
            .map(|r| TopAsset {
                id: r.id,
                symbol: r.symbol,
                name: r.name,
                market_cap: r.market_cap.and_then(|c| Decimal::try_from(c).ok()),
                last_updated: now,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(last: Option<f64>, volume: Option<f64>) -> RawTicker {
        RawTicker {
            base: "BTC".to_string(),
            target: "USDT".to_string(),
            market: RawMarket {
                name: "Binance".to_string(),
            },
            last,
            volume,
            trust_score: Some("green".to_string()),
            trade_url: None,
        }
    }

    #[test]
    fn test_convert_ticker_complete() {
        let ticker = CoinGeckoClient::convert_ticker(raw(Some(67000.5), Some(1500000.0))).unwrap();
        assert_eq!(ticker.base, "BTC");
        assert_eq!(ticker.venue, "Binance");
        assert_eq!(ticker.last_price, dec!(67000.5));
        assert_eq!(ticker.volume_24h, dec!(1500000));
        assert_eq!(ticker.trust_score.as_deref(), Some("green"));
    }

    #[test]
    fn test_convert_ticker_missing_price_dropped() {
        assert!(CoinGeckoClient::convert_ticker(raw(None, Some(100.0))).is_none());
    }

    #[test]
    fn test_convert_ticker_missing_volume_dropped() {
        assert!(CoinGeckoClient::convert_ticker(raw(Some(1.0), None)).is_none());
    }

    #[test]
    fn test_tickers_response_parse() {
        let json = r#"{
            "tickers": [
                {
                    "base": "BTC",
                    "target": "USDT",
                    "market": {"name": "Kraken"},
                    "last": 67000.0,
                    "volume": 12345.6,
                    "trust_score": "green",
                    "trade_url": "https://kraken.example/btc-usdt"
                },
                {
                    "base": "BTC",
                    "target": "USDT",
                    "market": {"name": "NoData"},
                    "last": null,
                    "volume": null,
                    "trust_score": null,
                    "trade_url": null
                }
            ]
        }"#;

        let body: TickersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.tickers.len(), 2);

        let converted: Vec<_> = body
            .tickers
            .into_iter()
            .filter_map(CoinGeckoClient::convert_ticker)
            .collect();
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].venue, "Kraken");
    }
}
