//! Profile-aware market data boundary
//!
//! Wraps the raw provider with the per-subscriber concerns that belong in
//! front of the detector: the scan-pause cost guard and venue selection.
//! Provider failures are absorbed here; a pair with no data is skipped
//! this cycle and naturally retried on the next one.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::PriceProvider;
use crate::types::{SubscriberProfile, TickerQuote};

#[derive(Clone)]
pub struct MarketDataSource {
    provider: Arc<dyn PriceProvider>,
}

impl MarketDataSource {
    pub fn new(provider: Arc<dyn PriceProvider>) -> Self {
        Self { provider }
    }

    /// Tickers for one asset, filtered for this subscriber. `None` means
    /// "nothing to scan": the subscriber is paused or the provider is
    /// unavailable this cycle. The pause check runs before any network
    /// I/O.
    pub async fn fetch(
        &self,
        asset_id: &str,
        profile: &SubscriberProfile,
    ) -> Option<Vec<TickerQuote>> {
        if profile.scan_paused {
            debug!(
                "{}: scanning paused, skipping fetch of {}",
                profile.chat_id, asset_id
            );
            return None;
        }

        let tickers = match self.provider.fetch_tickers(asset_id).await {
            Ok(t) => t,
            Err(e) => {
                warn!("{}: ticker fetch failed: {}", asset_id, e);
                return None;
            }
        };

        if profile.venue_filtering_paused {
            return Some(tickers);
        }

        Some(
            tickers
                .into_iter()
                .filter(|t| profile.allows_venue(&t.venue))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockPriceProvider;
    use crate::error::BotError;
    use rust_decimal_macros::dec;

    fn ticker(venue: &str) -> TickerQuote {
        TickerQuote {
            base: "BTC".to_string(),
            target: "USDT".to_string(),
            last_price: dec!(67000),
            volume_24h: dec!(100000),
            venue: venue.to_string(),
            trust_score: Some("green".to_string()),
            trade_url: None,
        }
    }

    #[tokio::test]
    async fn test_paused_subscriber_never_hits_provider() {
        // Scenario D: the provider mock would panic on any call
        let mut provider = MockPriceProvider::new();
        provider.expect_fetch_tickers().times(0);

        let source = MarketDataSource::new(Arc::new(provider));
        let mut profile = SubscriberProfile::new("chat-1");
        profile.scan_paused = true;

        assert!(source.fetch("bitcoin", &profile).await.is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_absorbed() {
        let mut provider = MockPriceProvider::new();
        provider.expect_fetch_tickers().returning(|_| {
            Err(BotError::Provider {
                status: 429,
                url: "https://provider.example".to_string(),
            })
        });

        let source = MarketDataSource::new(Arc::new(provider));
        let profile = SubscriberProfile::new("chat-1");

        assert!(source.fetch("bitcoin", &profile).await.is_none());
    }

    #[tokio::test]
    async fn test_venue_filter_applied_when_active() {
        let mut provider = MockPriceProvider::new();
        provider
            .expect_fetch_tickers()
            .returning(|_| Ok(vec![ticker("Binance"), ticker("Kraken"), ticker("Shady")]));

        let source = MarketDataSource::new(Arc::new(provider));
        let mut profile = SubscriberProfile::new("chat-1");
        profile.venue_filtering_paused = false;
        profile.venue_whitelist.insert("Kraken".to_string());

        let tickers = source.fetch("bitcoin", &profile).await.unwrap();
        assert_eq!(tickers.len(), 1);
        assert_eq!(tickers[0].venue, "Kraken");
    }

    #[tokio::test]
    async fn test_all_venues_pass_when_filtering_paused() {
        let mut provider = MockPriceProvider::new();
        provider
            .expect_fetch_tickers()
            .returning(|_| Ok(vec![ticker("Binance"), ticker("Kraken")]));

        let source = MarketDataSource::new(Arc::new(provider));
        let profile = SubscriberProfile::new("chat-1");

        let tickers = source.fetch("bitcoin", &profile).await.unwrap();
        assert_eq!(tickers.len(), 2);
    }
}
