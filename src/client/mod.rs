//! Market data provider clients

mod coingecko;

pub use coingecko::CoinGeckoClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{TickerQuote, TopAsset};

/// External price data provider.
///
/// The scan engine only ever talks to this trait; the HTTP client below is
/// the production implementation, tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// All current per-venue quotes for one asset.
    async fn fetch_tickers(&self, asset_id: &str) -> Result<Vec<TickerQuote>>;

    /// Top assets by market cap, used to refill the shared universe cache.
    async fn top_assets(&self, limit: usize) -> Result<Vec<TopAsset>>;
}
